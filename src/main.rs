// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{error, warn, info, debug, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};

use subtitle_translator::app_config::{self, Config};
use subtitle_translator::app_controller::Controller;
use subtitle_translator::file_utils::FileManager;
use subtitle_translator::providers::mock::MockProvider;
use subtitle_translator::translation::{RunState, TranslationService};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one probe translation to the configured endpoint
    TestProvider,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Subtitle translator for SRT and ASS files
///
/// Splits subtitles into segments and translates them in parallel through an
/// OpenAI-compatible chat-completions endpoint.
#[derive(Parser, Debug)]
#[command(name = "subtitle-translator")]
#[command(version)]
#[command(about = "Translate SRT and ASS subtitles through an OpenAI-compatible endpoint")]
#[command(long_about = "Translate SRT and ASS subtitles through an OpenAI-compatible endpoint.

EXAMPLES:
    subtitle-translator movie.srt                          # Translate using defaults or conf.json
    subtitle-translator -f movie.ass                       # Overwrite an existing translation
    subtitle-translator -m Qwen3-32B --concurrency 8 a.srt # Override model and parallelism
    subtitle-translator --dry-run movie.srt                # Simulated translation, no server
    subtitle-translator /subs/                             # Every .srt/.ass file under a folder
    subtitle-translator test-provider                      # Check the endpoint only
    subtitle-translator completions bash > st.bash         # Generate bash completions

OUTPUT:
    Translated files are written as {name}_translated_{lang}.{ext} next to the input
    or into --output-dir.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Subtitle file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Chat-completions URL of the translation endpoint
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Model name to use for translation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, env = "SUBTITLE_TRANSLATOR_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Subtitle entries per segment
    #[arg(long, global = true)]
    segment_size: Option<usize>,

    /// Segments translated at the same time
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Target language code (e.g., 'zh', 'fr')
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// Configuration file path, read when present
    #[arg(short = 'c', long = "config", default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Directory for translated files (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Use a simulated provider instead of the endpoint
    #[arg(long, global = true)]
    dry_run: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and marker for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let (colour, marker) = Self::style_for_level(record.level());

            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                colour, now, marker, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtitle-translator", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::TestProvider) => {
            let config = build_config(&cli)?;
            let mut controller = build_controller(config, cli.dry_run)?;
            controller.test_provider().await?;
            Ok(())
        }
        None => {
            let input_path = cli.input_path.clone().ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;
            let config = build_config(&cli)?;
            run_translate(&cli, config, &input_path).await
        }
    }
}

// @loads: Config file (if present) with command line overrides applied
fn build_config(options: &CommandLineOptions) -> Result<Config> {
    let mut config = if options.config_path.exists() {
        Config::load_from_file(&options.config_path)?
    } else {
        debug!("No config file at {:?}, using defaults", options.config_path);
        Config::default()
    };

    let translation = &mut config.translation;
    if let Some(url) = &options.api_base_url {
        translation.api_base_url = url.clone();
    }
    if let Some(model) = &options.model {
        translation.model_name = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        translation.api_key = Some(api_key.clone());
    }
    if let Some(segment_size) = options.segment_size {
        translation.segment_size = segment_size;
    }
    if let Some(concurrency) = options.concurrency {
        translation.concurrency_limit = concurrency;
    }
    if let Some(target_language) = &options.target_language {
        translation.target_language = target_language.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    log::set_max_level(level_filter(&config.log_level));
    Ok(config)
}

fn build_controller(config: Config, dry_run: bool) -> Result<Controller> {
    let controller = Controller::with_config(config)?;
    if !dry_run {
        return Ok(controller);
    }

    info!("Dry run: using the simulated provider");
    let service = TranslationService::mock(&controller.config().translation, MockProvider::simulated());
    Ok(controller.with_translator(Arc::new(service)))
}

fn segment_progress_bar(total: u64) -> ProgressBar {
    let progress_bar = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar
}

async fn run_translate(options: &CommandLineOptions, config: Config, input_path: &Path) -> Result<()> {
    let files = if input_path.is_dir() {
        FileManager::find_subtitle_files(input_path)?
    } else if input_path.is_file() {
        vec![input_path.to_path_buf()]
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    };

    if files.is_empty() {
        return Err(anyhow!("No .srt or .ass files found in {:?}", input_path));
    }

    let target_language = config.translation.target_language.clone();
    let segment_size = config.translation.segment_size.max(1);
    let mut controller = build_controller(config, options.dry_run)?;

    info!("Testing AI Provider...");
    if let Err(e) = controller.test_provider().await {
        error!("AI Provider test failed. Check configuration.");
        return Err(e.into());
    }

    let mut success_count = 0;
    let mut skip_count = 0;
    let mut error_count = 0;

    for file in &files {
        let output_dir = options
            .output_dir
            .clone()
            .or_else(|| file.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));

        let file_name = file.file_name().map(|f| f.to_string_lossy().to_string()).unwrap_or_default();
        let output_path = output_dir.join(FileManager::translated_file_name(&file_name, &target_language));
        if output_path.exists() && !options.force_overwrite {
            warn!("Skipping {}, translation already exists (use -f to force overwrite)", file_name);
            skip_count += 1;
            continue;
        }

        match translate_file(&mut controller, file, &output_dir, options.force_overwrite, segment_size).await {
            Ok(true) => success_count += 1,
            Ok(false) => error_count += 1,
            Err(e) => {
                error!("Error processing file {}: {:#}", file_name, e);
                error_count += 1;
            }
        }
    }

    if files.len() > 1 {
        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors",
            success_count, skip_count, error_count
        );
    }

    if error_count > 0 {
        return Err(anyhow!("{} file(s) could not be fully translated", error_count));
    }
    Ok(())
}

// @returns: Whether every segment was translated
async fn translate_file(
    controller: &mut Controller,
    file: &Path,
    output_dir: &Path,
    force_overwrite: bool,
    segment_size: usize,
) -> Result<bool> {
    let entry_count = controller.load_file(file)?.entries.len();

    let progress_bar = segment_progress_bar(entry_count.div_ceil(segment_size) as u64);
    progress_bar.set_message("Translating");
    let pb = progress_bar.clone();
    let report = controller
        .translate(move |progress| pb.set_position(progress.completed as u64))
        .await?;
    progress_bar.finish_and_clear();

    let state = report.state;
    let saved = controller.save_translated(output_dir, force_overwrite)?;
    debug!("Wrote {}", saved.display());

    Ok(state == RunState::Completed)
}
