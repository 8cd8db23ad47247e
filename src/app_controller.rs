use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::app_config::{Config, TranslationConfig};
use crate::errors::{AppError, SubtitleError, TranslationError};
use crate::file_utils::FileManager;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry, SubtitleFormat};
use crate::translation::core::probe_provider;
use crate::translation::{BatchTranslator, RunProgress, RunReport, RunState, TextTranslator, TranslationService};

// @module: Session controller driving load, test, translate and download

/// MIME type of translated output
pub const OUTPUT_MIME_TYPE: &str = "text/plain; charset=utf-8";

/// A serialized translated file, ready to be written or sent
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedFile {
    pub file_name: String,
    pub content: String,
    pub mime_type: &'static str,
}

/// Main application controller for subtitle translation
///
/// Holds one loaded subtitle file, the current configuration and whether the
/// provider has been verified since the connection settings last changed.
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Set by a successful provider test
    provider_verified: bool,

    // @field: Loaded file
    subtitles: Option<SubtitleCollection>,

    // @field: Entries of the last run, in input order
    translated: Option<Vec<SubtitleEntry>>,

    // @field: Report of the last run
    last_report: Option<RunReport>,

    // @field: Translator used instead of the configured endpoint
    translator_override: Option<Arc<dyn TextTranslator>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        Ok(Self {
            config,
            provider_verified: false,
            subtitles: None,
            translated: None,
            last_report: None,
            translator_override: None,
        })
    }

    /// Use `translator` for tests and translations instead of the configured endpoint
    pub fn with_translator(mut self, translator: Arc<dyn TextTranslator>) -> Self {
        self.translator_override = Some(translator);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_provider_verified(&self) -> bool {
        self.provider_verified
    }

    pub fn subtitles(&self) -> Option<&SubtitleCollection> {
        self.subtitles.as_ref()
    }

    pub fn translated_entries(&self) -> Option<&[SubtitleEntry]> {
        self.translated.as_deref()
    }

    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    /// State of the last run, `Idle` before any
    pub fn state(&self) -> RunState {
        self.last_report.as_ref().map(|r| r.state).unwrap_or(RunState::Idle)
    }

    /// Load a subtitle file from disk
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&SubtitleCollection, AppError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        if FileManager::detect_format(path) == SubtitleFormat::Unknown {
            self.clear_file();
            return Err(SubtitleError::UnsupportedFormat(
                "Unsupported file type. Please upload .srt or .ass files.".to_string(),
            )
            .into());
        }

        let bytes = std::fs::read(path)
            .map_err(|e| AppError::File(format!("Failed to read file {:?}: {}", path, e)))?;
        let content = match FileManager::decode_subtitle_bytes(bytes) {
            Ok(content) => content,
            Err(e) => {
                self.clear_file();
                return Err(e.into());
            }
        };

        self.load_content(&content, &file_name)
    }

    /// Load subtitle content; the format is taken from `file_name`
    ///
    /// On failure nothing from a previous file is kept.
    pub fn load_content(&mut self, content: &str, file_name: &str) -> Result<&SubtitleCollection, AppError> {
        self.clear_file();

        let format = SubtitleFormat::from_path(file_name);
        let collection = SubtitleCollection::parse(content, file_name, format).map_err(|e| {
            error!("Error parsing file {}: {}", file_name, e);
            e
        })?;

        info!("{} loaded: {} entries ({})", file_name, collection.entries.len(), collection.format);
        Ok(&*self.subtitles.insert(collection))
    }

    /// Replace the translation settings
    ///
    /// Changing the URL, model or key requires a new provider test.
    pub fn update_translation_config(&mut self, translation: TranslationConfig) {
        if !self.config.translation.same_provider(&translation) {
            if self.provider_verified {
                debug!("Provider settings changed, test required before translating");
            }
            self.provider_verified = false;
        }
        self.config.translation = translation;
    }

    /// Check the configured provider with a single probe translation
    pub async fn test_provider(&mut self) -> Result<(), TranslationError> {
        self.provider_verified = false;
        self.config.translation.validate()?;

        let translator = self.translator();
        probe_provider(translator.as_ref()).await?;

        self.provider_verified = true;
        info!("AI Provider test successful!");
        Ok(())
    }

    /// Translate the loaded file
    ///
    /// `progress` is called after every finished segment.
    pub async fn translate(&mut self, progress: impl Fn(RunProgress)) -> Result<&RunReport, TranslationError> {
        let Some(subtitles) = self.subtitles.as_ref() else {
            return Err(TranslationError::Precondition("No subtitles loaded.".to_string()));
        };

        if !self.provider_verified {
            return Err(TranslationError::Precondition(
                "AI Provider has not been tested successfully. Please test the configuration first.".to_string(),
            ));
        }

        if !self.config.translation.is_complete() {
            return Err(TranslationError::Precondition(
                "API Base URL and Model Name must be configured.".to_string(),
            ));
        }

        let snapshot = self.config.translation.clone();
        info!(
            "Translating {} with {} at {} (segments of {}, {} in parallel)",
            subtitles.file_name, snapshot.model_name, snapshot.api_base_url, snapshot.segment_size, snapshot.concurrency_limit
        );

        self.translated = None;
        let batch_translator = BatchTranslator::new(self.translator(), &snapshot);
        let report = batch_translator.translate_entries(&subtitles.entries, progress).await;

        info!("{}", report.status_message());
        if let Some(summary) = report.error_summary() {
            warn!("{}", summary);
        }

        self.translated = Some(report.entries.clone());
        Ok(&*self.last_report.insert(report))
    }

    /// Serialize the translated entries under the translated file name
    pub fn translated_output(&self) -> Result<TranslatedFile, AppError> {
        let (Some(subtitles), Some(translated)) = (self.subtitles.as_ref(), self.translated.as_ref()) else {
            return Err(AppError::Download(
                "No translated data to download, or translation was not fully successful.".to_string(),
            ));
        };

        let content = subtitles
            .with_entries(translated.clone())
            .format_subtitles()
            .map_err(|e| AppError::Download(e.to_string()))?;

        Ok(TranslatedFile {
            file_name: FileManager::translated_file_name(&subtitles.file_name, &self.config.translation.target_language),
            content,
            mime_type: OUTPUT_MIME_TYPE,
        })
    }

    /// Write the translated file into `output_dir`
    ///
    /// An existing file is only replaced when `force_overwrite` is set.
    pub fn save_translated<P: AsRef<Path>>(&self, output_dir: P, force_overwrite: bool) -> Result<PathBuf, AppError> {
        let output = self.translated_output()?;
        let output_path = output_dir.as_ref().join(&output.file_name);

        if output_path.exists() && !force_overwrite {
            return Err(AppError::File(format!(
                "Output file already exists: {} (use --force to overwrite)",
                output_path.display()
            )));
        }

        FileManager::write_to_file(&output_path, &output.content)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;

        info!("Success: {}", output_path.display());
        Ok(output_path)
    }

    fn translator(&self) -> Arc<dyn TextTranslator> {
        match &self.translator_override {
            Some(translator) => Arc::clone(translator),
            None => Arc::new(TranslationService::new(&self.config.translation)),
        }
    }

    fn clear_file(&mut self) {
        self.subtitles = None;
        self.translated = None;
        self.last_report = None;
    }
}
