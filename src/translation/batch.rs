/*!
 * Segmented batch translation.
 *
 * Entries are split into ordered segments which a fixed pool of workers pulls
 * from a shared queue. A single collector owns the result slots, the progress
 * counter and the error list; workers only report outcomes to it over a channel.
 * A failed segment halts dispatch of everything still queued while segments
 * already in flight run to completion.
 */

use futures::future::{join_all, FutureExt};
use log::{debug, error, info};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::app_config::TranslationConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::subtitle_processor::SubtitleEntry;

use super::core::TextTranslator;

/// Lifecycle of one translation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Initializing,
    Running,
    /// Every segment was translated
    Completed,
    /// The scheduling itself failed
    StoppedOnFatalError,
    /// At least one segment failed; `stopped_early` when queued segments were skipped
    CriticallyFailed { stopped_early: bool },
}

impl RunState {
    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::StoppedOnFatalError | Self::CriticallyFailed { .. }
        )
    }
}

/// Progress snapshot, reported after every finished segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    pub completed: usize,
    pub total: usize,
}

impl RunProgress {
    /// Fraction of segments finished, 1.0 for an empty run
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Rounded percentage
    pub fn percent(&self) -> u8 {
        (self.ratio() * 100.0).round() as u8
    }
}

/// Outcome of a translation run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// All entries in input order; failed segments carry their original entries
    pub entries: Vec<SubtitleEntry>,
    /// Terminal state
    pub state: RunState,
    /// Number of segments the entries were split into
    pub total_segments: usize,
    /// Segments that finished, successfully or not
    pub completed_segments: usize,
    /// Segments handed to a worker
    pub dispatched_segments: usize,
    /// Segment failures in the order they were collected
    pub errors: Vec<TranslationError>,
}

impl RunReport {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            state: RunState::Completed,
            total_segments: 0,
            completed_segments: 0,
            dispatched_segments: 0,
            errors: Vec::new(),
        }
    }

    /// User-facing summary of the run
    pub fn status_message(&self) -> String {
        match self.state {
            RunState::Completed if self.total_segments == 0 => "No entries to translate.".to_string(),
            RunState::Completed => "Translation complete! Ready for download.".to_string(),
            RunState::CriticallyFailed { stopped_early: true } => format!(
                "Translation stopped due to an AI service error. {}/{} segments attempted.",
                self.completed_segments, self.total_segments
            ),
            RunState::CriticallyFailed { stopped_early: false } => format!(
                "Translation completed with some errors. {}/{} segments processed.",
                self.completed_segments, self.total_segments
            ),
            RunState::StoppedOnFatalError => "Translation process failed critically.".to_string(),
            RunState::Initializing => "Initializing translation...".to_string(),
            RunState::Running => "Translation in progress...".to_string(),
            RunState::Idle => String::new(),
        }
    }

    /// Every recorded error, one per line
    pub fn error_summary(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let lines: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        Some(lines.join("\n"))
    }

    /// Progress at the end of the run
    pub fn progress(&self) -> RunProgress {
        RunProgress {
            completed: self.completed_segments,
            total: self.total_segments,
        }
    }
}

/// Split entries into consecutive segments of at most `segment_size` entries
pub fn split_into_segments(entries: &[SubtitleEntry], segment_size: usize) -> Vec<Vec<SubtitleEntry>> {
    entries
        .chunks(segment_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Translate every translatable entry of a segment, one request per entry
///
/// The first failure aborts the segment; the caller keeps the original entries.
pub async fn translate_segment(
    translator: &dyn TextTranslator,
    segment: &[SubtitleEntry],
) -> Result<Vec<SubtitleEntry>, ProviderError> {
    let mut translated = Vec::with_capacity(segment.len());

    for entry in segment {
        match entry.text() {
            Some(text) => {
                let text = translator.translate_one(text).await?;
                translated.push(entry.with_text(text));
            }
            None => translated.push(entry.clone()),
        }
    }

    Ok(translated)
}

/// FIFO of segment indices not yet handed to a worker
struct DispatchQueue {
    pending: VecDeque<usize>,
    dispatched: usize,
    halted: bool,
}

impl DispatchQueue {
    fn new(total: usize) -> Self {
        Self {
            pending: (0..total).collect(),
            dispatched: 0,
            halted: false,
        }
    }

    fn next(&mut self) -> Option<usize> {
        let index = self.pending.pop_front()?;
        self.dispatched += 1;
        Some(index)
    }

    /// Drop everything still pending, returning the skipped indices
    fn halt(&mut self) -> Vec<usize> {
        self.halted = true;
        self.pending.drain(..).collect()
    }
}

enum SegmentOutcome {
    Translated(Vec<SubtitleEntry>),
    Failed(ProviderError),
    Panicked(String),
}

struct WorkerMessage {
    index: usize,
    outcome: SegmentOutcome,
}

/// Batch translator for processing subtitle entries in segments
pub struct BatchTranslator {
    /// The translation port to use
    translator: Arc<dyn TextTranslator>,

    /// Entries per segment
    segment_size: usize,

    /// Maximum number of segments in flight
    concurrency_limit: usize,
}

impl BatchTranslator {
    /// Create a batch translator using the limits of a configuration snapshot
    pub fn new(translator: Arc<dyn TextTranslator>, config: &TranslationConfig) -> Self {
        Self::with_limits(translator, config.segment_size, config.concurrency_limit)
    }

    /// Create a batch translator with explicit limits (0 is treated as 1)
    pub fn with_limits(translator: Arc<dyn TextTranslator>, segment_size: usize, concurrency_limit: usize) -> Self {
        Self {
            translator,
            segment_size: segment_size.max(1),
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    /// Translate entries, preserving their order
    ///
    /// `progress` is invoked once per finished segment. The returned report
    /// always holds as many entries as were passed in.
    pub async fn translate_entries(
        &self,
        entries: &[SubtitleEntry],
        progress: impl Fn(RunProgress),
    ) -> RunReport {
        let mut state = RunState::Initializing;
        debug!("Run state: {:?}", state);

        let segments = split_into_segments(entries, self.segment_size);
        let total = segments.len();
        if total == 0 {
            info!("No entries to translate");
            return RunReport::empty();
        }

        let worker_count = self.concurrency_limit.min(total);
        let queue = Mutex::new(DispatchQueue::new(total));
        let (tx, mut rx) = mpsc::unbounded_channel::<WorkerMessage>();

        state = RunState::Running;
        debug!("Run state: {:?} ({} segments, {} workers)", state, total, worker_count);
        let start_time = Instant::now();

        let workers = join_all((0..worker_count).map(|worker_id| {
            let tx = tx.clone();
            let queue = &queue;
            let segments = &segments;
            let translator = self.translator.as_ref();

            async move {
                loop {
                    let Some(index) = queue.lock().next() else {
                        break;
                    };
                    debug!("Worker {} translating segment {}/{}", worker_id, index + 1, total);

                    let result = AssertUnwindSafe(translate_segment(translator, &segments[index]))
                        .catch_unwind()
                        .await;

                    let outcome = match result {
                        Ok(Ok(translated)) => SegmentOutcome::Translated(translated),
                        Ok(Err(e)) => {
                            queue.lock().halt();
                            SegmentOutcome::Failed(e)
                        }
                        Err(panic) => {
                            queue.lock().halt();
                            SegmentOutcome::Panicked(panic_message(panic.as_ref()))
                        }
                    };

                    if tx.send(WorkerMessage { index, outcome }).is_err() {
                        break;
                    }
                }
            }
        }));
        drop(tx);

        let collector = async {
            let mut slots: Vec<Option<Vec<SubtitleEntry>>> = vec![None; total];
            let mut completed = 0;
            let mut errors = Vec::new();
            let mut critical = false;

            while let Some(WorkerMessage { index, outcome }) = rx.recv().await {
                match outcome {
                    SegmentOutcome::Translated(translated) => {
                        debug!("Segment {}/{} translated", index + 1, total);
                        slots[index] = Some(translated);
                    }
                    SegmentOutcome::Failed(e) => {
                        let e = TranslationError::Segment { index, source: e };
                        error!("{}", e);
                        errors.push(e);
                    }
                    SegmentOutcome::Panicked(message) => {
                        let e = TranslationError::CriticalRun(message);
                        error!("{}", e);
                        errors.push(e);
                        critical = true;
                    }
                }

                completed += 1;
                progress(RunProgress { completed, total });
            }

            (slots, completed, errors, critical)
        };

        let (_, (slots, completed, errors, critical)) = tokio::join!(workers, collector);

        // Unfilled slots (failed or never dispatched) keep the original segment
        let merged: Vec<SubtitleEntry> = slots
            .into_iter()
            .zip(segments)
            .flat_map(|(slot, original)| slot.unwrap_or(original))
            .collect();

        let dispatched = queue.lock().dispatched;
        state = if critical {
            RunState::StoppedOnFatalError
        } else if !errors.is_empty() {
            RunState::CriticallyFailed {
                stopped_early: dispatched < total,
            }
        } else {
            RunState::Completed
        };
        debug!("Run state: {:?}", state);
        info!(
            "Translation run finished in {:?}: {}/{} segments processed, {} dispatched, {} errors",
            start_time.elapsed(),
            completed,
            total,
            dispatched,
            errors.len()
        );

        RunReport {
            entries: merged,
            state,
            total_segments: total,
            completed_segments: completed,
            dispatched_segments: dispatched,
            errors,
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "segment worker panicked".to_string()
    }
}
