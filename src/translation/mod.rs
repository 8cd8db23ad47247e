/*!
 * Translation of subtitle entries through a remote provider.
 *
 * - `core`: the single-text translation port and the service implementing it
 * - `batch`: segmenting entries and running segments through a worker pool
 */

// Re-export main types for easier usage
pub use self::batch::{BatchTranslator, RunProgress, RunReport, RunState};
pub use self::core::{TextTranslator, TranslationService};

// Submodules
pub mod batch;
pub mod core;
