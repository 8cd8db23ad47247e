/*!
 * Error types for the subtitle translator.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails for an unclassified reason
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Coarse classification of a provider failure, used for user messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The endpoint could not be reached
    Connectivity,
    /// The endpoint rejected the credentials
    Authentication,
    /// The endpoint did not answer in time
    Timeout,
    /// Anything else, including protocol violations
    Generic,
}

impl ProviderError {
    /// Classify this error
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::ConnectionError(_) => ProviderErrorKind::Connectivity,
            Self::AuthenticationError(_) => ProviderErrorKind::Authentication,
            Self::Timeout(_) => ProviderErrorKind::Timeout,
            Self::ApiError { status_code: 401 | 403, .. } => ProviderErrorKind::Authentication,
            _ => ProviderErrorKind::Generic,
        }
    }

    /// User-facing message for a failed connectivity test
    pub fn test_failure_message(&self) -> String {
        match self.kind() {
            ProviderErrorKind::Connectivity => {
                "Test failed: Could not connect to the API Base URL. Check the URL and network connection.".to_string()
            }
            ProviderErrorKind::Authentication => {
                "Test failed: Unauthorized. Check if the API Base URL and API Key are correct.".to_string()
            }
            ProviderErrorKind::Timeout => format!(
                "Test failed: API call timed out. The server might be slow or unreachable. ({})",
                self
            ),
            ProviderErrorKind::Generic => format!("Test failed: {}", self),
        }
    }
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// The file content could not be read as subtitles
    #[error("Error parsing file: {0}")]
    Parse(String),

    /// The file format is not one of the supported formats
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Errors that can occur during translation
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// The action was refused before any network activity
    #[error("{0}")]
    Precondition(String),

    /// The connectivity test against the provider failed
    #[error("{}", .0.test_failure_message())]
    ProviderTest(ProviderError),

    /// A single segment could not be translated; `index` is zero-based
    #[error("Segment {} failed: {source}", .index + 1)]
    Segment {
        /// Zero-based segment index
        index: usize,
        /// Underlying provider failure
        source: ProviderError,
    },

    /// The scheduling logic itself failed
    #[error("A critical error occurred: {0}")]
    CriticalRun(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// No translated output could be produced
    #[error("Error creating download: {0}")]
    Download(String),
}
