/*!
 * Simulated provider.
 *
 * Used by `--dry-run` and by tests to exercise the pipeline without a server:
 * - `MockProvider::working()` - Always succeeds with a `[CN] ` prefixed echo
 * - `MockProvider::simulated()` - Same, with randomised network latency
 * - `MockProvider::failing(kind)` - Always fails with the given error class
 */

use async_trait::async_trait;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

const SIMULATED_BASE_DELAY_MS: u64 = 300;
const SIMULATED_JITTER_MS: u64 = 200;
const PREVIEW_CHARS: usize = 50;

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated text
    pub text: String,
}

/// Error class produced by a failing mock
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockErrorType {
    Connection,
    Authentication,
    Timeout,
    Api,
}

impl MockErrorType {
    fn to_error(self) -> ProviderError {
        match self {
            Self::Connection => ProviderError::ConnectionError("Simulated connection refused".to_string()),
            Self::Authentication => ProviderError::AuthenticationError("Simulated 401 Unauthorized".to_string()),
            Self::Timeout => ProviderError::Timeout("Simulated timeout".to_string()),
            Self::Api => ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            },
        }
    }
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds immediately
    Working,
    /// Succeeds after a randomised delay
    Simulated { base_delay_ms: u64, jitter_ms: u64 },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing(MockErrorType),
    /// Returns empty response
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
}

/// The canned translation: `[CN] ` plus the first 50 characters
pub fn simulate_translation(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    let ellipsis = if text.chars().count() > PREVIEW_CHARS { "..." } else { "" };
    format!("[CN] {}{}", preview, ellipsis)
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock with network-like latency
    pub fn simulated() -> Self {
        Self::new(MockBehavior::Simulated {
            base_delay_ms: SIMULATED_BASE_DELAY_MS,
            jitter_ms: SIMULATED_JITTER_MS,
        })
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing(kind: MockErrorType) -> Self {
        Self::new(MockBehavior::Failing(kind))
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after `delay_ms`
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => Ok(MockResponse {
                text: simulate_translation(&request.text),
            }),

            MockBehavior::Simulated { base_delay_ms, jitter_ms } => {
                let jitter = if jitter_ms == 0 { 0 } else { rand::rng().random_range(0..=jitter_ms) };
                tokio::time::sleep(Duration::from_millis(base_delay_ms + jitter)).await;
                Ok(MockResponse {
                    text: simulate_translation(&request.text),
                })
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(MockResponse {
                        text: simulate_translation(&request.text),
                    })
                }
            }

            MockBehavior::Failing(kind) => Err(kind.to_error()),

            MockBehavior::Empty => Ok(MockResponse {
                text: String::new(),
            }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(MockResponse {
                    text: simulate_translation(&request.text),
                })
            }
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
