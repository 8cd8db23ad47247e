/*!
 * Core translation service implementation.
 *
 * This module contains the `TextTranslator` port used by the scheduler and the
 * `TranslationService` that implements it on top of a configured provider.
 */

use async_trait::async_trait;
use log::{debug, error, info};
use std::time::{Duration, Instant};

use crate::app_config::TranslationConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;

/// Text sent once to check that the endpoint answers
pub const PROBE_TEXT: &str = "你好";

/// Translate one free-text string
///
/// Implementations classify failures through `ProviderError` so callers can
/// tell connectivity, authentication and timeout problems apart.
#[async_trait]
pub trait TextTranslator: Send + Sync {
    /// Translate `text`; blank input yields an empty string
    async fn translate_one(&self, text: &str) -> Result<String, ProviderError>;
}

/// Translate the probe text once
///
/// Succeeds when the translator answers without error; the translated text
/// itself is only logged.
pub async fn probe_provider(translator: &dyn TextTranslator) -> Result<(), TranslationError> {
    let start_time = Instant::now();

    match translator.translate_one(PROBE_TEXT).await {
        Ok(translated) => {
            info!("Provider test succeeded in {:?}: {} -> {}", start_time.elapsed(), PROBE_TEXT, translated);
            Ok(())
        }
        Err(e) => {
            error!("Provider test failed: {}", e);
            Err(TranslationError::ProviderTest(e))
        }
    }
}

/// Translation provider implementation variants
enum TranslationProviderImpl {
    /// OpenAI-compatible chat-completions server
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// Simulated provider
    Mock {
        /// Client instance
        client: MockProvider,
    },
}

/// Main translation service for subtitle translation
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration snapshot taken at construction
    config: TranslationConfig,
}

impl TranslationService {
    /// Create a service talking to the configured endpoint
    pub fn new(config: &TranslationConfig) -> Self {
        let client = OpenAI::new(
            config.get_api_key().map(str::to_string),
            config.api_base_url.clone(),
            Duration::from_secs(config.timeout_secs.max(1)),
        );
        debug!("Translation endpoint: {} (model {})", client.endpoint(), config.model_name);

        Self {
            provider: TranslationProviderImpl::OpenAI { client },
            config: config.clone(),
        }
    }

    /// Create a service backed by a simulated provider
    pub fn mock(config: &TranslationConfig, client: MockProvider) -> Self {
        Self {
            provider: TranslationProviderImpl::Mock { client },
            config: config.clone(),
        }
    }

    /// The configuration this service was built from
    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    /// Translate the probe text once through this service
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        info!("Testing connection to {} with model {}", self.config.api_base_url, self.config.model_name);
        probe_provider(self).await
    }

    async fn request_translation(&self, text: &str) -> Result<String, ProviderError> {
        match &self.provider {
            TranslationProviderImpl::OpenAI { client } => {
                let request = OpenAIRequest::new(self.config.model_name.clone())
                    .add_message("system", self.config.render_system_prompt())
                    .add_message("user", text)
                    .temperature(self.config.temperature);

                let response = client.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            }
            TranslationProviderImpl::Mock { client } => {
                let response = client.complete(MockRequest { text: text.to_string() }).await?;
                Ok(MockProvider::extract_text(&response))
            }
        }
    }
}

#[async_trait]
impl TextTranslator for TranslationService {
    async fn translate_one(&self, text: &str) -> Result<String, ProviderError> {
        // Skip empty text
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        self.request_translation(text).await
    }
}
