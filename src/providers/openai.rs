use std::time::Duration;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Deserialize};
use reqwest::{Client, StatusCode};
use log::{debug, error};

use crate::errors::ProviderError;
use crate::providers::Provider;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

// Reasoning models prepend their chain of thought in <think> blocks
static THINK_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<think>.*?</think>").unwrap()
});

/// Client for OpenAI-compatible chat-completions servers
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// Optional bearer token
    api_key: Option<String>,
    /// Full chat-completions URL
    endpoint: String,
}

/// Chat-completions request
#[derive(Debug, Serialize, Clone)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Always false, responses are read in one piece
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    #[serde(default)]
    pub role: String,

    /// Content of the message; some servers send `null`
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TokenUsage {
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Number of completion tokens
    #[serde(default)]
    pub completion_tokens: u32,
}

/// One completion choice
#[derive(Debug, Deserialize, Clone)]
pub struct OpenAIChoice {
    /// The generated message
    pub message: OpenAIMessage,
}

/// Chat-completions response
#[derive(Debug, Deserialize, Clone)]
pub struct OpenAIResponse {
    /// Generated choices, the first one is used
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    /// Token usage, not every server reports it
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl Default for OpenAIRequest {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            temperature: None,
            stream: false,
        }
    }
}

impl OpenAIRequest {
    /// Create a new request for a model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl OpenAI {
    /// Create a new client; `endpoint` may be the full chat-completions URL or its base
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            endpoint: Self::chat_completions_url(&endpoint.into()),
        }
    }

    /// Resolve the URL requests are posted to
    pub fn chat_completions_url(endpoint: &str) -> String {
        let trimmed = endpoint.trim().trim_end_matches('/');
        if trimmed.ends_with(CHAT_COMPLETIONS_PATH) {
            trimmed.to_string()
        } else {
            format!("{}{}", trimmed, CHAT_COMPLETIONS_PATH)
        }
    }

    /// The URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify_send_error(error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(error.to_string())
        } else if error.is_connect() {
            ProviderError::ConnectionError(error.to_string())
        } else {
            ProviderError::RequestFailed(error.to_string())
        }
    }

    fn classify_status(status: StatusCode, body: String) -> ProviderError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::AuthenticationError(format!("{}: {}", status, body))
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(body),
            _ => ProviderError::ApiError {
                status_code: status.as_u16(),
                message: body,
            },
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let mut builder = self.client.post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(Self::classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI-compatible API error ({}): {}", status, error_text);
            return Err(Self::classify_status(status, error_text));
        }

        let body = response.text().await.map_err(Self::classify_send_error)?;
        let parsed: OpenAIResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        if parsed.choices.is_empty() {
            return Err(ProviderError::ParseError("No choices in API response".to_string()));
        }

        if let Some(usage) = &parsed.usage {
            debug!("Token usage: {} prompt, {} completion", usage.prompt_tokens, usage.completion_tokens);
        }

        Ok(parsed)
    }

    fn extract_text(response: &Self::Response) -> String {
        response.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .map(|content| THINK_BLOCK_REGEX.replace_all(content, "").trim().to_string())
            .unwrap_or_default()
    }
}
