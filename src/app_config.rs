use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use url::Url;

use crate::errors::TranslationError;
use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading
/// and validating the settings of the translation endpoint.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Connection and scheduling parameters for one translation endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    // @field: Chat-completions URL of the endpoint
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    // @field: Model name sent with every request
    #[serde(default = "default_model_name")]
    pub model_name: String,

    // @field: Optional bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    // @field: Entries per segment
    #[serde(default = "default_segment_size")]
    pub segment_size: usize,

    // @field: Segments translated at the same time
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    // @field: Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: System prompt, `{target_language}` is substituted
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_api_base_url() -> String {
    "http://192.168.123.1:18081/v1/chat/completions".to_string()
}

fn default_model_name() -> String {
    "Qwen3-32B".to_string()
}

fn default_segment_size() -> usize {
    10
}

fn default_concurrency_limit() -> usize {
    5
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.3
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate the user's text into {target_language}. Reply with the translation only, keep line breaks and inline tags unchanged.".to_string()
}

impl Config {
    /// Load a configuration from a JSON file; missing fields fall back to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

impl TranslationConfig {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), TranslationError> {
        if self.api_base_url.trim().is_empty() {
            return Err(TranslationError::Precondition("API Base URL is required".to_string()));
        }

        if self.model_name.trim().is_empty() {
            return Err(TranslationError::Precondition("Model name is required".to_string()));
        }

        let url = Url::parse(self.api_base_url.trim()).map_err(|e| {
            TranslationError::Precondition(format!("Invalid API Base URL '{}': {}", self.api_base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(TranslationError::Precondition(format!(
                "API Base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.segment_size == 0 {
            return Err(TranslationError::Precondition("Segment size must be at least 1".to_string()));
        }

        if self.concurrency_limit == 0 {
            return Err(TranslationError::Precondition("Concurrency limit must be at least 1".to_string()));
        }

        language_utils::validate_language_code(&self.target_language)
            .map_err(|e| TranslationError::Precondition(e.to_string()))?;

        Ok(())
    }

    /// Whether the required connection fields are filled in
    pub fn is_complete(&self) -> bool {
        !self.api_base_url.trim().is_empty() && !self.model_name.trim().is_empty()
    }

    /// Whether `other` addresses the same endpoint with the same credentials
    pub fn same_provider(&self, other: &TranslationConfig) -> bool {
        self.api_base_url == other.api_base_url
            && self.model_name == other.model_name
            && self.api_key == other.api_key
    }

    /// The API key if one is set and non-blank
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    /// System prompt with the target language name filled in
    pub fn render_system_prompt(&self) -> String {
        let language = language_utils::get_language_name(&self.target_language)
            .unwrap_or_else(|_| self.target_language.clone());
        self.system_prompt.replace("{target_language}", &language)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model_name: default_model_name(),
            api_key: None,
            segment_size: default_segment_size(),
            concurrency_limit: default_concurrency_limit(),
            target_language: default_target_language(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
        }
    }
}
