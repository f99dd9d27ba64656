//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// YandexGPT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key (`Authorization: Api-Key ...`)
    #[serde(default = "empty_secret")]
    pub api_key: Secret<String>,

    /// Cloud folder the model URIs live in
    #[serde(default)]
    pub folder_id: String,

    /// Completion endpoint
    #[serde(default = "default_completion_url")]
    pub completion_url: String,

    /// Tokenize endpoint
    #[serde(default = "default_tokenize_url")]
    pub tokenize_url: String,

    /// Model driving the ask/final dialogue
    #[serde(default = "default_dialogue_model")]
    pub dialogue_model: String,

    /// Model confirming a finished task
    #[serde(default = "default_lite_model")]
    pub finalizer_model: String,

    /// Model compressing prompts and history (also used for token counts)
    #[serde(default = "default_lite_model")]
    pub summarizer_model: String,

    /// Model writing the daily digest
    #[serde(default = "default_digest_model")]
    pub digest_model: String,

    /// Completion request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Tokenize request timeout in seconds
    #[serde(default = "default_tokenize_timeout")]
    pub tokenize_timeout_secs: u64,

    /// Use the chain-of-thought dialogue rule
    #[serde(default)]
    pub chain_of_thought: bool,
}

impl AiConfig {
    /// Get completion timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get tokenize timeout as Duration
    pub fn tokenize_timeout(&self) -> Duration {
        Duration::from_secs(self.tokenize_timeout_secs)
    }

    /// Check if the API key is set
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("ADVENT_BOT__AI__API_KEY"));
        }
        if self.folder_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("ADVENT_BOT__AI__FOLDER_ID"));
        }
        if self.timeout_secs == 0 || self.tokenize_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !is_http_url(&self.completion_url) {
            return Err(ValidationError::InvalidUrl("completion_url"));
        }
        if !is_http_url(&self.tokenize_url) {
            return Err(ValidationError::InvalidUrl("tokenize_url"));
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: empty_secret(),
            folder_id: String::new(),
            completion_url: default_completion_url(),
            tokenize_url: default_tokenize_url(),
            dialogue_model: default_dialogue_model(),
            finalizer_model: default_lite_model(),
            summarizer_model: default_lite_model(),
            digest_model: default_digest_model(),
            timeout_secs: default_timeout(),
            tokenize_timeout_secs: default_tokenize_timeout(),
            chain_of_thought: false,
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_completion_url() -> String {
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion".to_string()
}

fn default_tokenize_url() -> String {
    "https://llm.api.cloud.yandex.net/foundationModels/v1/tokenize".to_string()
}

fn default_dialogue_model() -> String {
    "yandexgpt-5-pro/latest".to_string()
}

fn default_lite_model() -> String {
    "yandexgpt-5-lite/latest".to_string()
}

fn default_digest_model() -> String {
    "yandexgpt-lite".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_tokenize_timeout() -> u64 {
    30
}
