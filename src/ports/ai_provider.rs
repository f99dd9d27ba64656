//! Completion Provider Port - Interface for LLM completion services.
//!
//! This port abstracts the chat-completion endpoint so the dialogue,
//! finalizer, summarizers and digest can run against the real service or a
//! scripted double.
//!
//! # Design
//!
//! - Non-streaming completions only
//! - Each request may name its own model; the provider resolves the URI
//! - Token usage is reported back for reply footers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::conversation::Role;

/// Port for LLM completion calls.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a single completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Returns false when credentials are missing and no call can succeed.
    fn is_configured(&self) -> bool;

    /// Get provider information (name, default model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model name such as `yandexgpt-lite/latest`. `None` uses the provider default.
    pub model: Option<String>,
    /// System prompt sent ahead of the messages.
    pub system_prompt: Option<String>,
    /// Conversation messages in order.
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the model to run.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, role: Role, text: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::new(role, text));
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// System prompt followed by the messages, as they go over the wire.
    /// Blank entries are skipped.
    pub fn wire_messages(&self) -> Vec<ChatMessage> {
        self.system_prompt
            .iter()
            .map(|prompt| ChatMessage::system(prompt.clone()))
            .chain(self.messages.iter().cloned())
            .filter(|m| !m.text.trim().is_empty())
            .collect()
    }
}

/// A message as sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

/// Response from a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Text of the first alternative.
    pub content: String,
    /// Token usage.
    pub usage: TokenUsage,
    /// Model version reported by the service.
    pub model_version: String,
    /// Status of the first alternative, e.g. `ALTERNATIVE_STATUS_FINAL`.
    pub status: String,
}

/// Token usage of one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub input_tokens: u64,
    /// Tokens generated.
    pub completion_tokens: u64,
    /// Sum of both.
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            input_tokens,
            completion_tokens,
            total_tokens: input_tokens + completion_tokens,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "yandexgpt").
    pub name: String,
    /// Model used when a request does not name one.
    pub default_model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_model: default_model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// Credentials or folder are missing.
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::NotConfigured(message.into())
    }
}
