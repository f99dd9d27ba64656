//! YandexGPT Provider - Implementation of CompletionProvider for Yandex
//! Foundation Models.
//!
//! # Configuration
//!
//! ```ignore
//! let config = YandexConfig::new(api_key, folder_id)
//!     .with_default_model("yandexgpt-5-pro/latest")
//!     .with_completion_url("https://llm.api.cloud.yandex.net/foundationModels/v1/completion");
//!
//! let provider = YandexGptProvider::new(config)?;
//! ```
//!
//! Requests name a model such as `yandexgpt-lite/latest`; the provider turns
//! it into the `gpt://{folder}/{model}` URI the service expects. Usage counts
//! come back as decimal strings.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::ports::{
    AIError, ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, ProviderInfo,
    TokenUsage,
};

pub const DEFAULT_COMPLETION_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

/// Configuration for the YandexGPT provider.
#[derive(Debug, Clone)]
pub struct YandexConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Cloud folder the models are billed to.
    pub folder_id: String,
    /// Model used when a request does not name one.
    pub default_model: String,
    /// Completion endpoint.
    pub completion_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl YandexConfig {
    /// Creates a new configuration with the given credentials.
    pub fn new(api_key: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            folder_id: folder_id.into(),
            default_model: "yandexgpt-5-pro/latest".to_string(),
            completion_url: DEFAULT_COMPLETION_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Sets the completion endpoint.
    pub fn with_completion_url(mut self, url: impl Into<String>) -> Self {
        self.completion_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full model URI for `model`.
    pub fn model_uri(&self, model: &str) -> String {
        format!("gpt://{}/{}", self.folder_id, model)
    }

    /// Returns true when both the key and the folder are set.
    pub fn has_credentials(&self) -> bool {
        !self.api_key().trim().is_empty() && !self.folder_id.trim().is_empty()
    }

    /// Exposes the API key (for making requests).
    pub(super) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// YandexGPT completion provider.
pub struct YandexGptProvider {
    config: YandexConfig,
    client: Client,
}

impl YandexGptProvider {
    /// Creates a provider with a client bound to the configured timeout.
    pub fn new(config: YandexConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn to_wire_request(&self, request: &CompletionRequest) -> WireRequest {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        WireRequest {
            model_uri: self.config.model_uri(model),
            completion_options: CompletionOptions {
                stream: false,
                temperature: request.temperature,
                max_tokens: request.max_tokens,
            },
            messages: request.wire_messages(),
        }
    }

    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let response = handle_response_status(response).await?;

        let body: WireResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        let result = body.result;
        let alternative = result
            .alternatives
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("No alternatives in response"))?;

        Ok(CompletionResponse {
            content: alternative.message.text,
            usage: TokenUsage::new(result.usage.input_text_tokens, result.usage.completion_tokens),
            model_version: result.model_version,
            status: alternative.status,
        })
    }
}

#[async_trait]
impl CompletionProvider for YandexGptProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        if !self.config.has_credentials() {
            return Err(AIError::not_configured("api key or folder id is empty"));
        }

        let wire = self.to_wire_request(&request);
        tracing::debug!(
            model = %wire.model_uri,
            messages = wire.messages.len(),
            "Sending completion request"
        );

        let builder = authorized(self.client.post(&self.config.completion_url), &self.config).json(&wire);
        let response = send(builder, self.config.timeout).await?;
        let completion = self.parse_response(response).await?;

        tracing::debug!(
            model_version = %completion.model_version,
            status = %completion.status,
            input_tokens = completion.usage.input_tokens,
            completion_tokens = completion.usage.completion_tokens,
            "Completion received"
        );
        Ok(completion)
    }

    fn is_configured(&self) -> bool {
        self.config.has_credentials()
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("yandexgpt", &self.config.default_model)
    }
}

/// Adds the auth, content type and correlation headers.
pub(super) fn authorized(builder: RequestBuilder, config: &YandexConfig) -> RequestBuilder {
    builder
        .header("Authorization", format!("Api-Key {}", config.api_key()))
        .header("Content-Type", "application/json")
        .header("x-client-request-id", Uuid::new_v4().to_string())
}

/// Sends a request, classifying transport failures.
pub(super) async fn send(builder: RequestBuilder, timeout: Duration) -> Result<Response, AIError> {
    builder.send().await.map_err(|e| {
        if e.is_timeout() {
            AIError::Timeout {
                timeout_secs: timeout.as_secs() as u32,
            }
        } else if e.is_connect() {
            AIError::network(format!("Connection failed: {}", e))
        } else {
            AIError::network(e.to_string())
        }
    })
}

/// Maps non-success statuses onto `AIError`.
pub(super) async fn handle_response_status(response: Response) -> Result<Response, AIError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u32>().ok());
    let error_body = response.text().await.unwrap_or_default();

    tracing::warn!(status = status.as_u16(), body = %error_body, "Yandex API request failed");

    match status.as_u16() {
        401 | 403 => Err(AIError::AuthenticationFailed),
        429 => Err(AIError::rate_limited(retry_after.unwrap_or(30))),
        400 => Err(AIError::InvalidRequest(error_body)),
        500..=599 => Err(AIError::unavailable(format!(
            "Server error {}: {}",
            status, error_body
        ))),
        _ => Err(AIError::network(format!(
            "Unexpected status {}: {}",
            status, error_body
        ))),
    }
}

/// Token counts arrive as strings ("12"); plain numbers are accepted too.
pub(super) fn count_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) if s.trim().is_empty() => Ok(0),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

// ----- Yandex Foundation Models API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    result: WireResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResult {
    #[serde(default)]
    alternatives: Vec<WireAlternative>,
    #[serde(default)]
    usage: WireUsage,
    #[serde(default)]
    model_version: String,
}

#[derive(Debug, Deserialize)]
struct WireAlternative {
    message: WireMessage,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUsage {
    #[serde(default, deserialize_with = "count_from_string_or_number")]
    input_text_tokens: u64,
    #[serde(default, deserialize_with = "count_from_string_or_number")]
    completion_tokens: u64,
}
