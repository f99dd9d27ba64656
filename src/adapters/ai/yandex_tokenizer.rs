//! YandexGPT tokenizer - Implementation of TokenCounter over the tokenize
//! endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::yandex_provider::{authorized, handle_response_status, send, YandexConfig};
use crate::ports::{AIError, TokenCounter};

pub const DEFAULT_TOKENIZE_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/tokenize";

/// Counts tokens with the same model the summarizer runs.
pub struct YandexTokenizer {
    config: YandexConfig,
    model: String,
    tokenize_url: String,
    client: Client,
}

impl YandexTokenizer {
    /// Creates a tokenizer for `model`. The config's timeout applies to
    /// every tokenize call.
    pub fn new(
        config: YandexConfig,
        model: impl Into<String>,
        tokenize_url: impl Into<String>,
    ) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            model: model.into(),
            tokenize_url: tokenize_url.into(),
            client,
        })
    }

    fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Counts tokens, reporting why a count could not be obtained.
    pub async fn try_count_tokens(&self, text: &str) -> Result<usize, AIError> {
        if !self.config.has_credentials() || self.model.trim().is_empty() {
            return Err(AIError::not_configured("api key, folder id or model is empty"));
        }

        let body = TokenizeRequest {
            model_uri: self.config.model_uri(&self.model),
            text,
        };

        let builder = authorized(self.client.post(&self.tokenize_url), &self.config).json(&body);
        let response = send(builder, self.timeout()).await?;
        let response = handle_response_status(response).await?;

        let parsed: TokenizeResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse tokenize response: {}", e)))?;

        Ok(parsed.tokens.len())
    }
}

#[async_trait]
impl TokenCounter for YandexTokenizer {
    async fn count_tokens(&self, text: &str) -> usize {
        match self.try_count_tokens(text).await {
            Ok(count) => {
                tracing::debug!(tokens = count, "Counted tokens");
                count
            }
            Err(err) => {
                tracing::warn!(error = %err, "Token count unavailable, treating as 0");
                0
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeRequest<'a> {
    model_uri: String,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenizeResponse {
    #[serde(default)]
    tokens: Vec<serde_json::Value>,
}
