//! Task finalization.
//!
//! Once the dialogue produces a complete `final` answer, a second model turns
//! it into a short confirmation for the user.

use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::conversation::{
    replies, strip_code_fence, ExtractionResponse, ParseError, ParseMode, Role,
};
use crate::ports::{AIError, CompletionProvider, CompletionRequest};

pub const FINALIZER_TEMPERATURE: f32 = 0.1;
pub const FINALIZER_MAX_TOKENS: u32 = 1000;

/// Errors that can occur while finalizing a task.
#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("invalid final payload: {0}")]
    InvalidInput(#[from] ParseError),

    #[error("payload is not a final answer")]
    NotFinal,

    #[error("completion provider is not configured")]
    NotConfigured,

    #[error("completion failed: {0}")]
    Provider(#[from] AIError),

    #[error("finalizer returned empty text")]
    EmptyOutput,

    #[error("unexpected finalizer output: {0}")]
    InvalidOutput(String),
}

#[derive(Debug, Deserialize)]
struct FinalizerOutput {
    #[serde(default)]
    mode: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    reasoning: Option<String>,
}

pub struct TaskFinalizer {
    provider: Arc<dyn CompletionProvider>,
    rule: String,
    model: String,
}

impl TaskFinalizer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        rule: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            rule: rule.into(),
            model: model.into(),
        }
    }

    /// Confirmation text for a final payload, or the fixed failure reply.
    pub async fn finalize(&self, raw_final: &str) -> String {
        match self.try_finalize(raw_final).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "Finalization failed");
                replies::FINALIZE_FAILED.to_string()
            }
        }
    }

    /// Confirmation text for a final payload.
    ///
    /// The payload must strictly parse as a `final` answer. The model must
    /// answer `{"mode":"finalized","message":...}` with a non-empty message.
    pub async fn try_finalize(&self, raw_final: &str) -> Result<String, FinalizeError> {
        let parsed = ExtractionResponse::parse(raw_final, ParseMode::Strict)?;
        if !parsed.is_final() {
            return Err(FinalizeError::NotFinal);
        }
        if !self.provider.is_configured() {
            return Err(FinalizeError::NotConfigured);
        }

        let request = CompletionRequest::new()
            .with_model(&self.model)
            .with_system_prompt(&self.rule)
            .with_message(Role::User, format!("final_response: {}", raw_final.trim()))
            .with_temperature(FINALIZER_TEMPERATURE)
            .with_max_tokens(FINALIZER_MAX_TOKENS);

        let response = self.provider.complete(request).await?;

        let text = strip_code_fence(&response.content);
        if text.is_empty() {
            return Err(FinalizeError::EmptyOutput);
        }

        let output: FinalizerOutput =
            serde_json::from_str(&text).map_err(|e| FinalizeError::InvalidOutput(e.to_string()))?;

        if output.mode != "finalized" {
            return Err(FinalizeError::InvalidOutput(format!(
                "mode {:?}",
                output.mode
            )));
        }
        if output.message.trim().is_empty() {
            return Err(FinalizeError::InvalidOutput("empty message".to_string()));
        }

        let body = replies::with_reasoning(output.reasoning.as_deref(), output.message.trim());
        Ok(replies::with_model_footer(&body, &response.model_version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockCompletionProvider, MockError};

    const FINAL: &str = r#"{"mode":"final","task":"Встреча","dateTime":"2024-03-01T10:00:00+03:00","location":"офис"}"#;

    fn finalizer(provider: &MockCompletionProvider) -> TaskFinalizer {
        TaskFinalizer::new(
            Arc::new(provider.clone()),
            "FINALIZER-RULE",
            "yandexgpt-5-lite/latest",
        )
    }

    #[tokio::test]
    async fn produces_confirmation_with_model_line() {
        let provider = MockCompletionProvider::new()
            .with_model_version("lite-1")
            .with_response(r#"{"mode":"finalized","message":"Напомню о встрече 1 марта в 10:00"}"#);

        let text = finalizer(&provider).finalize(FINAL).await;

        assert_eq!(text, "Напомню о встрече 1 марта в 10:00\n\n📱 Модель: lite-1");

        let call = &provider.get_calls()[0];
        assert_eq!(call.system_prompt.as_deref(), Some("FINALIZER-RULE"));
        assert_eq!(call.messages[0].text, format!("final_response: {}", FINAL));
        assert_eq!(call.temperature, Some(FINALIZER_TEMPERATURE));
        assert_eq!(call.max_tokens, Some(FINALIZER_MAX_TOKENS));
        assert_eq!(call.model.as_deref(), Some("yandexgpt-5-lite/latest"));
    }

    #[tokio::test]
    async fn reasoning_is_prefixed() {
        let provider = MockCompletionProvider::new().with_response(
            "```json\n{\"mode\":\"finalized\",\"message\":\"Готово\",\"reasoning\":\"всё ясно\"}\n```",
        );

        let text = finalizer(&provider).try_finalize(FINAL).await.unwrap();
        assert!(text.starts_with("всё ясно\n\nГотово\n\n📱 Модель:"));
    }

    #[tokio::test]
    async fn rejects_ask_payload_without_calling_model() {
        let provider = MockCompletionProvider::new();
        let err = finalizer(&provider)
            .try_finalize(r#"{"mode":"ask","question":"Когда?"}"#)
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizeError::NotFinal));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn rejects_incomplete_final() {
        let provider = MockCompletionProvider::new();
        let err = finalizer(&provider)
            .try_finalize(r#"{"mode":"final","task":"Встреча","dateTime":"2024-03-01T10:00:00"}"#)
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizeError::InvalidInput(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn wrong_mode_or_empty_message_fails() {
        let provider = MockCompletionProvider::new()
            .with_response(r#"{"mode":"final","message":"x"}"#)
            .with_response(r#"{"mode":"finalized","message":"  "}"#)
            .with_response("просто текст");
        let finalizer = finalizer(&provider);

        for _ in 0..3 {
            assert!(matches!(
                finalizer.try_finalize(FINAL).await,
                Err(FinalizeError::InvalidOutput(_))
            ));
        }
    }

    #[tokio::test]
    async fn failures_map_to_fixed_reply() {
        let provider = MockCompletionProvider::new().with_error(MockError::Network {
            message: "reset".to_string(),
        });

        assert_eq!(finalizer(&provider).finalize(FINAL).await, replies::FINALIZE_FAILED);
    }

    #[tokio::test]
    async fn unconfigured_provider_is_not_called() {
        let provider = MockCompletionProvider::new().unconfigured();
        let err = finalizer(&provider).try_finalize(FINAL).await.unwrap_err();

        assert!(matches!(err, FinalizeError::NotConfigured));
        assert_eq!(provider.call_count(), 0);
    }
}
