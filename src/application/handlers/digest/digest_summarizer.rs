//! Daily digest wording.
//!
//! Rewrites the plain task listing into a friendly digest message.

use std::sync::Arc;

use crate::domain::conversation::Role;
use crate::ports::{AIError, CompletionProvider, CompletionRequest};

pub const DIGEST_TEMPERATURE: f32 = 0.7;
pub const DIGEST_MAX_TOKENS: u32 = 2000;

pub struct TaskDigestSummarizer {
    provider: Arc<dyn CompletionProvider>,
    rule: String,
    model: String,
}

impl TaskDigestSummarizer {
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

    /// Digest text for a block of task entries.
    pub async fn summarize(&self, block: &str) -> Result<String, AIError> {
        if !self.provider.is_configured() {
            return Err(AIError::not_configured("digest summarizer has no credentials"));
        }

        let request = CompletionRequest::new()
            .with_model(&self.model)
            .with_system_prompt(&self.rule)
            .with_message(Role::User, block)
            .with_temperature(DIGEST_TEMPERATURE)
            .with_max_tokens(DIGEST_MAX_TOKENS);

        let response = self.provider.complete(request).await?;
        let text = response.content.trim();
        if text.is_empty() {
            return Err(AIError::parse("digest summarizer returned empty text"));
        }
        Ok(text.to_string())
    }
}
