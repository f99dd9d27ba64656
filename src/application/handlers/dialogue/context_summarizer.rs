//! Context window summarization.
//!
//! Before a dialogue call the system prompt and the history are measured in
//! tokens. Whichever exceeds its budget is compressed by a separate model
//! call. The two checks run concurrently and never fail the caller.

use serde_json::json;
use std::sync::Arc;

use crate::domain::conversation::Role;
use crate::ports::{AIError, CompletionProvider, CompletionRequest, TokenCounter};

/// Sampling temperature of summarization calls.
pub const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Token limits above which the prompt or the history get summarized.
///
/// `max_output_tokens` caps every summarization call and the dialogue call
/// that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummarizationBudget {
    pub max_prompt_tokens: usize,
    pub max_history_tokens: usize,
    pub max_output_tokens: u32,
}

impl SummarizationBudget {
    pub fn new(max_prompt_tokens: usize, max_history_tokens: usize, max_output_tokens: u32) -> Self {
        Self {
            max_prompt_tokens,
            max_history_tokens,
            max_output_tokens,
        }
    }
}

impl Default for SummarizationBudget {
    fn default() -> Self {
        Self::new(500, 500, 1000)
    }
}

/// Result of [`ContextSummarizer::summarize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizedContext {
    /// The prompt to use: the original or its summary.
    pub prompt: String,
    /// A replacement for the history, or `None` to send it unchanged.
    pub history: Option<Vec<String>>,
}

/// The two rule prompts driving summarization calls.
#[derive(Debug, Clone)]
pub struct SummaryRules {
    pub prompt: String,
    pub history: String,
}

pub struct ContextSummarizer {
    provider: Arc<dyn CompletionProvider>,
    tokenizer: Arc<dyn TokenCounter>,
    rules: SummaryRules,
    model: String,
    budget: SummarizationBudget,
}

impl ContextSummarizer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        tokenizer: Arc<dyn TokenCounter>,
        rules: SummaryRules,
        model: impl Into<String>,
        budget: SummarizationBudget,
    ) -> Self {
        Self {
            provider,
            tokenizer,
            rules,
            model: model.into(),
            budget,
        }
    }

    pub fn budget(&self) -> SummarizationBudget {
        self.budget
    }

    /// Summarizes whichever of `system_prompt` and `history` is over budget.
    ///
    /// Both checks run concurrently and the call returns once both finish.
    pub async fn summarize(&self, system_prompt: &str, history: &[String]) -> SummarizedContext {
        let (prompt, history) = tokio::join!(
            self.summarize_prompt(system_prompt),
            self.summarize_history(history)
        );

        SummarizedContext { prompt, history }
    }

    async fn summarize_prompt(&self, prompt: &str) -> String {
        let tokens = self.tokenizer.count_tokens(prompt).await;
        if tokens <= self.budget.max_prompt_tokens {
            return prompt.to_string();
        }

        tracing::debug!(
            tokens,
            limit = self.budget.max_prompt_tokens,
            "Prompt over budget, summarizing"
        );

        match self.run(&self.rules.prompt, prompt).await {
            Ok(summary) => summary,
            Err(err) => {
                tracing::warn!(error = %err, "Prompt summarization failed, keeping original prompt");
                prompt.to_string()
            }
        }
    }

    async fn summarize_history(&self, history: &[String]) -> Option<Vec<String>> {
        let serialized = json!({ "messages_history": history }).to_string();
        let tokens = self.tokenizer.count_tokens(&serialized).await;
        if tokens <= self.budget.max_history_tokens {
            return None;
        }

        tracing::debug!(
            tokens,
            limit = self.budget.max_history_tokens,
            messages = history.len(),
            "History over budget, summarizing"
        );

        match self.run(&self.rules.history, &serialized).await {
            Ok(summary) => Some(vec![summary]),
            Err(err) => {
                tracing::warn!(error = %err, "History summarization failed, sending full history");
                None
            }
        }
    }

    async fn run(&self, rule: &str, content: &str) -> Result<String, AIError> {
        let request = CompletionRequest::new()
            .with_model(&self.model)
            .with_system_prompt(rule)
            .with_message(Role::User, content)
            .with_temperature(SUMMARY_TEMPERATURE)
            .with_max_tokens(self.budget.max_output_tokens);

        let response = self.provider.complete(request).await?;
        let summary = response.content.trim();
        if summary.is_empty() {
            return Err(AIError::parse("summarizer returned empty text"));
        }
        Ok(summary.to_string())
    }
}
