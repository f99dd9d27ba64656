//! Dialogue engine - one ask/final step of the reminder dialogue.
//!
//! Each user turn is sent to the model together with the conversation so far.
//! The model either asks a clarifying question (`ask`) or returns the complete
//! reminder (`final`). Questions extend the stored history; a final answer
//! clears it, stores the task and asks the finalizer for a confirmation text.

use std::sync::Arc;

use crate::domain::conversation::{
    replies, strip_code_fence, validate_date_time, ExtractionResponse, InputForm, ParseError,
    ParseMode, Role,
};
use crate::domain::foundation::ChatId;
use crate::domain::task::Task;
use crate::ports::{
    ChatMessage, Clock, CompletionProvider, CompletionRequest, CompletionResponse,
    MessageRepository, TaskRepository,
};

use super::context_summarizer::ContextSummarizer;
use super::task_finalizer::TaskFinalizer;

/// Sampling temperature of dialogue calls.
pub const DIALOGUE_TEMPERATURE: f32 = 0.3;

/// The two dialogue rule prompts.
#[derive(Debug, Clone)]
pub struct DialogueRules {
    pub dialogue: String,
    pub chain_of_thought: String,
}

impl DialogueRules {
    fn select(&self, use_chain_of_thought: bool) -> &str {
        if use_chain_of_thought {
            &self.chain_of_thought
        } else {
            &self.dialogue
        }
    }
}

pub struct DialogueEngine {
    provider: Arc<dyn CompletionProvider>,
    summarizer: Arc<ContextSummarizer>,
    finalizer: Arc<TaskFinalizer>,
    messages: Arc<dyn MessageRepository>,
    tasks: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
    rules: DialogueRules,
    model: String,
}

impl DialogueEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        summarizer: Arc<ContextSummarizer>,
        finalizer: Arc<TaskFinalizer>,
        messages: Arc<dyn MessageRepository>,
        tasks: Arc<dyn TaskRepository>,
        clock: Arc<dyn Clock>,
        rules: DialogueRules,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            summarizer,
            finalizer,
            messages,
            tasks,
            clock,
            rules,
            model: model.into(),
        }
    }

    /// Runs one dialogue step for `form` and returns the reply text.
    ///
    /// Never fails: provider and parsing problems degrade to a fixed reply,
    /// persistence problems are logged.
    pub async fn ask(&self, chat_id: ChatId, form: &InputForm, use_chain_of_thought: bool) -> String {
        if !self.provider.is_configured() {
            tracing::error!(chat_id = %chat_id, "Completion provider is not configured");
            return replies::REQUEST_FAILED.to_string();
        }

        let request = self.build_request(form, use_chain_of_thought).await;

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(err) => {
                let info = self.provider.provider_info();
                tracing::error!(
                    chat_id = %chat_id,
                    provider = %info.name,
                    model = %self.model,
                    error = %err,
                    "Dialogue completion failed"
                );
                return replies::REQUEST_FAILED.to_string();
            }
        };

        let text = strip_code_fence(&response.content);
        if text.is_empty() {
            tracing::warn!(chat_id = %chat_id, "Dialogue completion returned no text");
            return replies::REQUEST_FAILED.to_string();
        }

        match ExtractionResponse::parse(&text, ParseMode::Lenient) {
            Ok(parsed @ ExtractionResponse::Ask { .. }) => {
                self.on_ask(chat_id, form, &parsed, &response).await
            }
            Ok(parsed @ ExtractionResponse::Final { .. }) => {
                self.on_final(chat_id, &parsed, &response).await
            }
            Err(ParseError::MissingField("question")) => {
                tracing::warn!(chat_id = %chat_id, raw = %text, "Ask answer without a question");
                replies::REQUEST_FAILED.to_string()
            }
            Err(ParseError::UnknownMode(mode)) => {
                tracing::warn!(chat_id = %chat_id, mode = %mode, raw = %text, "Unknown response mode");
                replies::REQUEST_FAILED.to_string()
            }
            Err(err) => {
                tracing::warn!(chat_id = %chat_id, error = %err, "Returning unparsed model output");
                replies::with_model_footer(&text, &response.model_version)
            }
        }
    }

    async fn build_request(&self, form: &InputForm, use_chain_of_thought: bool) -> CompletionRequest {
        let base_rule = self.rules.select(use_chain_of_thought);
        let summarized = self.summarizer.summarize(base_rule, &form.texts()).await;

        let system_prompt = if summarized.prompt.trim().is_empty() {
            base_rule.to_string()
        } else {
            summarized.prompt
        };

        let messages = match summarized.history {
            Some(summary) => summary.into_iter().map(ChatMessage::user).collect(),
            None => form
                .history
                .iter()
                .map(|m| ChatMessage::new(m.role, m.annotated_text()))
                .collect(),
        };

        CompletionRequest {
            messages,
            ..CompletionRequest::new()
        }
        .with_model(&self.model)
        .with_system_prompt(system_prompt)
        .with_temperature(DIALOGUE_TEMPERATURE)
        .with_max_tokens(self.summarizer.budget().max_output_tokens)
    }

    async fn on_ask(
        &self,
        chat_id: ChatId,
        form: &InputForm,
        parsed: &ExtractionResponse,
        response: &CompletionResponse,
    ) -> String {
        let ExtractionResponse::Ask { question, .. } = parsed else {
            return replies::REQUEST_FAILED.to_string();
        };

        if let Some(turn) = form.last_user_turn() {
            if let Err(err) = self
                .messages
                .upsert(chat_id, Role::User, &turn.text, turn.timestamp)
                .await
            {
                tracing::warn!(chat_id = %chat_id, error = %err, "Failed to store user turn");
            }
        }

        let now = self.clock.now().timestamp();
        if let Err(err) = self
            .messages
            .upsert(chat_id, Role::Assistant, question, now)
            .await
        {
            tracing::warn!(chat_id = %chat_id, error = %err, "Failed to store assistant question");
        }

        tracing::debug!(chat_id = %chat_id, "Dialogue asked a clarifying question");

        let body = replies::with_reasoning(parsed.reasoning(), question);
        replies::with_model_and_usage_footer(
            &body,
            &response.model_version,
            response.usage.input_tokens,
            response.usage.completion_tokens,
        )
    }

    async fn on_final(
        &self,
        chat_id: ChatId,
        parsed: &ExtractionResponse,
        response: &CompletionResponse,
    ) -> String {
        let Some(task) = Task::from_response(chat_id, parsed) else {
            return replies::REQUEST_FAILED.to_string();
        };

        if let Err(err) = validate_date_time(&task.date_time) {
            tracing::warn!(chat_id = %chat_id, error = %err, "Final answer has a non-RFC3339 dateTime");
        }

        if let Err(err) = self.messages.delete_by_id(chat_id).await {
            tracing::warn!(chat_id = %chat_id, error = %err, "Failed to clear dialogue history");
        }
        if let Err(err) = self.tasks.upsert(&task).await {
            tracing::warn!(chat_id = %chat_id, error = %err, "Failed to store task");
        }

        tracing::info!(chat_id = %chat_id, date_time = %task.date_time, "Task extracted");

        let finalized = match parsed.to_json() {
            Ok(raw) => self.finalizer.try_finalize(&raw).await.map_err(|e| e.to_string()),
            Err(err) => Err(err.to_string()),
        };

        match finalized {
            Ok(text) => replies::with_usage_footer(
                &text,
                response.usage.input_tokens,
                response.usage.completion_tokens,
            ),
            Err(err) => {
                tracing::warn!(chat_id = %chat_id, error = %err, "Finalizer failed, using template reply");
                let body = format!(
                    "Задача: {}\nДата/время: {}\nМесто: {}",
                    task.task, task.date_time, task.location
                );
                let body = replies::with_reasoning(parsed.reasoning(), &body);
                replies::with_model_footer(&body, &response.model_version)
            }
        }
    }
}
