//! Chat commands.
//!
//! Transport-agnostic handlers for the bot's commands and free-text turns.
//! Every method returns the reply texts to deliver, in order.

use std::sync::Arc;

use crate::domain::conversation::{replies, InputForm, Message};
use crate::domain::foundation::ChatId;
use crate::domain::task::Task;
use crate::ports::{ChatRepository, Clock, MessageRepository, TaskRepository};

use crate::application::handlers::dialogue::DialogueEngine;
use crate::application::handlers::digest::{local_today, SchedulerManager};

pub const DEFAULT_TIMEZONE: &str = "UTC";

pub const START_FIRST: &str = "Давай начнём сначала. Нажми /start, чтобы настроить часовой пояс 🚀";
pub const NO_TASKS_TODAY: &str = "На сегодня не осталось задач";
pub const TODAY_HEADER: &str = "Грядущие задачи на сегодня: ";
pub const NO_TASKS: &str = "У вас не осталось задач";
pub const TASKS_HEADER: &str = "Ваши задачи: ";
pub const SCHEDULER_NOT_FOUND: &str = "Scheduler не найден";
pub const RESET_FAILED: &str = "Произошла ошибка при сбросе 😔";
pub const RESET_DONE: &str = "Данные сброшены, scheduler удален. Нажмите /start, чтобы начать заново";
pub const NOTHING_TO_RESET: &str = "Для этого чата не было сохранённых данных.";

pub struct ChatService {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    tasks: Arc<dyn TaskRepository>,
    engine: Arc<DialogueEngine>,
    schedulers: Arc<SchedulerManager>,
    clock: Arc<dyn Clock>,
    use_chain_of_thought: bool,
}

impl ChatService {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        tasks: Arc<dyn TaskRepository>,
        engine: Arc<DialogueEngine>,
        schedulers: Arc<SchedulerManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            chats,
            messages,
            tasks,
            engine,
            schedulers,
            clock,
            use_chain_of_thought: false,
        }
    }

    /// Use the chain-of-thought dialogue rule for every turn.
    pub fn with_chain_of_thought(mut self, enabled: bool) -> Self {
        self.use_chain_of_thought = enabled;
        self
    }

    /// `/start`: remember the chat's timezone and start its digest scheduler.
    pub async fn start(&self, chat_id: ChatId, timezone: &str) -> Vec<String> {
        let timezone = match timezone.trim() {
            "" => DEFAULT_TIMEZONE,
            tz => tz,
        };

        if let Err(err) = self.chats.upsert(chat_id, timezone).await {
            tracing::error!(chat_id = %chat_id, error = %err, "Failed to store chat timezone");
            return vec![replies::REQUEST_FAILED.to_string()];
        }
        self.schedulers.add_scheduler(chat_id).await;

        tracing::info!(chat_id = %chat_id, timezone, "Chat started");
        vec![format!("Похоже, ваш часовой пояс: {}", timezone)]
    }

    /// A free-text turn of the reminder dialogue.
    pub async fn handle_text(&self, chat_id: ChatId, text: &str, timestamp: i64) -> Vec<String> {
        let timezone = match self.chats.get_by_id(chat_id).await {
            Ok(Some(timezone)) => timezone,
            Ok(None) => return vec![START_FIRST.to_string()],
            Err(err) => {
                tracing::error!(chat_id = %chat_id, error = %err, "Failed to load chat");
                return vec![replies::REQUEST_FAILED.to_string()];
            }
        };

        let mut history = match self.messages.get_by_id(chat_id, &timezone).await {
            Ok(history) => history.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(chat_id = %chat_id, error = %err, "Failed to load history, starting fresh");
                Vec::new()
            }
        };
        history.push(Message::user(text, timezone, timestamp));

        let form = InputForm::new(history);
        vec![self.engine.ask(chat_id, &form, self.use_chain_of_thought).await]
    }

    /// `/today`: the tasks due on the chat's current date.
    pub async fn today(&self, chat_id: ChatId) -> Vec<String> {
        let date = local_today(self.chats.as_ref(), self.clock.as_ref(), chat_id).await;
        match self.tasks.get_today(chat_id, date).await {
            Ok(tasks) => listing(&tasks, TODAY_HEADER, NO_TASKS_TODAY),
            Err(err) => {
                tracing::error!(chat_id = %chat_id, error = %err, "Failed to load today's tasks");
                vec![replies::REQUEST_FAILED.to_string()]
            }
        }
    }

    /// `/tasks`: every stored task.
    pub async fn tasks(&self, chat_id: ChatId) -> Vec<String> {
        match self.tasks.get_all(chat_id).await {
            Ok(tasks) => listing(&tasks, TASKS_HEADER, NO_TASKS),
            Err(err) => {
                tracing::error!(chat_id = %chat_id, error = %err, "Failed to load tasks");
                vec![replies::REQUEST_FAILED.to_string()]
            }
        }
    }

    /// `/trigger`: run the digest now. The digest itself goes through the
    /// message sender, so a successful trigger has no reply of its own.
    pub async fn trigger(&self, chat_id: ChatId) -> Vec<String> {
        match self.schedulers.process_now(chat_id).await {
            Some(count) => {
                tracing::info!(chat_id = %chat_id, tasks = count, "Digest triggered");
                Vec::new()
            }
            None => vec![SCHEDULER_NOT_FOUND.to_string()],
        }
    }

    /// `/restart`: forget the chat and its dialogue and stop its scheduler.
    ///
    /// Stored tasks are kept.
    pub async fn restart(&self, chat_id: ChatId) -> Vec<String> {
        let existed = match self.chats.delete_by_id(chat_id).await {
            Ok(existed) => existed,
            Err(err) => {
                tracing::error!(chat_id = %chat_id, error = %err, "Failed to reset chat");
                return vec![RESET_FAILED.to_string()];
            }
        };

        if !existed {
            return vec![NOTHING_TO_RESET.to_string()];
        }

        if let Err(err) = self.messages.delete_by_id(chat_id).await {
            tracing::warn!(chat_id = %chat_id, error = %err, "Failed to clear history on reset");
        }
        self.schedulers.remove_scheduler(chat_id).await;

        tracing::info!(chat_id = %chat_id, "Chat reset");
        vec![RESET_DONE.to_string()]
    }
}

fn listing(tasks: &[Task], header: &str, empty: &str) -> Vec<String> {
    if tasks.is_empty() {
        return vec![empty.to_string()];
    }

    std::iter::once(header.to_string())
        .chain(tasks.iter().map(|t| t.describe().trim_end().to_string()))
        .collect()
}
