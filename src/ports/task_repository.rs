//! Task repository port.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{ChatId, DomainError};
use crate::domain::task::Task;

/// Repository port for reminders.
///
/// Implementations must ensure:
/// - Tasks are unique per `(chat_id, date_time)`; saving replaces
/// - Listings are ordered by `date_time`
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert or replace a task.
    async fn upsert(&self, task: &Task) -> Result<(), DomainError>;

    /// Tasks of `chat_id` that fall on `date`.
    async fn get_today(&self, chat_id: ChatId, date: NaiveDate) -> Result<Vec<Task>, DomainError>;

    /// Every task of `chat_id`.
    async fn get_all(&self, chat_id: ChatId) -> Result<Vec<Task>, DomainError>;
}
