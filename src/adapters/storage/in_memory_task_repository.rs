//! In-Memory Task Repository Adapter

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ChatId, DomainError};
use crate::domain::task::Task;
use crate::ports::TaskRepository;

/// In-memory storage for tasks, keyed by `(chat_id, date_time)`
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<BTreeMap<(ChatId, String), Task>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a database error (for tests)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total number of stored tasks
    pub async fn count(&self) -> usize {
        self.tasks.read().await.len()
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::database("task storage unavailable"));
        }
        Ok(())
    }

    async fn select(&self, chat_id: ChatId, filter: impl Fn(&Task) -> bool) -> Vec<Task> {
        self.tasks
            .read()
            .await
            .values()
            .filter(|task| task.chat_id == chat_id && filter(task))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn upsert(&self, task: &Task) -> Result<(), DomainError> {
        self.check()?;
        self.tasks
            .write()
            .await
            .insert((task.chat_id, task.date_time.clone()), task.clone());
        Ok(())
    }

    async fn get_today(&self, chat_id: ChatId, date: NaiveDate) -> Result<Vec<Task>, DomainError> {
        self.check()?;
        Ok(self.select(chat_id, |task| task.is_due_on(date)).await)
    }

    async fn get_all(&self, chat_id: ChatId) -> Result<Vec<Task>, DomainError> {
        self.check()?;
        Ok(self.select(chat_id, |_| true).await)
    }
}
