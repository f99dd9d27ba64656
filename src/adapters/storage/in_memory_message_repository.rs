//! In-Memory Message Repository Adapter
//!
//! Keeps conversation history in memory. Useful for testing and for the
//! console binary.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Message, Role};
use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::MessageRepository;

#[derive(Debug, Clone)]
struct StoredMessage {
    role: Role,
    text: String,
    timestamp: i64,
}

/// In-memory storage for per-chat history
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageRepository {
    history: Arc<RwLock<HashMap<ChatId, Vec<StoredMessage>>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryMessageRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a database error (for tests)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of messages stored for a chat
    pub async fn count(&self, chat_id: ChatId) -> usize {
        self.history.read().await.get(&chat_id).map_or(0, Vec::len)
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.history.write().await.clear();
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::database("message storage unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn upsert(
        &self,
        chat_id: ChatId,
        role: Role,
        text: &str,
        timestamp: i64,
    ) -> Result<(), DomainError> {
        self.check()?;
        let mut history = self.history.write().await;
        history.entry(chat_id).or_default().push(StoredMessage {
            role,
            text: text.to_string(),
            timestamp,
        });
        Ok(())
    }

    async fn get_by_id(
        &self,
        chat_id: ChatId,
        timezone: &str,
    ) -> Result<Option<Vec<Message>>, DomainError> {
        self.check()?;
        let history = self.history.read().await;
        Ok(history
            .get(&chat_id)
            .filter(|messages| !messages.is_empty())
            .map(|messages| {
                messages
                    .iter()
                    .map(|m| Message::new(m.role, m.text.clone(), timezone, m.timestamp))
                    .collect()
            }))
    }

    async fn delete_by_id(&self, chat_id: ChatId) -> Result<bool, DomainError> {
        self.check()?;
        Ok(self.history.write().await.remove(&chat_id).is_some())
    }
}
