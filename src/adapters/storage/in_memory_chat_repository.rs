//! In-Memory Chat Repository Adapter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::ChatRepository;

/// In-memory storage for chat timezones
#[derive(Debug, Clone, Default)]
pub struct InMemoryChatRepository {
    chats: Arc<RwLock<HashMap<ChatId, String>>>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known chats
    pub async fn count(&self) -> usize {
        self.chats.read().await.len()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn upsert(&self, chat_id: ChatId, timezone: &str) -> Result<(), DomainError> {
        self.chats.write().await.insert(chat_id, timezone.to_string());
        Ok(())
    }

    async fn get_by_id(&self, chat_id: ChatId) -> Result<Option<String>, DomainError> {
        Ok(self.chats.read().await.get(&chat_id).cloned())
    }

    async fn delete_by_id(&self, chat_id: ChatId) -> Result<bool, DomainError> {
        Ok(self.chats.write().await.remove(&chat_id).is_some())
    }
}
