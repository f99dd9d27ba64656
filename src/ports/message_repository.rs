//! Conversation history repository port.
//!
//! History is chat-scoped and append-only until the dialogue finishes, at
//! which point it is cleared as a whole.

use async_trait::async_trait;

use crate::domain::conversation::{Message, Role};
use crate::domain::foundation::{ChatId, DomainError};

/// Repository port for per-chat conversation history.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Append a message to the chat's history.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert(
        &self,
        chat_id: ChatId,
        role: Role,
        text: &str,
        timestamp: i64,
    ) -> Result<(), DomainError>;

    /// Load the chat's history, oldest first.
    ///
    /// History rows carry no zone of their own, so every returned message is
    /// stamped with `timezone`. Returns `None` if the chat has no history.
    async fn get_by_id(
        &self,
        chat_id: ChatId,
        timezone: &str,
    ) -> Result<Option<Vec<Message>>, DomainError>;

    /// Delete the chat's whole history.
    ///
    /// Returns `true` if anything was removed.
    async fn delete_by_id(&self, chat_id: ChatId) -> Result<bool, DomainError>;
}
