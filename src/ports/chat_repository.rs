//! Chat settings repository port.

use async_trait::async_trait;

use crate::domain::foundation::{ChatId, DomainError};

/// Repository port for per-chat settings, currently the timezone.
///
/// A chat is "known" once it has a row here.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Store (or replace) the chat's IANA timezone.
    async fn upsert(&self, chat_id: ChatId, timezone: &str) -> Result<(), DomainError>;

    /// The chat's timezone, or `None` for an unknown chat.
    async fn get_by_id(&self, chat_id: ChatId) -> Result<Option<String>, DomainError>;

    /// Forget the chat. Returns `true` if it was known.
    async fn delete_by_id(&self, chat_id: ChatId) -> Result<bool, DomainError>;
}
