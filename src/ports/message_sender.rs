//! Outbound message port.

use async_trait::async_trait;

use crate::domain::foundation::{ChatId, DomainError};

/// Delivers text to a chat.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `text` to `chat_id`.
    ///
    /// # Errors
    ///
    /// - `DeliveryFailed` if the transport rejects the message
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), DomainError>;
}
