//! Recording sender - keeps outbound messages in memory for assertions.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{ChatId, DomainError, ErrorCode};
use crate::ports::MessageSender;

/// MessageSender that records every message instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<(ChatId, String)>>>,
    fail: bool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every delivery fails (messages are still recorded).
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    /// All messages sent so far, in order.
    pub async fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().await.clone()
    }

    /// Messages sent to one chat.
    pub async fn sent_to(&self, chat_id: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), DomainError> {
        self.sent.lock().await.push((chat_id, text.to_string()));
        if self.fail {
            return Err(DomainError::new(ErrorCode::DeliveryFailed, "recording sender set to fail")
                .with_detail("chat_id", chat_id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_messages_per_chat() {
        let sender = RecordingSender::new();
        sender.send(ChatId::new(1), "a").await.unwrap();
        sender.send(ChatId::new(2), "b").await.unwrap();

        assert_eq!(sender.count().await, 2);
        assert_eq!(sender.sent_to(ChatId::new(2)).await, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn failing_sender_reports_delivery_error() {
        let sender = RecordingSender::failing();
        let err = sender.send(ChatId::new(1), "a").await.unwrap_err();

        assert_eq!(err.code, ErrorCode::DeliveryFailed);
        assert_eq!(err.details.get("chat_id"), Some(&"1".to_string()));
        assert_eq!(sender.count().await, 1);
    }
}
