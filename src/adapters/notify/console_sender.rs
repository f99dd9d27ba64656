//! Console sender - writes outbound chat messages to stdout.

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::domain::foundation::{ChatId, DomainError, ErrorCode};
use crate::ports::MessageSender;

/// MessageSender for the console transport.
///
/// Each message is printed as `[chat <id>] <text>` followed by a blank line.
pub struct ConsoleSender {
    out: Mutex<Stdout>,
}

impl ConsoleSender {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleSender {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a message the way the console shows it.
pub fn render(chat_id: ChatId, text: &str) -> String {
    format!("[chat {}] {}\n\n", chat_id, text)
}

#[async_trait]
impl MessageSender for ConsoleSender {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<(), DomainError> {
        let mut out = self.out.lock().await;
        let write = async {
            out.write_all(render(chat_id, text).as_bytes()).await?;
            out.flush().await
        };

        write.await.map_err(|e| {
            DomainError::new(ErrorCode::DeliveryFailed, "failed to write to console")
                .with_detail("chat_id", chat_id.to_string())
                .with_detail("reason", e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_prefixes_chat_id() {
        assert_eq!(render(ChatId::new(7), "Привет"), "[chat 7] Привет\n\n");
    }
}
