//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## AI Ports
//!
//! - `CompletionProvider` - Chat completion calls
//! - `TokenCounter` - Token counting for context budgets
//!
//! ## Storage Ports
//!
//! - `MessageRepository` - Per-chat conversation history
//! - `TaskRepository` - Extracted reminders
//! - `ChatRepository` - Per-chat settings (timezone)
//!
//! ## Delivery and Time
//!
//! - `MessageSender` - Outbound chat messages
//! - `Clock` - Current time

mod ai_provider;
mod chat_repository;
mod clock;
mod message_repository;
mod message_sender;
mod task_repository;
mod tokenizer;

pub use ai_provider::{
    AIError, ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, ProviderInfo,
    TokenUsage,
};
pub use chat_repository::ChatRepository;
pub use clock::Clock;
pub use message_repository::MessageRepository;
pub use message_sender::MessageSender;
pub use task_repository::TaskRepository;
pub use tokenizer::TokenCounter;
