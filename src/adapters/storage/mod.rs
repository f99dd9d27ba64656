//! Storage adapters.
//!
//! In-memory implementations of the repository ports.

mod in_memory_chat_repository;
mod in_memory_message_repository;
mod in_memory_task_repository;

pub use in_memory_chat_repository::InMemoryChatRepository;
pub use in_memory_message_repository::InMemoryMessageRepository;
pub use in_memory_task_repository::InMemoryTaskRepository;
