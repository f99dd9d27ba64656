//! Chat commands: start, dialogue turns, task listings, digest trigger and reset.

mod chat_service;

pub use chat_service::ChatService;
