//! Domain layer - Pure business logic with no external dependencies.
//!
//! - `foundation`: identifiers and the shared error vocabulary
//! - `conversation`: dialogue messages and the model's extraction payload
//! - `task`: reminders and digest formatting

pub mod conversation;
pub mod foundation;
pub mod task;
