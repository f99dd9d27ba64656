//! Foundation module - Shared domain primitives.
//!
//! Contains the identifiers and error types that form the vocabulary
//! of the reminder domain.

mod errors;
mod ids;

pub use errors::{DomainError, ErrorCode};
pub use ids::ChatId;
