//! Task domain module.
//!
//! A task is a reminder extracted from a finished dialogue.

mod digest;
mod task;

pub use digest::format_digest_block;
pub use task::Task;
