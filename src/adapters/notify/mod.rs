//! Notification adapters.
//!
//! - `ConsoleSender` - prints messages for the console binary
//! - `RecordingSender` - captures messages for tests

mod console_sender;
mod recording_sender;

pub use console_sender::ConsoleSender;
pub use recording_sender::RecordingSender;
