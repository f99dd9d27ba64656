//! Conversation domain module.
//!
//! Models the chat history that is fed to the completion service and the
//! structured `ask`/`final` payload the model answers with.

mod fence;
mod message;
mod response;
pub mod replies;

pub use fence::strip_code_fence;
pub use message::{InputForm, Message, Role};
pub use response::{
    parse_strict, validate_date_time, ExtractedTask, ExtractionResponse, ParseError, ParseMode,
    Property, DECLARED_FIELDS,
};
