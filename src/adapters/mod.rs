//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - YandexGPT completion and tokenize clients, plus test doubles
//! - `storage` - In-memory repositories
//! - `notify` - Outbound message delivery
//! - `clock` - Time sources

pub mod ai;
pub mod clock;
pub mod notify;
pub mod storage;

pub use clock::{FixedClock, SystemClock};
