//! AI Adapters.
//!
//! Implementations of the CompletionProvider and TokenCounter ports.
//!
//! ## Available Adapters
//!
//! - `YandexGptProvider` - Yandex Foundation Models completion endpoint
//! - `YandexTokenizer` - Yandex Foundation Models tokenize endpoint
//! - `MockCompletionProvider` - Scripted provider for testing
//! - `MockTokenCounter` - Deterministic token counter for testing

mod mock_provider;
mod mock_tokenizer;
mod yandex_provider;
mod yandex_tokenizer;

pub use mock_provider::{MockCompletionProvider, MockError, MockResponse};
pub use mock_tokenizer::{CountingMode, MockTokenCounter};
pub use yandex_provider::{YandexConfig, YandexGptProvider, DEFAULT_COMPLETION_URL};
pub use yandex_tokenizer::{YandexTokenizer, DEFAULT_TOKENIZE_URL};
