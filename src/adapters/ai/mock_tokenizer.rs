//! Mock token counter for testing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::ports::TokenCounter;

/// How the mock derives a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountingMode {
    /// Every text counts as the same number of tokens.
    Fixed(usize),
    /// One token per whitespace-separated word.
    Words,
}

/// Deterministic token counter that records what it was asked to count.
#[derive(Debug, Clone)]
pub struct MockTokenCounter {
    mode: CountingMode,
    counted: Arc<Mutex<Vec<String>>>,
}

impl MockTokenCounter {
    pub fn fixed(count: usize) -> Self {
        Self::with_mode(CountingMode::Fixed(count))
    }

    pub fn words() -> Self {
        Self::with_mode(CountingMode::Words)
    }

    pub fn with_mode(mode: CountingMode) -> Self {
        Self {
            mode,
            counted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Texts passed to `count_tokens`, in call order.
    pub fn counted_texts(&self) -> Vec<String> {
        self.counted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TokenCounter for MockTokenCounter {
    async fn count_tokens(&self, text: &str) -> usize {
        self.counted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());

        match self.mode {
            CountingMode::Fixed(count) => count,
            CountingMode::Words => text.split_whitespace().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_by_mode_and_records_texts() {
        let fixed = MockTokenCounter::fixed(700);
        assert_eq!(fixed.count_tokens("anything").await, 700);

        let words = MockTokenCounter::words();
        assert_eq!(words.count_tokens("one two  three").await, 3);
        assert_eq!(words.counted_texts(), vec!["one two  three".to_string()]);
    }
}
