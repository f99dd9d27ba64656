//! Token counting port.

use async_trait::async_trait;

/// Counts model tokens in a text.
///
/// A count of 0 means "unknown": callers treat it as within any budget.
#[async_trait]
pub trait TokenCounter: Send + Sync {
    async fn count_tokens(&self, text: &str) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_counter_is_object_safe() {
        fn _accepts_dyn(_counter: &dyn TokenCounter) {}
    }
}
