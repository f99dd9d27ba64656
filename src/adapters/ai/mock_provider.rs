//! Mock completion provider for testing.
//!
//! Provides a configurable implementation of the CompletionProvider port so
//! the dialogue, finalizer and summarizers can be tested without calling the
//! real service.
//!
//! # Features
//!
//! - Queued responses, consumed in order
//! - Routed responses picked by a substring of the system prompt
//! - Error injection and simulated delays
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockCompletionProvider::new()
//!     .with_response(r#"{"mode":"ask","question":"Когда?"}"#)
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, CompletionProvider, CompletionRequest, CompletionResponse, ProviderInfo, TokenUsage,
};

/// Mock completion provider for testing.
#[derive(Debug, Clone)]
pub struct MockCompletionProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Responses chosen by system prompt content, never consumed.
    routes: Arc<Mutex<Vec<(String, MockResponse)>>>,
    /// Model version reported in responses.
    model_version: String,
    /// Whether `is_configured` reports credentials.
    configured: bool,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful completion.
    Success { content: String, usage: TokenUsage },
    /// Return an error.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
    Parse { message: String },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
            MockError::Parse { message } => AIError::parse(message),
        }
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionProvider {
    /// Creates a configured mock with no scripted responses.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            routes: Arc::new(Mutex::new(Vec::new())),
            model_version: "mock-model-1".to_string(),
            configured: true,
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_response_full(content, TokenUsage::new(10, 20))
    }

    /// Adds a successful response with explicit usage.
    pub fn with_response_full(self, content: impl Into<String>, usage: TokenUsage) -> Self {
        locked(&self.responses).push_back(MockResponse::Success {
            content: content.into(),
            usage,
        });
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        locked(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Answers every request whose system prompt contains `needle`.
    ///
    /// Routes are checked before the queue.
    pub fn with_routed_response(self, needle: impl Into<String>, response: MockResponse) -> Self {
        locked(&self.routes).push((needle.into(), response));
        self
    }

    /// Sets the model version reported in responses.
    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = version.into();
        self
    }

    /// Makes the provider report missing credentials.
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        locked(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        locked(&self.calls).clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        locked(&self.calls).clear();
    }

    fn next_response(&self, request: &CompletionRequest) -> MockResponse {
        let system_prompt = request.system_prompt.as_deref().unwrap_or_default();
        let routed = locked(&self.routes)
            .iter()
            .find(|(needle, _)| system_prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone());

        routed.unwrap_or_else(|| {
            locked(&self.responses)
                .pop_front()
                .unwrap_or_else(|| MockResponse::Success {
                    content: "Mock response".to_string(),
                    usage: TokenUsage::new(5, 10),
                })
        })
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.next_response(&request);
        locked(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match response {
            MockResponse::Success { content, usage } => Ok(CompletionResponse {
                content,
                usage,
                model_version: self.model_version.clone(),
                status: "ALTERNATIVE_STATUS_FINAL".to_string(),
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", &self.model_version)
    }
}
