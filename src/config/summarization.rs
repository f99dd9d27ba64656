//! Context summarization budget configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Token limits above which prompts and history are summarized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SummarizationConfig {
    #[serde(default = "default_max_prompt_tokens")]
    pub max_prompt_tokens: usize,

    #[serde(default = "default_max_history_tokens")]
    pub max_history_tokens: usize,

    /// Also the `maxTokens` of dialogue completions
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl SummarizationConfig {
    /// Validate token budgets
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_prompt_tokens == 0 {
            return Err(ValidationError::InvalidTokenBudget("max_prompt_tokens"));
        }
        if self.max_history_tokens == 0 {
            return Err(ValidationError::InvalidTokenBudget("max_history_tokens"));
        }
        if self.max_output_tokens == 0 {
            return Err(ValidationError::InvalidTokenBudget("max_output_tokens"));
        }
        Ok(())
    }
}

impl Default for SummarizationConfig {
    fn default() -> Self {
        Self {
            max_prompt_tokens: default_max_prompt_tokens(),
            max_history_tokens: default_max_history_tokens(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

fn default_max_prompt_tokens() -> usize {
    500
}

fn default_max_history_tokens() -> usize {
    500
}

fn default_max_output_tokens() -> u32 {
    1000
}
