//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ADVENT_BOT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use advent_bot::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! let rules = config.rules.load().expect("Failed to read rule files");
//! ```

mod ai;
mod error;
mod log;
mod rules;
mod scheduler;
mod summarization;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use log::LogConfig;
pub use rules::{Rules, RulesConfig};
pub use scheduler::SchedulerConfig;
pub use summarization::SummarizationConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// YandexGPT credentials, endpoints and models
    #[serde(default)]
    pub ai: AiConfig,

    /// Rule prompt files
    #[serde(default)]
    pub rules: RulesConfig,

    /// Context summarization token budget
    #[serde(default)]
    pub summarization: SummarizationConfig,

    /// Daily digest cadence
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Logging output
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ADVENT_BOT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ADVENT_BOT__AI__API_KEY=...` -> `ai.api_key = ...`
    /// - `ADVENT_BOT__SCHEDULER__INTERVAL_SECS=120` -> `scheduler.interval_secs = 120`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ADVENT_BOT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.rules.validate()?;
        self.summarization.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "ADVENT_BOT__AI__API_KEY",
        "ADVENT_BOT__AI__FOLDER_ID",
        "ADVENT_BOT__AI__CHAIN_OF_THOUGHT",
        "ADVENT_BOT__SCHEDULER__INTERVAL_SECS",
        "ADVENT_BOT__SUMMARIZATION__MAX_PROMPT_TOKENS",
        "ADVENT_BOT__LOG__JSON",
    ];

    fn set_minimal_env() {
        env::set_var("ADVENT_BOT__AI__API_KEY", "AQVN-test");
        env::set_var("ADVENT_BOT__AI__FOLDER_ID", "b1gfolder");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.ai.has_api_key());
        assert_eq!(config.ai.folder_id, "b1gfolder");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_apply_without_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.scheduler.interval_secs, 86_400);
        assert_eq!(config.summarization.max_output_tokens, 1000);
        assert!(!config.log.json);
        assert!(!config.ai.chain_of_thought);
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("ADVENT_BOT__SCHEDULER__INTERVAL_SECS", "120");
        env::set_var("ADVENT_BOT__SUMMARIZATION__MAX_PROMPT_TOKENS", "800");
        env::set_var("ADVENT_BOT__AI__CHAIN_OF_THOUGHT", "true");
        env::set_var("ADVENT_BOT__LOG__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.scheduler.interval_secs, 120);
        assert_eq!(config.summarization.max_prompt_tokens, 800);
        assert!(config.ai.chain_of_thought);
        assert!(config.log.json);
    }

    #[test]
    fn test_validate_reports_missing_key() {
        let config = AppConfig::default();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("ADVENT_BOT__AI__API_KEY"))
        );
    }
}
