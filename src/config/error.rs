//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Cannot read rule file {path}: {source}")]
    RuleFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rule file {0} is empty")]
    EmptyRuleFile(PathBuf),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Token budget must be positive: {0}")]
    InvalidTokenBudget(&'static str),

    #[error("Scheduler interval must be positive")]
    InvalidInterval,

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(&'static str),
}
