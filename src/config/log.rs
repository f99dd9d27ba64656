//! Logging configuration

use serde::Deserialize;

/// Tracing subscriber settings
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,

    /// Filter used when `RUST_LOG` is not set
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json: false,
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}
