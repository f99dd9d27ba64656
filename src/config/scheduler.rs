//! Daily digest scheduler configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Scheduler cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between digest passes
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs == 0 {
            return Err(ValidationError::InvalidInterval);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    24 * 60 * 60
}
