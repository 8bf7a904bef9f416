//! Worker configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the Worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Seconds between checks
    #[serde(rename = "interval-secs", default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl WorkerConfig {
    /// Get the check interval as a Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.interval(), Duration::from_secs(60));
    }
}
