//! Watcher configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_DAY_OFFSET_HOURS;

/// Configuration for the Watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Where the last-run record is kept
    #[serde(rename = "state-file", default = "default_state_file")]
    pub state_file: PathBuf,

    /// Hours subtracted from a timestamp before taking its date
    #[serde(rename = "day-offset-hours", default = "default_day_offset_hours")]
    pub day_offset_hours: u32,
}

fn default_state_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todotxt-daemon")
        .join("state.json")
}

fn default_day_offset_hours() -> u32 {
    DEFAULT_DAY_OFFSET_HOURS
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            day_offset_hours: DEFAULT_DAY_OFFSET_HOURS,
        }
    }
}
