//! Configuration types and loading

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::daemon::DaemonConfig;
use crate::watcher::WatcherConfig;
use crate::worker::WorkerConfig;

/// Settings key for the task list path
pub const TODO_TXT_PATH: &str = "paths.todo-txt";

/// Settings key for the archive path
pub const DONE_TXT_PATH: &str = "paths.done-txt";

/// Environment overrides for the path keys
const ENV_OVERRIDES: [(&str, &str); 2] = [(TODO_TXT_PATH, "TTD_TODO_TXT_PATH"), (DONE_TXT_PATH, "TTD_DONE_TXT_PATH")];

/// String lookup by key
///
/// The mover resolves its file paths through this on every run.
pub trait Settings: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

impl Settings for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task list and archive locations
    pub paths: PathsConfig,

    /// Daily gate configuration
    pub watcher: WatcherConfig,

    /// Supervisor loop configuration
    pub worker: WorkerConfig,

    /// PID file location
    pub daemon: DaemonConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

/// Task list and archive paths
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// The todo.txt file
    #[serde(rename = "todo-txt")]
    pub todo_txt: Option<String>,

    /// The done.txt file
    #[serde(rename = "done-txt")]
    pub done_txt: Option<String>,
}

impl Config {
    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.watcher.day_offset_hours > 23 {
            return Err(eyre::eyre!(
                "watcher.day-offset-hours must be between 0 and 23, got {}",
                self.watcher.day_offset_hours
            ));
        }
        if self.worker.interval_secs == 0 {
            return Err(eyre::eyre!("worker.interval-secs must be greater than zero"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    ///
    /// The first config file that exists wins; if it cannot be read or
    /// parsed that is an error rather than a silent fall back to defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .todotxt-daemon.yml
        let local_config = PathBuf::from(".todotxt-daemon.yml");
        if local_config.exists() {
            return Self::load_from_file(&local_config)
                .context(format!("Failed to load config from {}", local_config.display()));
        }

        // Try user config: ~/.config/todotxt-daemon/todotxt-daemon.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("todotxt-daemon").join("todotxt-daemon.yml");
            if user_config.exists() {
                return Self::load_from_file(&user_config)
                    .context(format!("Failed to load config from {}", user_config.display()));
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// The run-state file with a leading `~/` expanded
    pub fn state_file(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.watcher.state_file.to_string_lossy()))
    }

    fn file_value(&self, key: &str) -> Option<&str> {
        match key {
            TODO_TXT_PATH => self.paths.todo_txt.as_deref(),
            DONE_TXT_PATH => self.paths.done_txt.as_deref(),
            _ => None,
        }
    }
}

impl Settings for Config {
    fn get(&self, key: &str) -> Option<String> {
        let env_value = ENV_OVERRIDES
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, var)| std::env::var(var).ok())
            .filter(|v| !v.trim().is_empty());

        env_value
            .or_else(|| self.file_value(key).map(str::to_string))
            .map(|v| expand_home(&v))
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(value: &str) -> String {
    match value.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest).to_string_lossy().into_owned())
            .unwrap_or_else(|| value.to_string()),
        None => value.to_string(),
    }
}
