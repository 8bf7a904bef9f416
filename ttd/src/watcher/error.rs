//! Watcher error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the run-state persistence layer
///
/// Any of these means the daily gate cannot make progress.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Failed to read run state {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Run state {} is locked by another process: {source}", .path.display())]
    Locked {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse run state {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write run state {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize run state: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SchedulerError {
    /// The state file involved, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            SchedulerError::Read { path, .. }
            | SchedulerError::Locked { path, .. }
            | SchedulerError::Parse { path, .. }
            | SchedulerError::Write { path, .. } => Some(path),
            SchedulerError::Serialize(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_message_names_path() {
        let err = SchedulerError::Locked {
            path: PathBuf::from("/tmp/state.json"),
            source: io::Error::new(io::ErrorKind::WouldBlock, "resource busy"),
        };

        let msg = err.to_string();
        assert!(msg.contains("/tmp/state.json"));
        assert!(msg.contains("locked"));
        assert_eq!(err.path(), Some(&PathBuf::from("/tmp/state.json")));
    }

    #[test]
    fn test_parse_message_includes_cause() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SchedulerError::Parse {
            path: PathBuf::from("state.json"),
            source,
        };

        let msg = err.to_string();
        assert!(msg.contains("state.json"));
        assert!(msg.contains("EOF"));
    }
}
