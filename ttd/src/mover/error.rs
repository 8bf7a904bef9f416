//! Mover error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while moving tasks
///
/// All of these concern the user's own files or settings and can be fixed
/// without restarting the daemon.
#[derive(Debug, Error)]
pub enum MoverError {
    #[error("{key} cannot be empty")]
    Configuration { key: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is locked by another process: {source}", .path.display())]
    Locked {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read modification time of {}: {source}", .path.display())]
    Modified {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MoverError {
    /// Check if this is a missing or blank setting
    pub fn is_configuration(&self) -> bool {
        matches!(self, MoverError::Configuration { .. })
    }
}
