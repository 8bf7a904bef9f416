//! Worker failure classification

use thiserror::Error;

use crate::mover::MoverError;
use crate::watcher::SchedulerError;

/// How the worker reacts to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Log it and keep looping
    Recoverable,
    /// Log it and stop the daemon
    Fatal,
}

/// A failure surfaced from one worker iteration
#[derive(Debug, Error)]
pub enum WorkError {
    #[error(transparent)]
    Mover(#[from] MoverError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("{0:#}")]
    Unexpected(eyre::Report),

    #[error("Panicked: {0}")]
    Panicked(String),
}

impl WorkError {
    /// Only mover failures are recoverable
    pub fn kind(&self) -> FailureKind {
        match self {
            WorkError::Mover(_) => FailureKind::Recoverable,
            WorkError::Scheduler(_) | WorkError::Unexpected(_) | WorkError::Panicked(_) => FailureKind::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == FailureKind::Fatal
    }
}

impl From<eyre::Report> for WorkError {
    fn from(report: eyre::Report) -> Self {
        WorkError::Unexpected(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_mover_errors_are_recoverable() {
        let err: WorkError = MoverError::Configuration {
            key: "paths.todo-txt".to_string(),
        }
        .into();

        assert_eq!(err.kind(), FailureKind::Recoverable);
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "paths.todo-txt cannot be empty");
    }

    #[test]
    fn test_scheduler_errors_are_fatal() {
        let err: WorkError = SchedulerError::Write {
            path: PathBuf::from("state.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();

        assert_eq!(err.kind(), FailureKind::Fatal);
        assert!(err.to_string().contains("state.json"));
    }

    #[test]
    fn test_unclassified_errors_are_fatal() {
        let err: WorkError = eyre::eyre!("something odd").into();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "something odd");

        assert!(WorkError::Panicked("boom".to_string()).is_fatal());
    }
}
