//! Durable last-run record
//!
//! The record is a single JSON object, `{"last_run":"2024-01-01T00:00:00"}`.
//! Reads take a shared advisory lock and writes an exclusive one, so another
//! process holding the file surfaces as `SchedulerError::Locked`.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::SchedulerError;

/// The persisted run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    /// Start of the last logical day a move ran
    pub last_run: NaiveDateTime,
}

impl RunState {
    /// Record a run on `day`
    pub fn for_day(day: NaiveDate) -> Self {
        Self {
            last_run: day.and_time(NaiveTime::MIN),
        }
    }

    /// The logical day of the last run
    pub fn day(&self) -> NaiveDate {
        self.last_run.date()
    }
}

/// Load-if-exists / overwrite-always storage for [`RunState`]
pub trait RunStateStore: Send {
    /// Load the record, `None` if it has never been written
    fn load(&self) -> Result<Option<RunState>, SchedulerError>;

    /// Replace the record
    fn save(&self, state: &RunState) -> Result<(), SchedulerError>;
}

/// [`RunStateStore`] backed by a JSON file
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        debug!(?path, "StateFile::new: called");
        Self { path }
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the record so the next check is due
    ///
    /// Returns whether a record existed.
    pub fn remove(&self) -> Result<bool, SchedulerError> {
        debug!(path = ?self.path, "StateFile::remove: called");
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(SchedulerError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl RunStateStore for StateFile {
    fn load(&self) -> Result<Option<RunState>, SchedulerError> {
        debug!(path = ?self.path, "StateFile::load: called");
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("StateFile::load: no state file");
                return Ok(None);
            }
            Err(source) => {
                return Err(SchedulerError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        FileExt::try_lock_shared(&file).map_err(|source| SchedulerError::Locked {
            path: self.path.clone(),
            source,
        })?;

        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|source| SchedulerError::Read {
            path: self.path.clone(),
            source,
        })?;

        let state: RunState = serde_json::from_str(&content).map_err(|source| SchedulerError::Parse {
            path: self.path.clone(),
            source,
        })?;

        debug!(last_run = %state.last_run, "StateFile::load: loaded");
        Ok(Some(state))
    }

    fn save(&self, state: &RunState) -> Result<(), SchedulerError> {
        debug!(path = ?self.path, last_run = %state.last_run, "StateFile::save: called");
        let json = serde_json::to_string(state)?;

        let write_err = |source: std::io::Error| SchedulerError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(write_err)?;

        FileExt::try_lock_exclusive(&file).map_err(|source| SchedulerError::Locked {
            path: self.path.clone(),
            source,
        })?;

        file.set_len(0).map_err(write_err)?;
        file.write_all(json.as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        Ok(())
    }
}
