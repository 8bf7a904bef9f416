//! Once-per-logical-day gate

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::SchedulerError;
use super::state::{RunState, RunStateStore, StateFile};
use crate::clock::Clock;

/// Cached last-run day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastRun {
    Unloaded,
    Loaded(NaiveDate),
}

/// The Watcher gates the mover to at most one run per logical day
///
/// The durable record is read lazily on the first check and then cached for
/// the lifetime of the Watcher; only [`Watcher::refresh`] forces a reload.
pub struct Watcher<S: RunStateStore = StateFile> {
    clock: Arc<dyn Clock>,
    store: S,
    last_run: LastRun,
}

impl<S: RunStateStore> Watcher<S> {
    /// Create a new Watcher over `store`
    pub fn new(clock: Arc<dyn Clock>, store: S) -> Self {
        Self {
            clock,
            store,
            last_run: LastRun::Unloaded,
        }
    }

    /// Whether today's logical day is past the last recorded run
    pub fn is_time_to_run(&mut self) -> Result<bool, SchedulerError> {
        let last_run = match self.last_run {
            LastRun::Loaded(day) => day,
            LastRun::Unloaded => {
                let day = match self.store.load()? {
                    Some(state) => state.day(),
                    None => {
                        debug!("Watcher::is_time_to_run: no run recorded yet");
                        NaiveDate::MIN
                    }
                };
                self.last_run = LastRun::Loaded(day);
                day
            }
        };

        let today = self.clock.today();
        let due = today > last_run;
        debug!(%today, %last_run, due, "Watcher::is_time_to_run: checked");
        Ok(due)
    }

    /// Record that a run happened today
    pub fn mark_run(&mut self) -> Result<(), SchedulerError> {
        let today = self.clock.today();
        self.last_run = LastRun::Loaded(today);
        self.store.save(&RunState::for_day(today))?;
        info!(%today, "Marked run");
        Ok(())
    }

    /// Forget the cached day so the next check reloads the store
    pub fn refresh(&mut self) {
        debug!("Watcher::refresh: called");
        self.last_run = LastRun::Unloaded;
    }

    /// The cached last-run day, if it has been loaded
    ///
    /// `NaiveDate::MIN` means no run has ever been recorded.
    pub fn last_run(&self) -> Option<NaiveDate> {
        match self.last_run {
            LastRun::Loaded(day) => Some(day),
            LastRun::Unloaded => None,
        }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }
}
