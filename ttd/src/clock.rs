//! Clock abstraction and logical-day arithmetic
//!
//! A logical day is the calendar date of a timestamp after shifting it back by
//! a fixed number of hours. With the default offset of 3 hours, anything from
//! midnight through 02:59 still belongs to the previous day.

use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};
use tracing::debug;

/// Default day-boundary offset in hours
pub const DEFAULT_DAY_OFFSET_HOURS: u32 = 3;

/// Compute the logical day of `timestamp` for the given offset
pub fn logical_day(timestamp: NaiveDateTime, offset: TimeDelta) -> NaiveDate {
    (timestamp - offset).date()
}

/// Source of the current time and the logical day derived from it
pub trait Clock: Send + Sync {
    /// Current local timestamp
    fn now(&self) -> NaiveDateTime;

    /// Offset subtracted before truncating to a date
    fn offset(&self) -> TimeDelta {
        TimeDelta::hours(DEFAULT_DAY_OFFSET_HOURS as i64)
    }

    /// Shift `timestamp` back by the offset and truncate it to its date
    fn adjust(&self, timestamp: NaiveDateTime) -> NaiveDate {
        logical_day(timestamp, self.offset())
    }

    /// The current logical day
    fn today(&self) -> NaiveDate {
        self.adjust(self.now())
    }
}

/// Wall-clock time in the local timezone
#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: TimeDelta,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_offset_hours(DEFAULT_DAY_OFFSET_HOURS)
    }
}

impl SystemClock {
    /// Create a system clock with a custom day-boundary offset
    pub fn with_offset_hours(hours: u32) -> Self {
        debug!(hours, "SystemClock::with_offset_hours: called");
        Self {
            offset: TimeDelta::hours(hours as i64),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn offset(&self) -> TimeDelta {
        self.offset
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
    offset: TimeDelta,
}

impl ManualClock {
    /// Create a manual clock fixed at `now` with the default offset
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
            offset: TimeDelta::hours(DEFAULT_DAY_OFFSET_HOURS as i64),
        }
    }

    /// Replace the current time
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move the clock forward (or backward, for negative deltas)
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn offset(&self) -> TimeDelta {
        self.offset
    }
}
