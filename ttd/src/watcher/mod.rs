//! Watcher module for the once-per-day gate
//!
//! The Watcher decides whether the logical day has advanced past the last
//! recorded run and persists the run day when a move is performed.

mod config;
mod core;
mod error;
mod state;

pub use config::WatcherConfig;
pub use core::Watcher;
pub use error::SchedulerError;
pub use state::{RunState, RunStateStore, StateFile};
