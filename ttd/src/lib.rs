//! todotxt-daemon - archives completed todo.txt tasks once per day
//!
//! A long-running worker wakes up on a fixed interval, asks the watcher
//! whether the current logical day has already been handled, and if not
//! moves every completed task from todo.txt to the top of done.txt.
//!
//! # Modules
//!
//! - [`clock`] - Wall clock and logical-day arithmetic
//! - [`watcher`] - Once-per-logical-day gate backed by a state file
//! - [`mover`] - Completed-task archiving
//! - [`worker`] - Supervising loop and failure classification
//! - [`lifetime`] - Stop signal shared with the host process
//! - [`daemon`] - PID file and process control
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod clock;
pub mod config;
pub mod daemon;
pub mod lifetime;
pub mod mover;
pub mod watcher;
pub mod worker;

/// Crate version reported by the daemon at startup
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock, logical_day};
pub use config::{Config, Settings};
pub use daemon::{DaemonConfig, DaemonManager, DaemonStatus};
pub use lifetime::Lifetime;
pub use mover::{MoveOutcome, Mover, MoverError, Task};
pub use watcher::{RunState, RunStateStore, SchedulerError, StateFile, Watcher, WatcherConfig};
pub use worker::{FailureKind, RunGate, StopReason, TaskMover, WorkError, Worker, WorkerConfig, WorkerReport};
