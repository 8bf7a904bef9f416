//! Worker module: the supervising loop
//!
//! The Worker asks the watcher whether a run is due, runs the mover when it
//! is, and decides whether a failure is worth stopping the daemon for.

mod config;
mod core;
mod error;
mod events;

pub use config::WorkerConfig;
pub use core::{RunGate, StopReason, TaskMover, Worker, WorkerReport};
pub use error::{FailureKind, WorkError};
