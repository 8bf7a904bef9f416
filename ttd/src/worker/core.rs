//! Worker implementation

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use super::config::WorkerConfig;
use super::error::{FailureKind, WorkError};
use super::events;
use crate::config::Settings;
use crate::lifetime::Lifetime;
use crate::mover::{MoveOutcome, Mover};
use crate::watcher::{RunStateStore, Watcher};

/// The daily gate as seen by the worker
pub trait RunGate: Send {
    fn is_time_to_run(&mut self) -> Result<bool, WorkError>;
    fn mark_run(&mut self) -> Result<(), WorkError>;
}

/// The task move as seen by the worker
pub trait TaskMover: Send {
    fn run(&mut self) -> Result<MoveOutcome, WorkError>;
}

impl<S: RunStateStore> RunGate for Watcher<S> {
    fn is_time_to_run(&mut self) -> Result<bool, WorkError> {
        Ok(Watcher::is_time_to_run(self)?)
    }

    fn mark_run(&mut self) -> Result<(), WorkError> {
        Ok(Watcher::mark_run(self)?)
    }
}

impl<S: Settings> TaskMover for Mover<S> {
    fn run(&mut self) -> Result<MoveOutcome, WorkError> {
        Ok(Mover::run(self)?)
    }
}

/// Why the worker loop ended
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StopReason {
    /// A stop was requested through the lifetime handle
    #[default]
    Cancelled,
    /// A fatal failure, with its message
    Fatal(String),
}

/// Summary of a finished worker loop
#[derive(Debug, Clone, Default)]
pub struct WorkerReport {
    /// Loop iterations started
    pub iterations: u64,
    /// Iterations in which the gate opened and the move succeeded
    ///
    /// A failed move is counted in `recovered` instead.
    pub runs: u64,
    /// Tasks archived across all runs
    pub tasks_moved: usize,
    /// Mover failures that were logged and skipped
    pub recovered: u64,
    pub stop: StopReason,
}

/// The Worker sequences the gate and the mover on a fixed interval
///
/// It is strictly sequential: the only await point is the wait between
/// iterations, which is also the only place a stop request is observed.
pub struct Worker<G: RunGate, M: TaskMover> {
    config: WorkerConfig,
    gate: G,
    mover: M,
    lifetime: Lifetime,
}

impl<G: RunGate, M: TaskMover> Worker<G, M> {
    /// Create a new Worker
    pub fn new(config: WorkerConfig, gate: G, mover: M, lifetime: Lifetime) -> Self {
        debug!(?config, "Worker::new: called");
        Self {
            config,
            gate,
            mover,
            lifetime,
        }
    }

    /// Run until a stop is requested or a fatal failure occurs
    ///
    /// On exit the lifetime handle is told to stop so the host can shut down.
    pub async fn run(mut self) -> WorkerReport {
        events::daemon_started();
        events::monitoring();

        let mut stop_rx = self.lifetime.subscribe();
        let mut report = WorkerReport::default();

        loop {
            report.iterations += 1;
            match self.guarded_iteration() {
                Ok(Some(outcome)) => {
                    report.runs += 1;
                    if let MoveOutcome::Moved { count, .. } = outcome {
                        report.tasks_moved += count;
                    }
                    events::monitoring();
                }
                Ok(None) => {}
                Err(err) => match err.kind() {
                    FailureKind::Recoverable => {
                        events::recoverable(&err);
                        report.recovered += 1;
                        events::monitoring();
                    }
                    FailureKind::Fatal => {
                        events::critical(&err);
                        report.stop = StopReason::Fatal(err.to_string());
                        break;
                    }
                },
            }

            if !wait(self.config.interval(), &mut stop_rx).await {
                debug!("Worker::run: stop requested");
                report.stop = StopReason::Cancelled;
                break;
            }
        }

        self.lifetime.request_stop();
        events::daemon_stopped();
        debug!(?report, "Worker::run: finished");
        report
    }

    /// One pass: check the gate, mark the run, move tasks
    ///
    /// Returns `None` when no run was due.
    fn iteration(&mut self) -> Result<Option<MoveOutcome>, WorkError> {
        if !self.gate.is_time_to_run()? {
            return Ok(None);
        }
        self.gate.mark_run()?;
        let outcome = self.mover.run()?;
        Ok(Some(outcome))
    }

    /// Run one iteration, turning a panic into a fatal failure
    fn guarded_iteration(&mut self) -> Result<Option<MoveOutcome>, WorkError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.iteration())) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(WorkError::Panicked(message))
            }
        }
    }
}

/// Wait for `interval`; false if a stop was requested first
async fn wait(interval: Duration, stop_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(interval) => true,
        _ = stop_rx.wait_for(|stopping| *stopping) => false,
    }
}
