//! Log events emitted by the worker

use tracing::{error, info};

use super::error::WorkError;

pub(crate) fn daemon_started() {
    info!(
        version = crate::VERSION,
        pid = std::process::id(),
        "Daemon started. Version: {} / Process Id: {}",
        crate::VERSION,
        std::process::id()
    );
}

pub(crate) fn monitoring() {
    info!("Monitoring...");
}

pub(crate) fn recoverable(err: &WorkError) {
    error!(error = %err, "{}", err);
}

pub(crate) fn critical(err: &WorkError) {
    error!(severity = "critical", error = ?err, "Unhandled failure: {}", err);
}

pub(crate) fn daemon_stopped() {
    info!(pid = std::process::id(), "Daemon stopped. Process Id: {}", std::process::id());
}
