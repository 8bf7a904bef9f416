//! Process lifetime handle
//!
//! Shared by the signal handlers and the worker: either side may request a
//! stop, and both can wait for one.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Cloneable stop signal for the hosting process
#[derive(Debug, Clone)]
pub struct Lifetime {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifetime {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Ask the process to stop; idempotent
    pub fn request_stop(&self) {
        let was_stopping = self.tx.send_replace(true);
        debug!(was_stopping, "Lifetime::request_stop: called");
    }

    /// Whether a stop has been requested
    pub fn is_stopping(&self) -> bool {
        *self.tx.borrow()
    }

    /// A receiver that observes the stop flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Resolve once a stop has been requested
    pub async fn stopped(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|stopping| *stopping).await;
    }
}
