//! One-shot "dependencies ready" signal

use std::sync::Arc;

use tokio::sync::watch;

/// Readiness gate shared between the host and background tasks
///
/// Starts closed; `mark_ready` opens it for good.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    tx: Arc<watch::Sender<bool>>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Open the gate
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the gate opens
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
