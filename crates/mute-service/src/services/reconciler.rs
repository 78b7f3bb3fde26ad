//! Expiry reconciler
//!
//! Periodically scans every active sanction and reverses the expired ones
//! through the engine. It is the durable path: inline timers are lost on
//! restart, the reconciler is not.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

use mute_common::ReconcilerConfig;

use super::engine::{ExpiryOutcome, SanctionEngine};
use super::error::ServiceResult;
use super::readiness::ReadinessGate;

/// Counters for one reconcile pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Active records seen
    pub scanned: usize,
    /// Timed records past their expiry
    pub expired: usize,
    pub reversed: usize,
    /// Already gone or replaced by the time the key was locked
    pub already_cleared: usize,
    /// Member or guild gone; local state dropped
    pub orphaned: usize,
    /// Left in place for the next pass
    pub failed: usize,
}

/// Periodic expiry scan
#[derive(Debug, Clone)]
pub struct ExpiryReconciler {
    engine: SanctionEngine,
    interval: Duration,
    max_concurrency: usize,
}

impl ExpiryReconciler {
    pub fn new(engine: SanctionEngine, config: &ReconcilerConfig) -> Self {
        Self {
            engine,
            interval: config.interval(),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single scan
    ///
    /// Works on a copy of the active records; each expired key is handled
    /// on its own and a failing key never stops the others.
    #[instrument(skip(self))]
    pub async fn run_pass(&self) -> ServiceResult<PassReport> {
        let records = self.engine.context().sanction_repo().list_all().await?;
        let now = self.engine.context().clock().now();

        let mut report = PassReport {
            scanned: records.len(),
            ..PassReport::default()
        };

        let expired: Vec<_> = records.into_iter().filter(|r| r.is_expired(now)).collect();
        report.expired = expired.len();

        let outcomes: Vec<_> = stream::iter(expired)
            .map(|record| {
                let engine = self.engine.clone();
                async move {
                    let key = record.key();
                    (key, engine.expire(key, record.applied_at).await)
                }
            })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        for (key, outcome) in outcomes {
            match outcome {
                Ok(ExpiryOutcome::Reversed(result)) if result.orphaned => report.orphaned += 1,
                Ok(ExpiryOutcome::Reversed(result)) => {
                    report.reversed += 1;
                    if !result.is_complete() {
                        warn!(
                            guild_id = %key.guild_id,
                            user_id = %key.user_id,
                            failures = result.restore_failures.len(),
                            "Expired sanction reversed with failures"
                        );
                    }
                }
                Ok(ExpiryOutcome::AlreadyCleared | ExpiryOutcome::Superseded) => {
                    report.already_cleared += 1;
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(guild_id = %key.guild_id, user_id = %key.user_id, error = %e, "Failed to reverse expired sanction, will retry");
                }
            }
        }

        info!(
            event = "ReconcilePassCompleted",
            scanned = report.scanned,
            expired = report.expired,
            reversed = report.reversed,
            already_cleared = report.already_cleared,
            orphaned = report.orphaned,
            failed = report.failed,
            "Reconcile pass completed"
        );
        Ok(report)
    }

    /// Start the periodic loop
    ///
    /// Waits for `readiness`, then runs a pass immediately and every
    /// interval after that. Flipping `shutdown` to true stops scheduling new
    /// passes; a pass already running is allowed to finish.
    pub fn spawn(self, readiness: ReadinessGate, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(readiness, shutdown))
    }

    async fn run(self, readiness: ReadinessGate, mut shutdown: watch::Receiver<bool>) {
        if *shutdown.borrow() {
            return;
        }

        tokio::select! {
            () = readiness.wait() => {}
            _ = shutdown.changed() => {
                debug!("Shutdown before readiness, reconciler not started");
                return;
            }
        }
        info!(interval_secs = self.interval.as_secs(), "Expiry reconciler started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_pass().await {
                        warn!(error = %e, "Reconcile pass aborted, could not list sanctions");
                    }
                }
            }
        }

        info!("Expiry reconciler stopped");
    }
}
