//! Periodic sweep scheduling.
//!
//! A recurring timer re-triggers the batch sweep so candidates left
//! pending (a crashed request, a race with interview completion) are
//! eventually evaluated. The scheduler is an explicit, cancellable task:
//! tests drive it with [`SweepScheduler::trigger`] instead of waiting for
//! real time, and [`SweepScheduler::shutdown`] stops it cleanly.
//!
//! Overlap safety lives in the orchestrator's sweep guard - a tick that
//! lands while a sweep is still running results in a no-op sweep, never a
//! concurrent one.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::orchestrator::EvaluationOrchestrator;

/// A cancellable periodic task running batch sweeps.
pub struct SweepScheduler {
    handle: tokio::task::JoinHandle<()>,
    shutdown: watch::Sender<bool>,
    trigger: mpsc::Sender<()>,
}

impl SweepScheduler {
    /// Spawn the scheduler. The first sweep runs one full interval after
    /// spawning, then every interval thereafter; missed ticks are skipped,
    /// not bunched.
    pub fn spawn(orchestrator: Arc<EvaluationOrchestrator>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        run_sweep(&orchestrator).await;
                    }
                    Some(()) = trigger_rx.recv() => {
                        run_sweep(&orchestrator).await;
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::debug!("sweep scheduler shutting down");
                        break;
                    }
                }
            }
        });

        Self {
            handle,
            shutdown: shutdown_tx,
            trigger: trigger_tx,
        }
    }

    /// Fire one sweep now, without waiting for the timer.
    ///
    /// A trigger while a sweep is already queued is dropped; the pending
    /// sweep covers it.
    pub fn trigger(&self) {
        let _ = self.trigger.try_send(());
    }

    /// Request shutdown. The in-flight sweep, if any, completes first.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the scheduler task to exit.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

async fn run_sweep(orchestrator: &EvaluationOrchestrator) {
    match orchestrator.process_pending().await {
        Ok(report) => {
            if report.evaluated > 0 || !report.errors.is_empty() {
                tracing::info!(
                    evaluated = report.evaluated,
                    failed = report.errors.len(),
                    "scheduled sweep finished"
                );
            }
        }
        Err(e) => tracing::error!(error = %e, "scheduled sweep failed"),
    }
}
