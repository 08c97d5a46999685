//! Expiry scheduler
//!
//! Periodically closes every job whose deadline has passed. The sweep itself
//! lives on [`AuctionEngine::sweep`] so read paths and tests can run it
//! directly; this module only owns the timer.
//!
//! A failed sweep is logged and retried on the next tick. Jobs it could not
//! close stay open until a sweep succeeds.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::{AuctionEngine, SweepReport};

/// Configuration for the expiry scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between sweeps (default: 10 seconds).
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
        }
    }
}

/// Handle to the background sweep task.
pub struct ExpiryScheduler {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ExpiryScheduler {
    /// Spawn the sweep loop on the current tokio runtime.
    ///
    /// The first sweep runs immediately, which closes anything that expired
    /// while the process was down.
    pub fn spawn(engine: Arc<AuctionEngine>, config: SchedulerConfig) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_sweep_loop(engine, config, cancel.clone()));
        Self { cancel, handle }
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop the loop and wait for an in-flight sweep to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            warn!(error = %err, "Expiry scheduler task ended abnormally");
        }
    }
}

async fn run_sweep_loop(
    engine: Arc<AuctionEngine>,
    config: SchedulerConfig,
    cancel: CancellationToken,
) {
    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        interval_ms = config.interval.as_millis() as u64,
        "Expiry scheduler started"
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Expiry scheduler shutting down");
                break;
            }
            _ = ticker.tick() => {
                // Sweeps may hit the disk
                let engine = Arc::clone(&engine);
                let result =
                    tokio::task::spawn_blocking(move || run_sweep(&engine, Utc::now())).await;
                if let Err(err) = result {
                    warn!(error = %err, "Sweep task panicked");
                }
            }
        }
    }
}

/// Run one sweep, logging instead of failing.
///
/// Returns None when the sweep failed.
pub fn run_sweep(engine: &AuctionEngine, now: DateTime<Utc>) -> Option<SweepReport> {
    match engine.sweep(now) {
        Ok(report) => {
            if report.closed.is_empty() {
                debug!("Sweep: no expired jobs");
            } else {
                info!(closed = report.closed.len(), "Sweep closed expired jobs");
            }
            Some(report)
        }
        Err(err) => {
            warn!(error = %err, "Sweep failed; retrying on next run");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::FlakyStore;
    use crate::store::{MemoryStore, Store};
    use chrono::Duration as ChronoDuration;
    use types::job::{JobStatus, NewJob};

    fn new_job(expires_at: DateTime<Utc>) -> NewJob {
        NewJob {
            title: None,
            description: Some("Clean gutters".to_string()),
            requirements: Some("Ladder".to_string()),
            poster_name: Some("Robin".to_string()),
            poster_contact: Some("robin@example.com".to_string()),
            expires_at: Some(expires_at.to_rfc3339()),
        }
    }

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(10));
    }

    #[test]
    fn test_run_sweep_swallows_failures() {
        let store = Arc::new(FlakyStore::default());
        let engine = AuctionEngine::new(store.clone());
        let now = Utc::now();
        engine
            .create_job(new_job(now - ChronoDuration::seconds(1)), now)
            .unwrap();

        store.set_failing(true);
        assert!(run_sweep(&engine, now).is_none());

        store.set_failing(false);
        let report = run_sweep(&engine, now).unwrap();
        assert_eq!(report.closed.len(), 1);
    }

    #[tokio::test]
    async fn test_scheduler_closes_expired_jobs() {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(AuctionEngine::new(store.clone()));
        let now = Utc::now();
        let job = engine
            .create_job(new_job(now - ChronoDuration::seconds(1)), now)
            .unwrap()
            .job;

        let scheduler = ExpiryScheduler::spawn(
            engine,
            SchedulerConfig {
                interval: Duration::from_millis(20),
            },
        );

        let mut closed = false;
        for _ in 0..100 {
            if store.job(&job.id).unwrap().unwrap().status == JobStatus::Closed {
                closed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        scheduler.shutdown().await;
        assert!(closed, "scheduler never closed the expired job");
    }

    #[tokio::test]
    async fn test_scheduler_stops_on_cancel() {
        let engine = Arc::new(AuctionEngine::new(Arc::new(MemoryStore::new())));
        let scheduler = ExpiryScheduler::spawn(engine, SchedulerConfig::default());
        let token = scheduler.cancellation_token();

        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), scheduler.handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
