//! Expiry sweeps
//!
//! A background task wakes every `maintenance_interval` and drops batches and jobs that
//! are terminal and past their deadline. It is started and stopped with the workers.

use super::batch::BatchCoordinator;
use super::store::JobStore;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Records removed by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub jobs: usize,
    pub batches: usize,
}

pub struct Maintenance {
    store: Arc<JobStore>,
    batches: Arc<BatchCoordinator>,
    interval: Duration,
    shutdown: Arc<Notify>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Maintenance {
    pub fn new(store: Arc<JobStore>, batches: Arc<BatchCoordinator>, interval: Duration) -> Self {
        Self {
            store,
            batches,
            interval,
            shutdown: Arc::new(Notify::new()),
            handle: Mutex::new(None),
        }
    }

    /// Remove everything that has expired by `now`
    pub fn sweep(&self, now: Instant) -> SweepReport {
        sweep(&self.store, &self.batches, now)
    }

    /// Spawn the sweep loop. The first sweep runs one interval from now.
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.is_some() {
            return;
        }

        let store = Arc::clone(&self.store);
        let batches = Arc::clone(&self.batches);
        let shutdown = Arc::clone(&self.shutdown);
        let period = self.interval;
        *handle = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.notified() => break,
                    _ = ticks.tick() => {
                        sweep(&store, &batches, Instant::now());
                    }
                }
            }
            debug!("Maintenance stopped");
        }));
        info!(interval_secs = period.as_secs(), "Started maintenance");
    }

    pub async fn stop(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        self.shutdown.notify_one();
        if let Err(err) = handle.await {
            warn!(error = %err, "Maintenance task ended abnormally");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }
}

// Batches go first so a batch never outlives the check against its own jobs.
fn sweep(store: &JobStore, batches: &BatchCoordinator, now: Instant) -> SweepReport {
    let report = SweepReport {
        batches: batches.expire(now).len(),
        jobs: store.expire(now).len(),
    };
    if report == SweepReport::default() {
        debug!("Maintenance sweep found nothing to expire");
    } else {
        info!(
            jobs = report.jobs,
            batches = report.batches,
            "Expired finished requests"
        );
    }
    report
}
