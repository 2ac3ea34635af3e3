//! Job Scheduler
//!
//! Bounded FIFO queue of job ids drained by a pool of tokio worker tasks. Submission only
//! records the job and enqueues it; each worker runs planning and generation for one job
//! at a time on a blocking thread and writes the terminal state back to the store.

use super::job::{BatchId, Job, JobId};
use super::store::JobStore;
use crate::error::{ApiError, GenerationError};
use crate::generator::{self, GenerationConfig};
use crate::spec::GraphSpec;
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Drawn seeds stay below 2^53 so they survive a round trip through any JSON client.
const MAX_DRAWN_SEED: i64 = 1 << 53;

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of worker tasks
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Maximum number of queued jobs (prevents memory exhaustion)
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Seconds a job or batch is kept after it is created. Only terminal records expire.
    #[serde(default = "default_request_ttl_secs")]
    pub request_ttl_secs: u64,

    /// Seconds between sweeps for expired records
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,
}

fn default_workers() -> usize {
    4
}

fn default_max_queue_size() -> usize {
    10000
}

fn default_request_ttl_secs() -> u64 {
    3600
}

fn default_maintenance_interval_secs() -> u64 {
    600
}

/// Ten years
const MAX_TTL_SECS: u64 = 10 * 365 * 86400;

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_queue_size: default_max_queue_size(),
            request_ttl_secs: default_request_ttl_secs(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("scheduler.workers must be positive".to_string());
        }
        if self.max_queue_size == 0 {
            return Err("scheduler.max_queue_size must be positive".to_string());
        }
        if self.request_ttl_secs == 0 || self.request_ttl_secs > MAX_TTL_SECS {
            return Err(format!(
                "scheduler.request_ttl_secs must be between 1 and {}",
                MAX_TTL_SECS
            ));
        }
        if self.maintenance_interval_secs == 0 {
            return Err("scheduler.maintenance_interval_secs must be positive".to_string());
        }
        Ok(())
    }

    pub fn request_ttl(&self) -> Duration {
        Duration::from_secs(self.request_ttl_secs)
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }
}

/// Queue statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Jobs waiting for a worker
    pub pending: usize,
    /// Jobs a worker is generating
    pub running: usize,
    /// Jobs that produced a graph
    pub finished: usize,
    /// Jobs that ended with an error
    pub errored: usize,
}

/// Job scheduler
pub struct JobScheduler {
    /// Pending job ids, oldest first
    queue: Arc<Mutex<VecDeque<JobId>>>,
    /// Wakes idle workers when a job is enqueued
    notify: Arc<Notify>,
    workers: Arc<RwLock<Vec<tokio::task::JoinHandle<()>>>>,
    config: SchedulerConfig,
    generation: GenerationConfig,
    store: Arc<JobStore>,
    running: Arc<RwLock<bool>>,
    stats: Arc<RwLock<QueueStats>>,
}

impl JobScheduler {
    pub fn new(store: Arc<JobStore>, config: SchedulerConfig, generation: GenerationConfig) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
            workers: Arc::new(RwLock::new(Vec::new())),
            config,
            generation,
            store,
            running: Arc::new(RwLock::new(false)),
            stats: Arc::new(RwLock::new(QueueStats::default())),
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Record a validated spec as a `queued` job and enqueue it. Returns immediately.
    ///
    /// The job runs with the spec's seed, or with a seed drawn here so that the job's
    /// output is reproducible from its representation alone.
    pub async fn submit(&self, spec: GraphSpec, batch_id: Option<BatchId>) -> Result<Job, ApiError> {
        let mut queue = self.queue.lock().await;
        if queue.len() >= self.config.max_queue_size {
            warn!(
                queue_size = queue.len(),
                max_size = self.config.max_queue_size,
                "Generation queue is full, rejecting job"
            );
            return Err(ApiError::QueueFull);
        }

        let seed = spec
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(0..MAX_DRAWN_SEED));
        let job = self.store.insert(spec, seed, batch_id);
        queue.push_back(job.id);
        let queue_size = queue.len();
        self.stats.write().pending += 1;
        drop(queue);
        self.notify.notify_one();

        debug!(
            job_id = %job.id,
            graph_type = %job.spec.graph_type(),
            nodes = job.spec.nodes,
            seed = job.seed,
            queue_size,
            "Enqueued generation job"
        );
        Ok(job)
    }

    /// Start background workers
    pub fn start(&self) -> Result<(), ApiError> {
        let mut running = self.running.write();
        if *running {
            return Ok(());
        }
        *running = true;
        drop(running);

        let mut workers = self.workers.write();
        for i in 0..self.config.workers {
            let queue = Arc::clone(&self.queue);
            let notify = Arc::clone(&self.notify);
            let store = Arc::clone(&self.store);
            let generation = self.generation.clone();
            let running = Arc::clone(&self.running);
            let stats = Arc::clone(&self.stats);

            let handle = tokio::spawn(async move {
                Self::worker_loop(i, queue, notify, store, generation, running, stats).await;
            });
            workers.push(handle);
        }

        info!(worker_count = workers.len(), "Started generation workers");
        Ok(())
    }

    /// Stop background workers (graceful shutdown). Jobs in flight run to completion;
    /// queued jobs stay queued.
    pub async fn stop(&self) -> Result<(), ApiError> {
        let mut running = self.running.write();
        if !*running {
            return Ok(());
        }
        *running = false;
        drop(running);

        self.notify.notify_waiters();
        let workers = std::mem::take(&mut *self.workers.write());
        for (worker_id, handle) in workers.into_iter().enumerate() {
            if let Err(err) = handle.await {
                warn!(worker_id, error = %err, "Worker ended abnormally");
            }
        }

        info!("Stopped generation workers");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    pub fn stats(&self) -> QueueStats {
        self.stats.read().clone()
    }

    /// Wait until no job is queued or running
    pub async fn wait_for_idle(&self, timeout: Option<Duration>) -> Result<(), ApiError> {
        let start = Instant::now();
        loop {
            {
                let queue = self.queue.lock().await;
                if queue.is_empty() && self.stats.read().running == 0 {
                    return Ok(());
                }
            }

            if let Some(timeout) = timeout {
                if start.elapsed() >= timeout {
                    return Err(ApiError::Timeout("the job queue to drain".to_string()));
                }
            }

            sleep(Duration::from_millis(10)).await;
        }
    }

    async fn worker_loop(
        worker_id: usize,
        queue: Arc<Mutex<VecDeque<JobId>>>,
        notify: Arc<Notify>,
        store: Arc<JobStore>,
        generation: GenerationConfig,
        running: Arc<RwLock<bool>>,
        stats: Arc<RwLock<QueueStats>>,
    ) {
        debug!(worker_id, "Worker started");

        while *running.read() {
            // Claim under the queue lock so an idle check never sees the job in neither place.
            let next = {
                let mut queue = queue.lock().await;
                let next = queue.pop_front();
                if next.is_some() {
                    let mut stats = stats.write();
                    stats.pending = stats.pending.saturating_sub(1);
                    stats.running += 1;
                }
                next
            };

            let Some(job_id) = next else {
                // Wake up periodically to notice shutdown.
                tokio::select! {
                    _ = notify.notified() => continue,
                    _ = sleep(Duration::from_millis(100)) => continue,
                }
            };

            let job = match store.mark_running(job_id) {
                Ok(job) => job,
                Err(err) => {
                    error!(worker_id, job_id = %job_id, error = %err, "Could not start job");
                    let mut stats = stats.write();
                    stats.running = stats.running.saturating_sub(1);
                    continue;
                }
            };

            let started = Instant::now();
            let outcome = Self::run(&job, &generation).await;
            let failed = outcome.is_err();
            if let Err(err) = &outcome {
                warn!(worker_id, job_id = %job_id, error = %err, "Generation failed");
            }

            if let Err(err) = store.complete(job_id, outcome) {
                error!(worker_id, job_id = %job_id, error = %err, "Could not record job result");
            }
            {
                let mut stats = stats.write();
                stats.running = stats.running.saturating_sub(1);
                if failed {
                    stats.errored += 1;
                } else {
                    stats.finished += 1;
                }
            }

            info!(
                worker_id,
                job_id = %job_id,
                status = if failed { "errored" } else { "finished" },
                duration_ms = started.elapsed().as_millis() as u64,
                "Job completed"
            );
        }

        debug!(worker_id, "Worker stopped");
    }

    /// Plan and generate on a blocking thread; generation is CPU bound.
    async fn run(job: &Job, generation: &GenerationConfig) -> Result<generator::Graph, GenerationError> {
        let spec = job.spec.clone();
        let seed = job.seed;
        let generation = generation.clone();
        tokio::task::spawn_blocking(move || generator::build(&spec, seed, &generation))
            .await
            .map_err(|err| GenerationError::Worker(err.to_string()))?
    }
}
