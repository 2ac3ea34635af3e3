//! Graph service
//!
//! Wires limits, the job store, the scheduler, batches and expiry sweeps together. The
//! router and the CLI talk to this facade only.

use crate::config::RngrConfig;
use crate::error::ApiError;
use crate::jobs::{
    Admission, BatchCoordinator, BatchId, BatchView, JobId, JobScheduler, JobStatus, JobStore,
    JobView, Maintenance, QueueStats,
};
use crate::limits::Limits;
use crate::render::{self, GraphFormat};
use serde_json::Value;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Backoff schedule for [`GraphService::poll_until_terminal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Give up after this long; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(300)),
        }
    }
}

pub struct GraphService {
    admission: Admission,
    store: Arc<JobStore>,
    scheduler: Arc<JobScheduler>,
    batches: Arc<BatchCoordinator>,
    maintenance: Maintenance,
}

impl GraphService {
    /// Build the service from a validated configuration. Workers are not started.
    pub fn new(config: &RngrConfig) -> Self {
        let admission = Admission::new(config.limits, config.generation.weight_defaults());
        let store = Arc::new(JobStore::with_ttl(config.scheduler.request_ttl()));
        let scheduler = Arc::new(JobScheduler::new(
            Arc::clone(&store),
            config.scheduler.clone(),
            config.generation.clone(),
        ));
        let batches = Arc::new(BatchCoordinator::new(Arc::clone(&scheduler), admission));
        let maintenance = Maintenance::new(
            Arc::clone(&store),
            Arc::clone(&batches),
            config.scheduler.maintenance_interval(),
        );
        Self {
            admission,
            store,
            scheduler,
            batches,
            maintenance,
        }
    }

    /// Start the workers and the expiry sweeps
    pub fn start(&self) -> Result<(), ApiError> {
        self.scheduler.start()?;
        self.maintenance.start();
        Ok(())
    }

    pub async fn stop(&self) -> Result<(), ApiError> {
        self.maintenance.stop().await;
        self.scheduler.stop().await
    }

    pub fn limits(&self) -> Limits {
        self.admission.limits
    }

    /// Validate, check feasibility and enqueue a single graph request
    pub async fn submit(&self, raw: &Value) -> Result<JobView, ApiError> {
        let spec = self.admission.admit(raw)?;
        let job = self.scheduler.submit(spec, None).await?;
        info!(job_id = %job.id, graph_type = %job.spec.graph_type(), "Job submitted");
        Ok(job.view())
    }

    pub fn job(&self, id: JobId) -> Result<JobView, ApiError> {
        Ok(self.store.get(id)?.view())
    }

    /// Every job, ordered by id
    pub fn jobs(&self) -> Vec<JobView> {
        self.store.list().iter().map(|job| job.view()).collect()
    }

    /// Render the graph of a finished job.
    ///
    /// Unknown ids fail with [`ApiError::JobNotFound`]; jobs that are still pending or
    /// that errored fail with [`ApiError::NotReady`] and [`ApiError::JobErrored`].
    pub fn download(&self, id: JobId, format: GraphFormat) -> Result<String, ApiError> {
        let job = self.store.get(id)?;
        match (job.status, job.result) {
            (JobStatus::Finished, Some(graph)) => Ok(render::render(&graph, format)),
            (JobStatus::Errored, _) => Err(ApiError::JobErrored(id)),
            (status, _) => Err(ApiError::NotReady { id, status }),
        }
    }

    pub async fn submit_batch(&self, raw: &Value) -> Result<BatchView, ApiError> {
        self.batches.submit(raw).await
    }

    pub fn batch(&self, id: BatchId) -> Result<BatchView, ApiError> {
        self.batches.get(id)
    }

    pub fn batches(&self) -> Vec<BatchView> {
        self.batches.list()
    }

    /// Zip archive with one `rngr-<job id>.<ext>` entry per finished job of the batch.
    ///
    /// Fails with [`ApiError::BatchNotReady`] while any accepted job is queued or
    /// running. Errored jobs, and jobs that have already expired, have no entry.
    pub fn download_batch(&self, id: BatchId, format: GraphFormat) -> Result<Vec<u8>, ApiError> {
        let jobs: Vec<_> = self
            .batches
            .job_ids(id)?
            .into_iter()
            .filter_map(|job_id| self.store.get(job_id).ok())
            .collect();
        let pending = jobs.iter().filter(|job| !job.status.is_terminal()).count();
        if pending > 0 {
            return Err(ApiError::BatchNotReady { id, pending });
        }

        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
        let mut entries = 0usize;
        for job in &jobs {
            let Some(graph) = &job.result else {
                continue;
            };
            archive.start_file(format!("rngr-{}.{}", job.id, format.extension()), options)?;
            archive
                .write_all(render::render(graph, format).as_bytes())
                .map_err(|err| ApiError::Archive(err.to_string()))?;
            entries += 1;
        }
        let bytes = archive.finish()?.into_inner();
        debug!(batch_id = %id, entries, size = bytes.len(), "Batch archive built");
        Ok(bytes)
    }

    pub fn stats(&self) -> QueueStats {
        self.scheduler.stats()
    }

    pub async fn wait_for_idle(&self, timeout: Option<Duration>) -> Result<(), ApiError> {
        self.scheduler.wait_for_idle(timeout).await
    }

    /// Poll a job with exponential backoff until it is finished or errored.
    ///
    /// Status only moves forward, so this terminates once a worker has picked the job up.
    pub async fn poll_until_terminal(
        &self,
        id: JobId,
        poll: PollConfig,
    ) -> Result<JobView, ApiError> {
        let start = Instant::now();
        let mut delay = poll.initial_delay;
        loop {
            let job = self.job(id)?;
            if job.status.is_terminal() {
                return Ok(job);
            }
            if let Some(timeout) = poll.timeout {
                if start.elapsed() >= timeout {
                    return Err(ApiError::Timeout(format!("job {}", id)));
                }
            }
            sleep(delay).await;
            delay = (delay * 2).min(poll.max_delay);
        }
    }
}
