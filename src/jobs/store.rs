//! In-memory job store.
//!
//! Every job record lives in one map behind a `parking_lot::RwLock`. Readers get a cloned
//! snapshot, so a reader never observes a half-written record, and each transition is a
//! single write under the lock.
//!
//! Each record carries a deadline `ttl` after its creation. Once a job is terminal and
//! past its deadline, [`JobStore::expire`] drops it.

use super::job::{BatchId, Job, JobId, JobStatus};
use crate::error::{ApiError, ErrorDetail, GenerationError};
use crate::generator::Graph;
use crate::spec::GraphSpec;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Retention applied by [`JobStore::new`]
pub const DEFAULT_REQUEST_TTL: Duration = Duration::from_secs(3600);

const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

pub struct JobStore {
    jobs: RwLock<BTreeMap<JobId, Job>>,
    next_id: AtomicU64,
    ttl: Duration,
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JobStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_REQUEST_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            jobs: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Deadline for a record created at `created_at`, which must be now, as a monotonic
    /// instant and a wall-clock time
    pub fn expiry(&self, created_at: DateTime<Utc>) -> (Instant, DateTime<Utc>) {
        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let now = Instant::now();
        let deadline = now.checked_add(self.ttl).unwrap_or_else(|| now + FAR_FUTURE);
        (deadline, expires_at)
    }

    /// Record a new `queued` job and return its snapshot
    pub fn insert(&self, spec: GraphSpec, seed: i64, batch_id: Option<BatchId>) -> Job {
        let id = JobId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
        let created_at = Utc::now();
        let (deadline, expires_at) = self.expiry(created_at);
        let job = Job {
            id,
            spec,
            seed,
            status: JobStatus::Queued,
            error: None,
            result: None,
            batch_id,
            created_at,
            started_at: None,
            finished_at: None,
            expires_at,
            deadline,
        };
        self.jobs.write().insert(id, job.clone());
        debug!(job_id = %id, seed, "Job recorded");
        job
    }

    pub fn get(&self, id: JobId) -> Result<Job, ApiError> {
        self.jobs
            .read()
            .get(&id)
            .cloned()
            .ok_or(ApiError::JobNotFound(id))
    }

    /// Every job, ordered by id
    pub fn list(&self) -> Vec<Job> {
        self.jobs.read().values().cloned().collect()
    }

    /// Statuses of the given jobs, skipping unknown ids
    pub fn statuses(&self, ids: &[JobId]) -> Vec<JobStatus> {
        let jobs = self.jobs.read();
        ids.iter()
            .filter_map(|id| jobs.get(id).map(|job| job.status))
            .collect()
    }

    pub fn mark_running(&self, id: JobId) -> Result<Job, ApiError> {
        self.transition(id, JobStatus::Running, |job| {
            job.started_at = Some(Utc::now());
        })
    }

    /// Single terminal write: the graph on success, the error otherwise
    pub fn complete(
        &self,
        id: JobId,
        outcome: Result<Graph, GenerationError>,
    ) -> Result<Job, ApiError> {
        match outcome {
            Ok(graph) => self.transition(id, JobStatus::Finished, |job| {
                job.result = Some(Arc::new(graph));
                job.finished_at = Some(Utc::now());
            }),
            Err(err) => self.transition(id, JobStatus::Errored, |job| {
                job.error = Some(ErrorDetail::from(&err));
                job.finished_at = Some(Utc::now());
            }),
        }
    }

    /// Drop terminal jobs whose deadline is at or before `now`. Queued and running jobs
    /// are kept past their deadline until they finish.
    pub fn expire(&self, now: Instant) -> Vec<JobId> {
        let mut jobs = self.jobs.write();
        let expired: Vec<JobId> = jobs
            .values()
            .filter(|job| job.is_expired(now))
            .map(|job| job.id)
            .collect();
        for id in &expired {
            jobs.remove(id);
        }
        expired
    }

    fn transition<F>(&self, id: JobId, next: JobStatus, apply: F) -> Result<Job, ApiError>
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id).ok_or(ApiError::JobNotFound(id))?;
        if !job.status.can_move_to(next) {
            return Err(ApiError::InvalidTransition {
                id,
                from: job.status,
                to: next,
            });
        }
        job.status = next;
        apply(job);
        Ok(job.clone())
    }
}
