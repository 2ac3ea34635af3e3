//! Batch Coordinator
//!
//! Fans a list of graph requests out to independent jobs. Items are admitted one by one,
//! so an invalid item is reported in its slot without blocking the others.

use super::admission::Admission;
use super::job::{BatchId, JobId, JobStatus};
use super::scheduler::JobScheduler;
use crate::error::{ApiError, ErrorDetail, SpecError};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::info;

/// Outcome of one batch item, in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchItem {
    Accepted { index: usize, job_id: JobId },
    Rejected { index: usize, error: ErrorDetail },
}

impl BatchItem {
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            BatchItem::Accepted { job_id, .. } => Some(*job_id),
            BatchItem::Rejected { .. } => None,
        }
    }
}

/// Aggregate batch state, derived from its accepted jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Queued,
    Running,
    Finished,
}

impl BatchStatus {
    /// `finished` once every job is terminal, `queued` while none has started
    pub fn derive(statuses: &[JobStatus]) -> Self {
        if statuses.iter().all(|status| status.is_terminal()) {
            BatchStatus::Finished
        } else if statuses.iter().all(|status| *status == JobStatus::Queued) {
            BatchStatus::Queued
        } else {
            BatchStatus::Running
        }
    }
}

#[derive(Debug, Clone)]
struct Batch {
    id: BatchId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    deadline: Instant,
    items: Vec<BatchItem>,
}

impl Batch {
    fn job_ids(&self) -> Vec<JobId> {
        self.items.iter().filter_map(BatchItem::job_id).collect()
    }
}

/// Wire representation of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchView {
    pub id: BatchId,
    pub status: BatchStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted: usize,
    pub rejected: usize,
    pub items: Vec<BatchItem>,
}

pub struct BatchCoordinator {
    scheduler: Arc<JobScheduler>,
    admission: Admission,
    batches: RwLock<BTreeMap<BatchId, Batch>>,
    next_id: AtomicU64,
}

impl BatchCoordinator {
    pub fn new(scheduler: Arc<JobScheduler>, admission: Admission) -> Self {
        Self {
            scheduler,
            admission,
            batches: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Submit a batch.
    ///
    /// `raw` is either an array of graph requests or `{"number": n, "base": request}`,
    /// which submits `n` copies of `request`. An empty batch, or one larger than
    /// `max_batch_size`, is rejected as a whole; otherwise every item gets its own
    /// accepted or rejected slot.
    pub async fn submit(&self, raw: &Value) -> Result<BatchView, ApiError> {
        let limit = self.admission.limits.max_batch_size;
        let requests = expand(raw, limit)?;
        if requests.is_empty() {
            return Err(ApiError::EmptyBatch);
        }

        let id = BatchId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut items = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            let outcome = match self.admission.admit(request) {
                Ok(spec) => self.scheduler.submit(spec, Some(id)).await,
                Err(err) => Err(err),
            };
            items.push(match outcome {
                Ok(job) => BatchItem::Accepted {
                    index,
                    job_id: job.id,
                },
                Err(err) => BatchItem::Rejected {
                    index,
                    error: err.detail(),
                },
            });
        }

        let created_at = Utc::now();
        let (deadline, expires_at) = self.scheduler.store().expiry(created_at);
        let batch = Batch {
            id,
            created_at,
            expires_at,
            deadline,
            items,
        };
        let view = self.view(&batch);
        info!(
            batch_id = %id,
            accepted = view.accepted,
            rejected = view.rejected,
            "Batch submitted"
        );
        self.batches.write().insert(id, batch);
        Ok(view)
    }

    pub fn get(&self, id: BatchId) -> Result<BatchView, ApiError> {
        let batch = self.batch(id)?;
        Ok(self.view(&batch))
    }

    /// Ids of the batch's accepted jobs, in item order
    pub fn job_ids(&self, id: BatchId) -> Result<Vec<JobId>, ApiError> {
        Ok(self.batch(id)?.job_ids())
    }

    /// Drop batches past their deadline whose jobs are all terminal or already gone
    pub fn expire(&self, now: Instant) -> Vec<BatchId> {
        let store = self.scheduler.store();
        let mut batches = self.batches.write();
        let expired: Vec<BatchId> = batches
            .values()
            .filter(|batch| batch.deadline <= now)
            .filter(|batch| {
                store
                    .statuses(&batch.job_ids())
                    .iter()
                    .all(|status| status.is_terminal())
            })
            .map(|batch| batch.id)
            .collect();
        for id in &expired {
            batches.remove(id);
        }
        expired
    }

    /// Every batch, ordered by id
    pub fn list(&self) -> Vec<BatchView> {
        let batches: Vec<Batch> = self.batches.read().values().cloned().collect();
        batches.iter().map(|batch| self.view(batch)).collect()
    }

    fn batch(&self, id: BatchId) -> Result<Batch, ApiError> {
        self.batches
            .read()
            .get(&id)
            .cloned()
            .ok_or(ApiError::BatchNotFound(id))
    }

    fn view(&self, batch: &Batch) -> BatchView {
        let job_ids = batch.job_ids();
        let statuses = self.scheduler.store().statuses(&job_ids);
        BatchView {
            id: batch.id,
            status: BatchStatus::derive(&statuses),
            created_at: batch.created_at,
            expires_at: batch.expires_at,
            accepted: job_ids.len(),
            rejected: batch.items.len() - job_ids.len(),
            items: batch.items.clone(),
        }
    }
}

/// Normalize either accepted batch shape into a list of at most `limit` requests
fn expand(raw: &Value, limit: usize) -> Result<Vec<Value>, ApiError> {
    let too_large = |size: usize| ApiError::BatchTooLarge { size, limit };
    match raw {
        Value::Array(items) if items.len() > limit => Err(too_large(items.len())),
        Value::Array(items) => Ok(items.clone()),
        Value::Object(body) => {
            if let Some(unknown) = body.keys().find(|key| *key != "number" && *key != "base") {
                return Err(SpecError::UnknownField(unknown.clone()).into());
            }
            let number = body
                .get("number")
                .ok_or(SpecError::MissingField("number"))?
                .as_u64()
                .ok_or(SpecError::InvalidType {
                    field: "number",
                    expected: "a non-negative integer",
                })?;
            let base = body.get("base").ok_or(SpecError::MissingField("base"))?;
            let size = usize::try_from(number).unwrap_or(usize::MAX);
            if size > limit {
                return Err(too_large(size));
            }
            Ok(vec![base.clone(); size])
        }
        _ => Err(SpecError::InvalidType {
            field: "batch",
            expected: "an array of graph requests or an object with number and base",
        }
        .into()),
    }
}
