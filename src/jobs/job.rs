//! Job identities, states and records.

use crate::error::ErrorDetail;
use crate::generator::Graph;
use crate::spec::{GraphSpec, SpecView};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;

/// Job identity. Assigned from a monotonically increasing counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Parse the decimal form used in URLs
    pub fn parse(raw: &str) -> Option<Self> {
        parse_decimal(raw).map(JobId)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        JobId(id)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plain ASCII digits only: no sign, no whitespace
fn parse_decimal(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Batch identity, drawn from its own counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(u64);

impl BatchId {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn parse(raw: &str) -> Option<Self> {
        parse_decimal(raw).map(BatchId)
    }
}

impl From<u64> for BatchId {
    fn from(id: u64) -> Self {
        BatchId(id)
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Job lifecycle: `queued -> running -> finished | errored`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Errored,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Finished => "finished",
            JobStatus::Errored => "errored",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Errored)
    }

    /// Whether `self -> next` is a legal forward step
    pub fn can_move_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Finished)
                | (JobStatus::Running, JobStatus::Errored)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job record as held by the store
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub spec: GraphSpec,
    /// Seed the generator runs with: the caller's, or one drawn at submission
    pub seed: i64,
    pub status: JobStatus,
    pub error: Option<ErrorDetail>,
    /// Present exactly when `status` is `finished`
    pub result: Option<Arc<Graph>>,
    pub batch_id: Option<BatchId>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Wall-clock time after which a terminal job may be dropped
    pub expires_at: DateTime<Utc>,
    /// Monotonic counterpart of `expires_at`, used by the maintenance sweep
    pub deadline: Instant,
}

impl Job {
    /// Terminal and past its deadline
    pub fn is_expired(&self, now: Instant) -> bool {
        self.status.is_terminal() && self.deadline <= now
    }

    pub fn view(&self) -> JobView {
        JobView {
            id: self.id,
            spec: SpecView::from(&self.spec),
            seed: self.seed,
            status: self.status,
            error: self.error.clone(),
            batch_id: self.batch_id,
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            expires_at: self.expires_at,
        }
    }
}

/// Wire representation of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    pub id: JobId,
    #[serde(flatten)]
    pub spec: SpecView,
    pub seed: i64,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<BatchId>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}
