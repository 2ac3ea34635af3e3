//! Error types for the rngr graph generation service.

use crate::jobs::{BatchId, JobId, JobStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Defects found while validating a raw graph request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{field}' is not allowed for graph type '{graph_type}'")]
    FieldNotAllowed { field: String, graph_type: String },

    #[error("Unknown graph type '{0}'")]
    UnknownGraphType(String),

    #[error("Field '{field}' must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Field '{field}' is invalid: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Degree constraints that no simple graph can realize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfeasibleError {
    #[error("Degree {degree} must be smaller than the node count {nodes}")]
    DegreeTooLarge { degree: u64, nodes: u64 },

    #[error("Degree sum {nodes} x {degree} is odd")]
    OddDegreeSum { nodes: u64, degree: u64 },

    #[error("Degree {degree} cannot form a connected graph on {nodes} nodes")]
    NotConnectable { nodes: u64, degree: u64 },

    #[error("Minimum degree {min} exceeds maximum degree {max}")]
    EmptyDegreeRange { min: u64, max: u64 },

    #[error("No in-range adjustment makes the degree sum even")]
    ParityUnreachable,

    #[error("No graphical degree sequence drawn after {attempts} attempts")]
    NoGraphicalSequence { attempts: usize },

    #[error("{edges} edges exceed the {max_edges} possible on {nodes} nodes")]
    TooManyEdges {
        edges: u64,
        max_edges: u64,
        nodes: u64,
    },

    #[error("{edges} edges cannot connect {nodes} nodes")]
    TooFewEdges { edges: u64, nodes: u64 },
}

/// Failures raised while building a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Planning failed: {0}")]
    Infeasible(#[from] InfeasibleError),

    #[error("Stub matching stalled after {rejected} consecutive rejected draws")]
    Stalled { rejected: usize },

    #[error("Spanning tree could not be built within the degree caps")]
    SpanningTree,

    #[error("Generated graph violates its plan: {0}")]
    Verification(String),

    #[error("Generation worker failed: {0}")]
    Worker(String),
}

/// API-level errors. Every variant maps to a machine-readable kind and an HTTP status.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Invalid graph request: {0}")]
    Validation(#[from] SpecError),

    #[error("{field} = {value} exceeds the limit of {limit}")]
    LimitExceeded {
        field: &'static str,
        value: u64,
        limit: u64,
    },

    #[error("Infeasible graph request: {0}")]
    Infeasible(#[from] InfeasibleError),

    #[error("Graph generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Job not found: {0}")]
    JobNotFound(JobId),

    #[error("Batch not found: {0}")]
    BatchNotFound(BatchId),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Job {id} is {status} and has no graph yet")]
    NotReady { id: JobId, status: JobStatus },

    #[error("Job {0} errored and has no graph")]
    JobErrored(JobId),

    #[error("Batch {id} still has {pending} unfinished jobs")]
    BatchNotReady { id: BatchId, pending: usize },

    #[error("Could not build archive: {0}")]
    Archive(String),

    #[error("Batch of {size} items exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Batch is empty")]
    EmptyBatch,

    #[error("Job {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Generation queue is full")]
    QueueFull,

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<zip::result::ZipError> for ApiError {
    fn from(err: zip::result::ZipError) -> Self {
        ApiError::Archive(err.to_string())
    }
}

impl ApiError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation",
            ApiError::LimitExceeded { .. } => "limit_exceeded",
            ApiError::Infeasible(_) => "infeasible",
            ApiError::Generation(GenerationError::Infeasible(_)) => "infeasible",
            ApiError::Generation(GenerationError::Stalled { .. }) => "generation_stall",
            ApiError::Generation(_) => "generation",
            ApiError::JobNotFound(_) | ApiError::BatchNotFound(_) | ApiError::RouteNotFound(_) => {
                "not_found"
            }
            ApiError::NotReady { .. } | ApiError::BatchNotReady { .. } => "not_ready",
            ApiError::JobErrored(_) => "job_errored",
            ApiError::BatchTooLarge { .. } => "batch_too_large",
            ApiError::EmptyBatch => "empty_batch",
            ApiError::InvalidTransition { .. } => "invalid_transition",
            ApiError::QueueFull => "queue_full",
            ApiError::Timeout(_) => "timeout",
            ApiError::Archive(_) => "archive",
            ApiError::ConfigError(_) => "config",
        }
    }

    /// HTTP status code for this error
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_)
            | ApiError::LimitExceeded { .. }
            | ApiError::Infeasible(_)
            | ApiError::BatchTooLarge { .. }
            | ApiError::EmptyBatch => 400,
            ApiError::JobNotFound(_) | ApiError::BatchNotFound(_) | ApiError::RouteNotFound(_) => {
                404
            }
            ApiError::NotReady { .. } | ApiError::BatchNotReady { .. } | ApiError::JobErrored(_) => {
                409
            }
            ApiError::QueueFull => 503,
            ApiError::Timeout(_) => 504,
            ApiError::Generation(_)
            | ApiError::InvalidTransition { .. }
            | ApiError::Archive(_)
            | ApiError::ConfigError(_) => 500,
        }
    }

    /// Structured payload for wire responses and job records
    pub fn detail(&self) -> ErrorDetail {
        ErrorDetail {
            kind: self.kind().to_string(),
            message: self.to_string(),
        }
    }
}

/// Structured error stored on errored jobs and rejected batch items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

impl From<&GenerationError> for ErrorDetail {
    fn from(err: &GenerationError) -> Self {
        ApiError::Generation(err.clone()).detail()
    }
}
