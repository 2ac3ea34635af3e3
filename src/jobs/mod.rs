//! Job Store & Scheduler
//!
//! Owns job records and their state machine, dispatches generation work to the worker
//! pool, groups jobs submitted together into batches, and expires old records.

pub mod admission;
pub mod batch;
pub mod job;
pub mod maintenance;
pub mod scheduler;
pub mod store;

pub use admission::Admission;
pub use batch::{BatchCoordinator, BatchItem, BatchStatus, BatchView};
pub use job::{BatchId, Job, JobId, JobStatus, JobView};
pub use maintenance::{Maintenance, SweepReport};
pub use scheduler::{JobScheduler, QueueStats, SchedulerConfig};
pub use store::{JobStore, DEFAULT_REQUEST_TTL};
