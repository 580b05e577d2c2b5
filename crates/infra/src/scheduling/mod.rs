//! Per-category workers and their orchestration

pub mod error;
pub mod orchestrator;
pub mod worker;

pub use error::{SchedulerError, SchedulerResult};
pub use orchestrator::Orchestrator;
pub use worker::{CategoryWorker, CategoryWorkerConfig};
