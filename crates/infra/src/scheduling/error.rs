//! Scheduler error types

use exrelay_domain::RelayError;
use thiserror::Error;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Worker is already running
    #[error("Worker already running")]
    AlreadyRunning,

    /// Worker is not running
    #[error("Worker not running")]
    NotRunning,

    /// Failed to stop one or more workers
    #[error("Failed to stop workers: {0}")]
    StopFailed(String),

    /// Operation timed out
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<SchedulerError> for RelayError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                Self::InvalidInput(err.to_string())
            }
            SchedulerError::StopFailed(_)
            | SchedulerError::Timeout { .. }
            | SchedulerError::TaskJoinFailed(_) => Self::Internal(err.to_string()),
        }
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
