//! Initializer task errors.

use thiserror::Error;

/// Failure of a single queued initializer task.
///
/// Task failures are logged and never abort the queue drain.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Initializer task failed: {0}")]
    Failed(String),

    #[error("{0}")]
    Custom(String),
}
