//! Event bus errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event handler failed: {0}")]
    HandlerFailed(String),

    #[error("Timed out waiting for event: {0}")]
    Timeout(String),

    #[error("{0}")]
    Custom(String),
}
