//! Public context errors.
//!
//! Context violations are reported, never propagated: a locked key stays
//! untouched and the offending write becomes a logged no-op.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Context key is locked: {0}")]
    KeyLocked(String),

    #[error("Context key not found: {0}")]
    NotFound(String),

    #[error("Core namespace already exposed: {0}")]
    NamespaceExists(String),

    #[error("Invalid arguments for context method: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Custom(String),
}
