//! Core-related errors.
//!
//! Cores are structural: any of these aborts the whole bootstrap.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Core not found: {0}")]
    NotFound(String),

    #[error("Core already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Core initialization failed: {core}: {reason}")]
    InitializationFailed { core: String, reason: String },

    #[error("Core {core} depends on unknown core {dependency}")]
    DependencyMissing { core: String, dependency: String },

    #[error("Cyclic core dependencies: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    #[error("Core {core} timed out waiting for event {event}")]
    AwaitEventTimeout { core: String, event: String },

    #[error("{0}")]
    Custom(String),
}
