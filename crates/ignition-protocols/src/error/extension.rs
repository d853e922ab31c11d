//! Extension-related errors.
//!
//! Every variant here describes a *module rejection*: the extension in
//! question is excluded from the bootstrap, but the runtime keeps going.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Extension not found: {0}")]
    NotFound(String),

    #[error("Extension already attached: {0}")]
    AlreadyAttached(String),

    #[error("Extension module is not constructible: {0}")]
    NotConstructible(String),

    #[error("Extension is not a valid instance: {0}")]
    NotValidInstance(String),

    #[error("Extension initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Extension {extension} timed out waiting for dependency {dependency}")]
    DependencyTimeout { extension: String, dependency: String },

    #[error("Extension {extension} timed out waiting for event {event}")]
    AwaitEventTimeout { extension: String, event: String },

    #[error("{0}")]
    Custom(String),
}
