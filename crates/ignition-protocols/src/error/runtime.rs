//! Top-level runtime errors.

use thiserror::Error;

use super::{CoreError, RenderError};

/// Structural failures that abort the bootstrap and crash the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("App initialization failed: {0}")]
    AppInitializeFailed(String),

    #[error("{0}")]
    Custom(String),
}
