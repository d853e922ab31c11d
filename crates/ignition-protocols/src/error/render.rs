//! Renderer collaborator errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Mount point unavailable: {0}")]
    MountUnavailable(String),
}
