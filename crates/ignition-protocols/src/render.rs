//! UI rendering collaborator.
//!
//! The runtime decides *when* to render and *with what props*; everything
//! else about the UI is out of scope and lives behind this trait. All
//! methods may be called multiple times over one bootstrap (splash, then
//! crash or app).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Crash descriptor handed to the crash view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashReport {
    pub message: String,
    pub details: String,
}

impl CrashReport {
    pub fn new(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: details.into(),
        }
    }
}

/// Host-supplied renderer.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render (or re-render) the application view.
    async fn render_app(&self, props: serde_json::Value) -> Result<(), RenderError>;

    /// Render the splash view shown while initializing.
    async fn render_splash(&self, state: serde_json::Value) -> Result<(), RenderError>;

    /// Render the terminal crash view.
    async fn render_crash(&self, report: CrashReport) -> Result<(), RenderError>;

    /// Remove the splash view.
    async fn detach_splash(&self) -> Result<(), RenderError>;

    /// Refresh the debug view. Hosts without one can keep the default.
    async fn render_debug(&self, state: serde_json::Value) -> Result<(), RenderError> {
        let _ = state;
        Ok(())
    }
}
