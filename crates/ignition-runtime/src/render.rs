//! Renderer stand-in for headless hosts.

use async_trait::async_trait;
use tracing::{debug, error};

use ignition_protocols::error::RenderError;
use ignition_protocols::render::{CrashReport, Renderer};

/// A renderer that only logs. Used by headless hosts and as a safe default.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn render_app(&self, _props: serde_json::Value) -> Result<(), RenderError> {
        debug!("render: app");
        Ok(())
    }

    async fn render_splash(&self, _state: serde_json::Value) -> Result<(), RenderError> {
        debug!("render: splash");
        Ok(())
    }

    async fn render_crash(&self, report: CrashReport) -> Result<(), RenderError> {
        error!(message = %report.message, details = %report.details, "render: crash");
        Ok(())
    }

    async fn detach_splash(&self) -> Result<(), RenderError> {
        debug!("render: splash detached");
        Ok(())
    }
}
