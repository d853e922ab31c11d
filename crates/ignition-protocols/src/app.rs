//! Application delegate.
//!
//! The host application declares its lifecycle hook, public surface and
//! splash gating here; the runtime drives it.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::context::ContextValue;
use crate::error::RuntimeError;
use crate::event::EventHandler;
use crate::task::InitializerTask;

/// Application-level hooks consumed by the runtime orchestrator.
#[async_trait]
pub trait AppDelegate: Send + Sync + 'static {
    /// Display name used in logs.
    fn name(&self) -> &str {
        "app"
    }

    /// When set, splash detachment is deferred until this event fires.
    fn splash_await_event(&self) -> Option<&str> {
        None
    }

    /// App-level hook run after the initializer queue drains. A failure
    /// here is structural and crashes the bootstrap.
    async fn initialize(&self) -> Result<(), RuntimeError> {
        Ok(())
    }

    /// App-contributed deferred tasks, merged into the initializer queue
    /// just before the post-bootstrap drain.
    fn initializer_tasks(&self) -> Vec<InitializerTask> {
        Vec::new()
    }

    /// App event handlers subscribed just before the finish event.
    fn public_events(&self) -> Vec<(String, EventHandler)> {
        Vec::new()
    }

    /// App capabilities registered (locked) into the public context.
    fn public_methods(&self) -> HashMap<String, ContextValue> {
        HashMap::new()
    }
}
