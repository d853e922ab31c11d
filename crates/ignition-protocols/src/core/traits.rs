//! Core trait definition.

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;

use super::{CoreContext, CoreManifest};
use crate::context::ContextValue;
use crate::error::CoreError;
use crate::event::EventHandler;
use crate::task::InitializerTask;

/// Core trait for all cores.
///
/// A core is a structural service: cores initialize strictly sequentially
/// in dependency order, and any initialization failure aborts the whole
/// bootstrap (unlike extensions, which degrade gracefully).
#[async_trait]
pub trait Core: Send + Sync + 'static {
    /// Returns the core manifest.
    fn manifest(&self) -> &CoreManifest;

    /// Initialize the core with the given context.
    async fn initialize(&mut self, ctx: CoreContext) -> Result<(), CoreError> {
        let _ = ctx;
        Ok(())
    }

    /// Public surface exposed read-only under `cores.<namespace>`.
    fn public_surface(&self) -> HashMap<String, ContextValue> {
        HashMap::new()
    }

    /// Event handlers subscribed on the shared bus at init time.
    fn on_events(&self) -> Vec<(String, EventHandler)> {
        Vec::new()
    }

    /// Capabilities registered directly into the app public context.
    fn register_to_app(&self) -> HashMap<String, ContextValue> {
        HashMap::new()
    }

    /// Optional deferred task queued for the post-bootstrap drain.
    fn deferred_initializer(&self) -> Option<InitializerTask> {
        None
    }

    /// Returns a reference to the core as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
