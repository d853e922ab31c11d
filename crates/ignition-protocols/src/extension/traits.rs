//! Extension trait definition.

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;

use super::{ExtensionContext, ExtensionManifest};
use crate::context::ContextValue;
use crate::error::ExtensionError;
use crate::event::AwaitEvent;
use crate::task::InitializerTask;

/// Core trait for all extensions.
///
/// An extension is a one-shot plugin: validated, initialized once, and then
/// only reachable through the capabilities it published. A failing
/// extension is rejected without aborting the bootstrap.
#[async_trait]
pub trait Extension: Send + Sync + 'static {
    /// Returns the extension manifest.
    fn manifest(&self) -> &ExtensionManifest;

    /// Initialize the extension with the given context.
    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError> {
        let _ = ctx;
        Ok(())
    }

    /// Deferred tasks run sequentially during attach, after `initialize`.
    fn initializers(&self) -> Vec<InitializerTask> {
        Vec::new()
    }

    /// Capabilities merged into the public context on acceptance.
    fn public_methods(&self) -> HashMap<String, ContextValue> {
        HashMap::new()
    }

    /// Events that must fire once before attachment completes.
    fn await_events(&self) -> Vec<AwaitEvent> {
        Vec::new()
    }

    /// Returns a reference to the extension as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
