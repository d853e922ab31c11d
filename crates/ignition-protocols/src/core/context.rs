//! Core context for initialization.

use std::sync::Arc;

use crate::context::PublicContextAccess;
use crate::event::EventBusAccess;

/// Context passed to cores during initialization.
#[derive(Clone)]
pub struct CoreContext {
    /// Configuration for this core.
    pub config: serde_json::Value,

    /// Shared event bus.
    pub event_bus: Arc<dyn EventBusAccess>,

    /// Shared public context.
    pub public_context: Arc<dyn PublicContextAccess>,
}

impl CoreContext {
    /// Create a new core context.
    pub fn new(
        config: serde_json::Value,
        event_bus: Arc<dyn EventBusAccess>,
        public_context: Arc<dyn PublicContextAccess>,
    ) -> Self {
        Self {
            config,
            event_bus,
            public_context,
        }
    }

    /// Get a configuration value.
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
