//! Event bus seam.
//!
//! Modules never hold a concrete bus type; they talk to the runtime's bus
//! through [`EventBusAccess`]. Dispatch is synchronous and fire-and-forget:
//! a failing handler is logged by the bus and never prevents delivery to
//! the remaining subscribers.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::EventError;

/// Payload carried by every event.
pub type EventPayload = serde_json::Value;

/// Subscriber callback. Errors are isolated per handler by the bus.
pub type EventHandler = Arc<dyn Fn(&EventPayload) -> Result<(), EventError> + Send + Sync>;

/// Opaque handle identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An event a module blocks on before completing initialization.
///
/// The optional handler is invoked with the payload of the first (and only)
/// delivery before the gate resolves.
#[derive(Clone)]
pub struct AwaitEvent {
    pub event: String,
    pub handler: Option<EventHandler>,
}

impl AwaitEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            handler: None,
        }
    }

    pub fn with_handler(event: impl Into<String>, handler: EventHandler) -> Self {
        Self {
            event: event.into(),
            handler: Some(handler),
        }
    }
}

impl fmt::Debug for AwaitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwaitEvent")
            .field("event", &self.event)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Access to the runtime event bus.
#[async_trait]
pub trait EventBusAccess: Send + Sync {
    /// Dispatch an event synchronously to all current subscribers.
    fn emit(&self, event: &str, payload: EventPayload);

    /// Subscribe to an event.
    fn on(&self, event: &str, handler: EventHandler) -> SubscriptionId;

    /// Subscribe to the next delivery of an event only.
    fn once(&self, event: &str, handler: EventHandler) -> SubscriptionId;

    /// Remove a subscription.
    fn off(&self, event: &str, id: SubscriptionId);

    /// Wait for the next delivery of an event, returning its payload.
    async fn wait_for(&self, event: &str) -> EventPayload;
}
