//! Synchronous publish/subscribe hub.
//!
//! Dispatch is fire-and-forget, in subscription order, with no replay for
//! late subscribers. A failing handler is logged and never prevents
//! delivery to the handlers after it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error};

use ignition_protocols::error::EventError;
use ignition_protocols::event::{EventBusAccess, EventHandler, EventPayload, SubscriptionId};

/// Wrap an infallible closure as an [`EventHandler`].
pub fn handler<F>(f: F) -> EventHandler
where
    F: Fn(&EventPayload) + Send + Sync + 'static,
{
    Arc::new(move |payload| {
        f(payload);
        Ok(())
    })
}

struct Subscriber {
    id: SubscriptionId,
    once: bool,
    handler: EventHandler,
}

/// The shared event bus.
pub struct EventBus {
    channels: RwLock<HashMap<String, Vec<Subscriber>>>,
}

impl EventBus {
    /// Create a new event bus.
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Dispatch an event to all current subscribers, in subscription order.
    ///
    /// `once` subscriptions are consumed before any handler runs, so a
    /// handler re-emitting the same event cannot double-fire them.
    pub fn emit(&self, event: &str, payload: EventPayload) {
        debug!(event, "event dispatched");

        let to_call: Vec<(SubscriptionId, EventHandler)> = {
            let mut channels = self.channels.write();
            let Some(subs) = channels.get_mut(event) else {
                return;
            };

            let list = subs
                .iter()
                .map(|s| (s.id, s.handler.clone()))
                .collect();

            subs.retain(|s| !s.once);
            if subs.is_empty() {
                channels.remove(event);
            }

            list
        };

        for (id, h) in to_call {
            if let Err(e) = h(&payload) {
                error!(event, subscription = %id, error = %e, "event handler failed");
            }
        }
    }

    /// Subscribe to an event. Returns a handle usable with [`EventBus::off`].
    pub fn on(&self, event: &str, handler: EventHandler) -> SubscriptionId {
        self.subscribe(event, handler, false)
    }

    /// Subscribe to the next delivery of an event only.
    pub fn once(&self, event: &str, handler: EventHandler) -> SubscriptionId {
        self.subscribe(event, handler, true)
    }

    /// Remove a subscription.
    pub fn off(&self, event: &str, id: SubscriptionId) {
        let mut channels = self.channels.write();
        if let Some(subs) = channels.get_mut(event) {
            subs.retain(|s| s.id != id);
            if subs.is_empty() {
                channels.remove(event);
            }
        }
    }

    /// Number of live subscriptions for an event.
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.channels.read().get(event).map_or(0, Vec::len)
    }

    /// Wait for the next delivery of an event, returning its payload.
    pub async fn wait_for(&self, event: &str) -> EventPayload {
        let (_id, rx) = self.oneshot_gate(event);
        rx.await.unwrap_or(EventPayload::Null)
    }

    /// Wait for an event with an upper bound. On timeout the gate
    /// subscription is removed and `EventError::Timeout` is returned.
    pub async fn wait_for_timeout(
        &self,
        event: &str,
        timeout: Duration,
    ) -> Result<EventPayload, EventError> {
        let (id, rx) = self.oneshot_gate(event);

        match tokio::time::timeout(timeout, rx).await {
            Ok(payload) => Ok(payload.unwrap_or(EventPayload::Null)),
            Err(_) => {
                self.off(event, id);
                Err(EventError::Timeout(event.to_string()))
            }
        }
    }

    fn subscribe(&self, event: &str, handler: EventHandler, once: bool) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.channels
            .write()
            .entry(event.to_string())
            .or_default()
            .push(Subscriber { id, once, handler });
        id
    }

    fn oneshot_gate(
        &self,
        event: &str,
    ) -> (SubscriptionId, tokio::sync::oneshot::Receiver<EventPayload>) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Mutex::new(Some(tx));

        let id = self.once(
            event,
            Arc::new(move |payload: &EventPayload| {
                if let Some(tx) = tx.lock().take() {
                    let _ = tx.send(payload.clone());
                }
                Ok(())
            }),
        );

        (id, rx)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBusAccess for EventBus {
    fn emit(&self, event: &str, payload: EventPayload) {
        EventBus::emit(self, event, payload);
    }

    fn on(&self, event: &str, handler: EventHandler) -> SubscriptionId {
        EventBus::on(self, event, handler)
    }

    fn once(&self, event: &str, handler: EventHandler) -> SubscriptionId {
        EventBus::once(self, event, handler)
    }

    fn off(&self, event: &str, id: SubscriptionId) {
        EventBus::off(self, event, id);
    }

    async fn wait_for(&self, event: &str) -> EventPayload {
        EventBus::wait_for(self, event).await
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
