//! Extension attachment.
//!
//! Extensions attach concurrently and degrade gracefully: any failure
//! rejects the one extension, records it in the rejected roster, announces
//! the rejection on the bus and leaves the rest of the bootstrap alone.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, error, info, warn};

use ignition_core::{EventBus, ExtensionRegistry, PublicContext};
use ignition_protocols::error::ExtensionError;
use ignition_protocols::extension::{Extension, ExtensionContext};
use ignition_protocols::source::{DiscoveredModule, ModuleSource};

use crate::events;
use crate::state::RuntimeStates;

struct Rejection {
    /// Known once the module produced a manifest; the source id otherwise.
    name: Option<String>,
    reason: ExtensionError,
}

impl Rejection {
    fn anonymous(reason: ExtensionError) -> Self {
        Self { name: None, reason }
    }

    fn named(name: impl Into<String>, reason: ExtensionError) -> Self {
        Self {
            name: Some(name.into()),
            reason,
        }
    }
}

/// Drives the extension stage of the bootstrap.
pub struct ExtensionManager {
    event_bus: Arc<EventBus>,
    public_context: Arc<PublicContext>,
    registry: Arc<ExtensionRegistry>,
    states: Arc<RuntimeStates>,
    module_config: HashMap<String, serde_json::Value>,
    await_event_timeout: Option<Duration>,
}

impl ExtensionManager {
    pub fn new(
        event_bus: Arc<EventBus>,
        public_context: Arc<PublicContext>,
        registry: Arc<ExtensionRegistry>,
        states: Arc<RuntimeStates>,
        module_config: HashMap<String, serde_json::Value>,
        await_event_timeout: Option<Duration>,
    ) -> Self {
        Self {
            event_bus,
            public_context,
            registry,
            states,
            module_config,
            await_event_timeout,
        }
    }

    /// Attach every discovered extension concurrently.
    ///
    /// Attachment never aborts the stage. Each extension runs in its own
    /// task so even a panicking module only loses itself; a panic is
    /// reported through the stage-level failed event.
    pub async fn attach_all(self: &Arc<Self>, source: &dyn ModuleSource<Module = dyn Extension>) {
        let discovered = source.discover().await;
        if discovered.is_empty() {
            debug!("no extensions discovered, skipping extension stage");
            return;
        }

        let handles: Vec<_> = discovered
            .into_iter()
            .map(|module| {
                let manager = self.clone();
                tokio::spawn(async move { manager.attach(module).await })
            })
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "extension attachment task panicked");
                self.event_bus.emit(
                    events::EXTENSIONS_FAILED,
                    json!({ "error": e.to_string() }),
                );
            }
        }
    }

    /// Attach one extension. Failures become rejections, never errors.
    pub async fn attach(&self, module: DiscoveredModule<dyn Extension>) {
        let source_id = module.id.clone();

        match self.try_attach(module).await {
            Ok(name) => {
                info!(extension = %name, "extension attached");
                self.states.push_attached_extension(&name);
                self.event_bus
                    .emit(events::EXTENSION_ATTACHED, json!({ "name": name }));
            }
            Err(rejection) => {
                let name = rejection.name.unwrap_or(source_id);
                let reason = rejection.reason.to_string();
                warn!(extension = %name, %reason, "extension rejected");

                self.states.push_rejected_extension(&name);

                let payload = json!({ "name": name, "reason": reason });
                self.event_bus
                    .emit(events::EXTENSION_REJECTED, payload.clone());
                self.event_bus
                    .emit(&events::extension_rejected(&name), payload);
            }
        }
    }

    async fn try_attach(
        &self,
        module: DiscoveredModule<dyn Extension>,
    ) -> Result<String, Rejection> {
        let mut extension = (module.loader)().await.map_err(|e| {
            Rejection::anonymous(ExtensionError::NotConstructible(format!(
                "{}: {e}",
                module.id
            )))
        })?;

        let manifest = extension.manifest().clone();
        let name = manifest.ref_name.clone();

        if name.is_empty() {
            return Err(Rejection::anonymous(ExtensionError::NotValidInstance(
                format!("{}: empty ref name", module.id),
            )));
        }

        if self.registry.contains(&name) {
            return Err(Rejection::named(
                &name,
                ExtensionError::AlreadyAttached(name.clone()),
            ));
        }

        // readiness: declared dependencies must have finished attaching
        for dependency in &manifest.depends {
            if !self
                .states
                .wait_attached(dependency, self.await_event_timeout)
                .await
            {
                return Err(Rejection::named(
                    &name,
                    ExtensionError::DependencyTimeout {
                        extension: name.clone(),
                        dependency: dependency.clone(),
                    },
                ));
            }
        }

        let ctx = ExtensionContext::new(
            self.module_config
                .get(&name)
                .cloned()
                .unwrap_or(serde_json::Value::Null),
            self.event_bus.clone(),
            self.public_context.clone(),
        );

        extension.initialize(ctx).await.map_err(|e| {
            Rejection::named(
                &name,
                ExtensionError::InitializationFailed(format!("{name}: {e}")),
            )
        })?;

        // deferred setup runs one task at a time, in declaration order
        for task in extension.initializers() {
            task().await.map_err(|e| {
                Rejection::named(
                    &name,
                    ExtensionError::InitializationFailed(format!("{name}: {e}")),
                )
            })?;
        }

        // event gates block this extension only
        for gate in extension.await_events() {
            let payload = match self.await_event_timeout {
                Some(bound) => self
                    .event_bus
                    .wait_for_timeout(&gate.event, bound)
                    .await
                    .map_err(|_| {
                        Rejection::named(
                            &name,
                            ExtensionError::AwaitEventTimeout {
                                extension: name.clone(),
                                event: gate.event.clone(),
                            },
                        )
                    })?,
                None => self.event_bus.wait_for(&gate.event).await,
            };

            if let Some(handler) = &gate.handler {
                if let Err(e) = handler(&payload) {
                    error!(extension = %name, event = %gate.event, error = %e,
                        "await event handler failed");
                }
            }
        }

        // the registry holds the authoritative duplicate check; capabilities
        // merge only after it accepts the extension
        let extension: Arc<dyn Extension> = Arc::from(extension);
        self.registry
            .register(extension.clone())
            .map_err(|e| Rejection::named(&name, e))?;

        self.public_context
            .register_many(extension.public_methods(), false);

        Ok(name)
    }
}

#[cfg(test)]
#[path = "extension_manager_tests.rs"]
mod tests;
