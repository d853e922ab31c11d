//! Core loading and initialization.
//!
//! Cores are structural: candidates are loaded concurrently, ordered by
//! declared dependencies, then initialized strictly sequentially. Any
//! initialization failure aborts the whole pass and, with it, the
//! bootstrap.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::json;
use tracing::{debug, info, warn};

use ignition_core::{CoreRegistry, CoresPublicContext, EventBus, FrozenNamespace, PublicContext};
use ignition_protocols::core::{Core, CoreContext};
use ignition_protocols::error::CoreError;
use ignition_protocols::source::ModuleSource;

use crate::events;
use crate::initializer::InitializerQueue;
use crate::state::RuntimeStates;

/// Drives the core stage of the bootstrap.
pub struct CoreManager {
    event_bus: Arc<EventBus>,
    public_context: Arc<PublicContext>,
    cores_public: Arc<CoresPublicContext>,
    registry: Arc<CoreRegistry>,
    queue: Arc<InitializerQueue>,
    states: Arc<RuntimeStates>,
    module_config: HashMap<String, serde_json::Value>,
    await_event_timeout: Option<Duration>,
}

impl CoreManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_bus: Arc<EventBus>,
        public_context: Arc<PublicContext>,
        cores_public: Arc<CoresPublicContext>,
        registry: Arc<CoreRegistry>,
        queue: Arc<InitializerQueue>,
        states: Arc<RuntimeStates>,
        module_config: HashMap<String, serde_json::Value>,
        await_event_timeout: Option<Duration>,
    ) -> Self {
        Self {
            event_bus,
            public_context,
            cores_public,
            registry,
            queue,
            states,
            module_config,
            await_event_timeout,
        }
    }

    /// Run the whole core stage. On failure the pass-level failed event is
    /// emitted before the error propagates.
    pub async fn initialize_cores(
        &self,
        source: &dyn ModuleSource<Module = dyn Core>,
    ) -> Result<(), CoreError> {
        match self.run_stage(source).await {
            Ok(()) => Ok(()),
            Err(error) => {
                self.event_bus.emit(
                    events::CORES_FAILED,
                    json!({ "error": error.to_string() }),
                );
                Err(error)
            }
        }
    }

    async fn run_stage(&self, source: &dyn ModuleSource<Module = dyn Core>) -> Result<(), CoreError> {
        let discovered = source.discover().await;
        if discovered.is_empty() {
            warn!("no cores discovered, skipping core stage");
            return Ok(());
        }

        // construct all candidates concurrently; a failed load is skipped
        let loads = join_all(discovered.iter().map(|module| {
            let loader = module.loader.clone();
            async move { (module.id.clone(), loader().await) }
        }))
        .await;

        let mut cores: Vec<Box<dyn Core>> = Vec::with_capacity(loads.len());
        for (id, result) in loads {
            match result {
                Ok(core) => cores.push(core),
                Err(e) => warn!(module = %id, error = %e, "core module failed to load, skipping"),
            }
        }

        if cores.is_empty() {
            warn!("no cores survived loading, skipping core stage");
            return Ok(());
        }

        self.event_bus
            .emit(events::CORES_START, serde_json::Value::Null);

        let ordered = sort_by_dependencies(cores)?;
        for core in ordered {
            self.initialize_core(core).await?;
        }

        self.event_bus
            .emit(events::CORES_FINISH, serde_json::Value::Null);

        Ok(())
    }

    async fn initialize_core(&self, mut core: Box<dyn Core>) -> Result<(), CoreError> {
        let manifest = core.manifest().clone();
        let namespace = manifest.namespace.clone();

        debug!(core = %namespace, "initializing core");
        self.event_bus
            .emit(&events::core_start(&namespace), serde_json::Value::Null);

        let ctx = CoreContext::new(
            self.module_config
                .get(&namespace)
                .cloned()
                .unwrap_or(serde_json::Value::Null),
            self.event_bus.clone(),
            self.public_context.clone(),
        );

        core.initialize(ctx)
            .await
            .map_err(|e| CoreError::InitializationFailed {
                core: namespace.clone(),
                reason: e.to_string(),
            })?;

        // expose the read-only surface under cores.<namespace>
        let surface = core.public_surface();
        if !surface.is_empty() {
            self.cores_public
                .expose(FrozenNamespace::new(&namespace, surface))
                .map_err(|e| CoreError::Custom(e.to_string()))?;
        }

        for (event, handler) in core.on_events() {
            self.event_bus.on(&event, handler);
        }

        let to_app = core.register_to_app();
        if !to_app.is_empty() {
            self.public_context.register_many(to_app, false);
        }

        if let Some(task) = core.deferred_initializer() {
            self.queue.append(task);
            self.states.set_task_count(self.queue.len());
        }

        // readiness gates declared in the manifest block this core, and
        // with it every core behind it
        for event in &manifest.await_events {
            match self.await_event_timeout {
                Some(bound) => {
                    self.event_bus
                        .wait_for_timeout(event, bound)
                        .await
                        .map_err(|_| CoreError::AwaitEventTimeout {
                            core: namespace.clone(),
                            event: event.clone(),
                        })?;
                }
                None => {
                    self.event_bus.wait_for(event).await;
                }
            }
        }

        self.registry.register(Arc::from(core))?;
        self.states.push_loaded_core(&namespace);
        self.event_bus
            .emit(&events::core_finish(&namespace), serde_json::Value::Null);

        info!(core = %namespace, "core initialized");
        Ok(())
    }
}

/// Order cores so every core comes after all of its dependencies.
///
/// Kahn's algorithm over the declared dependency edges. An unknown
/// dependency or a duplicate namespace fails immediately; a cycle reports
/// every namespace still caught in it.
fn sort_by_dependencies(mut cores: Vec<Box<dyn Core>>) -> Result<Vec<Box<dyn Core>>, CoreError> {
    let names: Vec<String> = cores
        .iter()
        .map(|c| c.manifest().namespace.clone())
        .collect();

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        if index.insert(name.as_str(), i).is_some() {
            return Err(CoreError::AlreadyRegistered(name.clone()));
        }
    }

    let mut indegree = vec![0usize; cores.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); cores.len()];
    for (i, core) in cores.iter().enumerate() {
        for dep in &core.manifest().dependencies {
            let Some(&j) = index.get(dep.as_str()) else {
                return Err(CoreError::DependencyMissing {
                    core: names[i].clone(),
                    dependency: dep.clone(),
                });
            };
            indegree[i] += 1;
            dependents[j].push(i);
        }
    }

    // seeding in discovery order keeps independent cores in their
    // discovered relative order
    let mut ready: VecDeque<usize> = (0..cores.len()).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(cores.len());
    while let Some(i) = ready.pop_front() {
        order.push(i);
        for &k in &dependents[i] {
            indegree[k] -= 1;
            if indegree[k] == 0 {
                ready.push_back(k);
            }
        }
    }

    if order.len() != cores.len() {
        let cycle: Vec<String> = (0..cores.len())
            .filter(|&i| indegree[i] > 0)
            .map(|i| names[i].clone())
            .collect();
        return Err(CoreError::DependencyCycle(cycle));
    }

    let mut slots: Vec<Option<Box<dyn Core>>> = cores.drain(..).map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());
    for i in order {
        if let Some(core) = slots[i].take() {
            ordered.push(core);
        }
    }
    Ok(ordered)
}

#[cfg(test)]
#[path = "core_manager_tests.rs"]
mod tests;
