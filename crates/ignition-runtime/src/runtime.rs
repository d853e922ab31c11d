//! Bootstrap orchestrator.
//!
//! [`Runtime`] owns the shared infrastructure (bus, contexts, registries,
//! state, queue) and drives one bootstrap: splash, cores, extensions,
//! deferred tasks, app hook, final render. A structural failure anywhere
//! flips the state machine to its terminal phase and renders the crash
//! view instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, error, info, warn};

use ignition_config::IgnitionConfig;
use ignition_core::{
    handler, Change, CoreRegistry, CoresPublicContext, EventBus, ExtensionRegistry, Observable,
    PublicContext,
};
use ignition_protocols::app::AppDelegate;
use ignition_protocols::context::ContextValue;
use ignition_protocols::core::Core;
use ignition_protocols::error::{ContextError, RuntimeError};
use ignition_protocols::extension::Extension;
use ignition_protocols::render::{CrashReport, Renderer};
use ignition_protocols::source::ModuleSource;
use ignition_protocols::task::InitializerTask;

use crate::core_manager::CoreManager;
use crate::events;
use crate::extension_manager::ExtensionManager;
use crate::initializer::InitializerQueue;
use crate::state::{LoadState, RuntimeState, RuntimeStates};

/// Host-tunable bootstrap parameters.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Render the debug view and refresh it on every state change.
    pub debug: bool,

    /// Upper bound for readiness gates. `None` waits indefinitely.
    pub await_event_timeout: Option<Duration>,

    /// Mount point identifier forwarded to the renderer.
    pub render_mount: String,

    /// Per-module configuration, keyed by namespace or ref name.
    pub module_config: HashMap<String, serde_json::Value>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            debug: false,
            await_event_timeout: None,
            render_mount: "root".to_string(),
            module_config: HashMap::new(),
        }
    }
}

impl RuntimeOptions {
    /// Derive options from a loaded configuration file.
    pub fn from_config(config: &IgnitionConfig) -> Self {
        Self {
            debug: config.runtime.debug,
            await_event_timeout: config
                .runtime
                .await_event_timeout_ms
                .map(Duration::from_millis),
            render_mount: config.runtime.render_mount.clone(),
            module_config: config.modules.clone(),
        }
    }
}

/// The bootstrap engine.
pub struct Runtime {
    app: Arc<dyn AppDelegate>,
    renderer: Arc<dyn Renderer>,
    options: RuntimeOptions,
    core_source: Arc<dyn ModuleSource<Module = dyn Core>>,
    extension_source: Arc<dyn ModuleSource<Module = dyn Extension>>,

    event_bus: Arc<EventBus>,
    public_context: Arc<PublicContext>,
    cores_public: Arc<CoresPublicContext>,
    core_registry: Arc<CoreRegistry>,
    extension_registry: Arc<ExtensionRegistry>,
    states: Arc<RuntimeStates>,
    queue: Arc<InitializerQueue>,
    debug_enabled: Arc<Observable<bool>>,
}

impl Runtime {
    pub fn new(
        app: Arc<dyn AppDelegate>,
        renderer: Arc<dyn Renderer>,
        core_source: Arc<dyn ModuleSource<Module = dyn Core>>,
        extension_source: Arc<dyn ModuleSource<Module = dyn Extension>>,
        options: RuntimeOptions,
    ) -> Arc<Self> {
        let runtime = Arc::new(Self {
            app,
            renderer,
            debug_enabled: Arc::new(Observable::new(options.debug)),
            options,
            core_source,
            extension_source,
            event_bus: Arc::new(EventBus::new()),
            public_context: Arc::new(PublicContext::new()),
            cores_public: Arc::new(CoresPublicContext::new()),
            core_registry: Arc::new(CoreRegistry::new()),
            extension_registry: Arc::new(ExtensionRegistry::new()),
            states: Arc::new(RuntimeStates::new()),
            queue: Arc::new(InitializerQueue::new()),
        });

        runtime.register_builtins();
        runtime.wire();
        runtime
    }

    /// Built-in locked entries every host can rely on.
    fn register_builtins(&self) {
        self.public_context.register(
            "ignition_version",
            ContextValue::data(env!("CARGO_PKG_VERSION")),
            true,
        );

        let bus = self.event_bus.clone();
        self.public_context.register(
            "emit_event",
            ContextValue::method(move |args| {
                let event = args
                    .get("event")
                    .and_then(|e| e.as_str())
                    .ok_or_else(|| {
                        ContextError::InvalidArguments("missing \"event\" field".to_string())
                    })?
                    .to_string();
                let payload = args.get("payload").cloned().unwrap_or(serde_json::Value::Null);
                bus.emit(&event, payload);
                Ok(serde_json::Value::Null)
            }),
            true,
        );

        let states = self.states.clone();
        self.public_context.register(
            "runtime_state",
            ContextValue::method(move |_args| {
                serde_json::to_value(states.snapshot())
                    .map_err(|e| ContextError::Custom(e.to_string()))
            }),
            true,
        );

        let debug_flag = self.debug_enabled.clone();
        self.public_context.register(
            "toggle_debug",
            ContextValue::method(move |args| {
                let current = debug_flag.snapshot();
                let next = args.as_bool().unwrap_or(!current);
                debug_flag.mutate(Change::update("debug", json!(next)), |d| *d = next);
                Ok(json!(next))
            }),
            true,
        );
    }

    /// Subscribe the internal lifecycle handlers.
    fn wire(self: &Arc<Self>) {
        let states = self.states.clone();
        self.event_bus.on(
            events::INITIALIZE_START,
            handler(move |_| {
                states.set_load_state(LoadState::Initializing);
                states.mark_started();
            }),
        );

        let states = self.states.clone();
        self.event_bus.on(
            events::INITIALIZE_FINISH,
            handler(move |_| {
                states.mark_finished();
                states.set_load_state(LoadState::Initialized);
            }),
        );

        let states = self.states.clone();
        self.event_bus.on(
            events::INITIALIZE_CRASH,
            handler(move |_| states.set_load_state(LoadState::Crashed)),
        );

        // post-bootstrap crash requests arrive over the bus
        let weak = Arc::downgrade(self);
        self.event_bus.on(
            events::RUNTIME_CRASH,
            handler(move |payload| {
                let Some(runtime) = weak.upgrade() else {
                    return;
                };
                let report = serde_json::from_value(payload.clone()).unwrap_or_else(|_| {
                    CrashReport::new("Runtime crashed", payload.to_string())
                });
                spawn_if_running(async move { runtime.crash(report).await });
            }),
        );

        if let Some(event) = self.app.splash_await_event() {
            let weak = Arc::downgrade(self);
            self.event_bus.once(
                event,
                handler(move |_| {
                    let Some(runtime) = weak.upgrade() else {
                        return;
                    };
                    spawn_if_running(async move {
                        if let Err(e) = runtime.renderer.detach_splash().await {
                            warn!(error = %e, "splash detachment failed");
                        }
                    });
                }),
            );
        }

        // every committed state change refreshes the debug view
        let weak = Arc::downgrade(self);
        self.states.observe(move |_change| {
            if let Some(runtime) = weak.upgrade() {
                runtime.refresh_debug();
            }
        });

        let weak = Arc::downgrade(self);
        self.debug_enabled.observe(move |_change| {
            if let Some(runtime) = weak.upgrade() {
                runtime.refresh_debug();
            }
        });
    }

    /// Run one full bootstrap. On structural failure the crash event is
    /// emitted, the crash view is rendered and the error is returned.
    pub async fn run(self: &Arc<Self>) -> Result<(), RuntimeError> {
        if let Err(e) = self
            .renderer
            .render_splash(self.state_json())
            .await
        {
            warn!(error = %e, "splash render failed");
        }

        match self.initialize().await {
            Ok(()) => Ok(()),
            Err(error) => {
                error!(error = %error, "bootstrap failed");
                self.event_bus.emit(
                    events::INITIALIZE_CRASH,
                    json!({ "error": error.to_string() }),
                );
                self.crash(CrashReport::new(
                    "Runtime crashed during initialization",
                    error.to_string(),
                ))
                .await;
                Err(error)
            }
        }
    }

    async fn initialize(&self) -> Result<(), RuntimeError> {
        info!(app = %self.app.name(), mount = %self.options.render_mount, "bootstrap starting");
        self.event_bus
            .emit(events::INITIALIZE_START, serde_json::Value::Null);

        let core_manager = CoreManager::new(
            self.event_bus.clone(),
            self.public_context.clone(),
            self.cores_public.clone(),
            self.core_registry.clone(),
            self.queue.clone(),
            self.states.clone(),
            self.options.module_config.clone(),
            self.options.await_event_timeout,
        );
        core_manager
            .initialize_cores(self.core_source.as_ref())
            .await?;

        let extension_manager = Arc::new(ExtensionManager::new(
            self.event_bus.clone(),
            self.public_context.clone(),
            self.extension_registry.clone(),
            self.states.clone(),
            self.options.module_config.clone(),
            self.options.await_event_timeout,
        ));
        extension_manager
            .attach_all(self.extension_source.as_ref())
            .await;

        // the app contributes its deferred tasks last, after cores and
        // extensions have queued theirs
        let app_tasks = self.app.initializer_tasks();
        if !app_tasks.is_empty() {
            self.queue.append_all(app_tasks);
            self.states.set_task_count(self.queue.len());
        }

        self.queue.drain().await;
        self.states.set_task_count(0);

        self.app.initialize().await?;

        for (event, handler) in self.app.public_events() {
            self.event_bus.on(&event, handler);
        }
        self.public_context
            .register_many(self.app.public_methods(), true);

        self.event_bus
            .emit(events::INITIALIZE_FINISH, serde_json::Value::Null);

        self.renderer.render_app(self.state_json()).await?;

        if self.app.splash_await_event().is_none() {
            if let Err(e) = self.renderer.detach_splash().await {
                warn!(error = %e, "splash detachment failed");
            }
        }

        info!(
            cores = self.core_registry.len(),
            extensions = self.extension_registry.len(),
            rejected = self.states.snapshot().rejected_extensions.len(),
            "bootstrap finished"
        );
        Ok(())
    }

    /// Enter the terminal crashed phase and render the crash view.
    pub async fn crash(&self, report: CrashReport) {
        self.states.set_load_state(LoadState::Crashed);

        if let Err(e) = self.renderer.detach_splash().await {
            warn!(error = %e, "splash detachment failed during crash");
        }
        if let Err(e) = self.renderer.render_crash(report).await {
            error!(error = %e, "crash view render failed");
        }
    }

    fn refresh_debug(self: &Arc<Self>) {
        if !self.debug_enabled.snapshot() {
            return;
        }

        let runtime = self.clone();
        let state = self.state_json();
        spawn_if_running(async move {
            if let Err(e) = runtime.renderer.render_debug(state).await {
                debug!(error = %e, "debug view render failed");
            }
        });
    }

    /// Queue a deferred task for the next drain. Open to any module
    /// holding a runtime handle; tasks queued after the bootstrap drain
    /// stay pending until a host-driven drain.
    pub fn append_initializer(&self, task: InitializerTask) {
        self.queue.append(task);
        self.states.set_task_count(self.queue.len());
    }

    /// Flip the debug view. `None` toggles the current value.
    pub fn toggle_debug(&self, enabled: Option<bool>) -> bool {
        let next = enabled.unwrap_or(!self.debug_enabled.snapshot());
        self.debug_enabled
            .mutate(Change::update("debug", json!(next)), |d| *d = next);
        next
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled.snapshot()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn public_context(&self) -> &Arc<PublicContext> {
        &self.public_context
    }

    pub fn cores_context(&self) -> &Arc<CoresPublicContext> {
        &self.cores_public
    }

    pub fn cores(&self) -> &Arc<CoreRegistry> {
        &self.core_registry
    }

    pub fn extensions(&self) -> &Arc<ExtensionRegistry> {
        &self.extension_registry
    }

    pub fn states(&self) -> &Arc<RuntimeStates> {
        &self.states
    }

    /// Snapshot of the bootstrap state record.
    pub fn state(&self) -> RuntimeState {
        self.states.snapshot()
    }

    fn state_json(&self) -> serde_json::Value {
        serde_json::to_value(self.states.snapshot()).unwrap_or(serde_json::Value::Null)
    }
}

/// Spawn a task when called from inside a runtime; drop the work (with a
/// log line) otherwise. Lifecycle handlers fire synchronously and must not
/// assume an executor.
fn spawn_if_running<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(future);
        }
        Err(_) => warn!("async lifecycle reaction dropped outside a runtime"),
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
