use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use ignition_protocols::app::AppDelegate;
use ignition_protocols::core::{CoreContext, CoreManifest};
use ignition_protocols::error::{CoreError, ExtensionError, RenderError};
use ignition_protocols::event::EventHandler;
use ignition_protocols::extension::{ExtensionContext, ExtensionManifest};
use ignition_protocols::render::{CrashReport, Renderer};
use ignition_protocols::task::{initializer_task, InitializerTask};

use crate::source::{module_loader, StaticModuleSource};

use super::*;

type CallLog = Arc<Mutex<Vec<String>>>;

struct RecordingRenderer {
    calls: CallLog,
    crash_reports: Arc<Mutex<Vec<CrashReport>>>,
}

impl RecordingRenderer {
    fn new() -> (Arc<Self>, CallLog) {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        (
            Arc::new(Self {
                calls: calls.clone(),
                crash_reports: Arc::new(Mutex::new(Vec::new())),
            }),
            calls,
        )
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn render_app(&self, _props: serde_json::Value) -> Result<(), RenderError> {
        self.calls.lock().push("app".to_string());
        Ok(())
    }

    async fn render_splash(&self, _state: serde_json::Value) -> Result<(), RenderError> {
        self.calls.lock().push("splash".to_string());
        Ok(())
    }

    async fn render_crash(&self, report: CrashReport) -> Result<(), RenderError> {
        self.calls.lock().push(format!("crash:{}", report.message));
        self.crash_reports.lock().push(report);
        Ok(())
    }

    async fn detach_splash(&self) -> Result<(), RenderError> {
        self.calls.lock().push("detach".to_string());
        Ok(())
    }

    async fn render_debug(&self, _state: serde_json::Value) -> Result<(), RenderError> {
        self.calls.lock().push("debug".to_string());
        Ok(())
    }
}

struct TestApp {
    splash_event: Option<String>,
    fail: bool,
    tasks: Vec<InitializerTask>,
}

impl TestApp {
    fn plain() -> Arc<Self> {
        Arc::new(Self {
            splash_event: None,
            fail: false,
            tasks: Vec::new(),
        })
    }

    fn gated(event: &str) -> Arc<Self> {
        Arc::new(Self {
            splash_event: Some(event.to_string()),
            fail: false,
            tasks: Vec::new(),
        })
    }
}

#[async_trait]
impl AppDelegate for TestApp {
    fn name(&self) -> &str {
        "test-app"
    }

    fn splash_await_event(&self) -> Option<&str> {
        self.splash_event.as_deref()
    }

    async fn initialize(&self) -> Result<(), RuntimeError> {
        if self.fail {
            return Err(RuntimeError::AppInitializeFailed("app boom".to_string()));
        }
        Ok(())
    }

    fn initializer_tasks(&self) -> Vec<InitializerTask> {
        self.tasks.clone()
    }

    fn public_methods(&self) -> HashMap<String, ContextValue> {
        let mut methods = HashMap::new();
        methods.insert("app_capability".to_string(), ContextValue::data("app"));
        methods
    }
}

struct SimpleCore {
    manifest: CoreManifest,
    fail: bool,
    deferred: Option<InitializerTask>,
}

#[async_trait]
impl Core for SimpleCore {
    fn manifest(&self) -> &CoreManifest {
        &self.manifest
    }

    async fn initialize(&mut self, _ctx: CoreContext) -> Result<(), CoreError> {
        if self.fail {
            return Err(CoreError::Custom("core boom".to_string()));
        }
        Ok(())
    }

    fn deferred_initializer(&self) -> Option<InitializerTask> {
        self.deferred.clone()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

struct SimpleExtension {
    manifest: ExtensionManifest,
    fail: bool,
}

#[async_trait]
impl Extension for SimpleExtension {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    async fn initialize(&mut self, _ctx: ExtensionContext) -> Result<(), ExtensionError> {
        if self.fail {
            return Err(ExtensionError::Custom("ext boom".to_string()));
        }
        Ok(())
    }

    fn public_methods(&self) -> HashMap<String, ContextValue> {
        let mut methods = HashMap::new();
        methods.insert(
            format!("{}_capability", self.manifest.ref_name),
            ContextValue::data(true),
        );
        methods
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn core_source(cores: Vec<SimpleCore>) -> Arc<StaticModuleSource<dyn Core>> {
    let source = StaticModuleSource::new();
    for core in cores {
        let id = core.manifest.namespace.clone();
        let slot = Arc::new(Mutex::new(Some(core)));
        source.push(
            id,
            module_loader(move || {
                slot.lock()
                    .take()
                    .map(|c| Box::new(c) as Box<dyn Core>)
                    .ok_or_else(|| {
                        ignition_protocols::error::LoadError::LoadFailed(
                            "already consumed".to_string(),
                        )
                    })
            }),
        );
    }
    Arc::new(source)
}

fn extension_source(extensions: Vec<SimpleExtension>) -> Arc<StaticModuleSource<dyn Extension>> {
    let source = StaticModuleSource::new();
    for extension in extensions {
        let id = extension.manifest.ref_name.clone();
        let slot = Arc::new(Mutex::new(Some(extension)));
        source.push(
            id,
            module_loader(move || {
                slot.lock()
                    .take()
                    .map(|e| Box::new(e) as Box<dyn Extension>)
                    .ok_or_else(|| {
                        ignition_protocols::error::LoadError::LoadFailed(
                            "already consumed".to_string(),
                        )
                    })
            }),
        );
    }
    Arc::new(source)
}

fn simple_core(namespace: &str) -> SimpleCore {
    SimpleCore {
        manifest: CoreManifest::new(namespace),
        fail: false,
        deferred: None,
    }
}

fn simple_extension(name: &str) -> SimpleExtension {
    SimpleExtension {
        manifest: ExtensionManifest::new(name),
        fail: false,
    }
}

fn event_log(runtime: &Arc<Runtime>, events: &[&str]) -> CallLog {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    for event in events {
        let log2 = log.clone();
        let name = event.to_string();
        runtime
            .event_bus()
            .on(event, handler(move |_| log2.lock().push(name.clone())));
    }
    log
}

#[tokio::test]
async fn test_full_bootstrap() {
    let (renderer, renders) = RecordingRenderer::new();
    let drained = Arc::new(Mutex::new(false));

    let drained2 = drained.clone();
    let mut core = simple_core("tasks");
    core.deferred = Some(initializer_task(move || {
        let drained = drained2.clone();
        async move {
            *drained.lock() = true;
            Ok(())
        }
    }));

    let runtime = Runtime::new(
        TestApp::plain(),
        renderer,
        core_source(vec![core]),
        extension_source(vec![simple_extension("theme")]),
        RuntimeOptions::default(),
    );

    let lifecycle = event_log(
        &runtime,
        &[
            events::INITIALIZE_START,
            events::CORES_START,
            events::CORES_FINISH,
            events::EXTENSION_ATTACHED,
            events::INITIALIZE_FINISH,
        ],
    );

    runtime.run().await.unwrap();

    let state = runtime.state();
    assert_eq!(state.load_state, LoadState::Initialized);
    assert_eq!(state.loaded_cores, vec!["tasks"]);
    assert_eq!(state.attached_extensions, vec!["theme"]);
    assert!(state.rejected_extensions.is_empty());
    assert!(state.initialization_took_ms.is_some());

    assert!(*drained.lock());
    assert!(runtime.public_context().contains("theme_capability"));
    assert!(runtime.public_context().contains("app_capability"));
    assert!(runtime.public_context().is_locked("app_capability"));

    assert_eq!(
        *lifecycle.lock(),
        vec![
            events::INITIALIZE_START,
            events::CORES_START,
            events::CORES_FINISH,
            events::EXTENSION_ATTACHED,
            events::INITIALIZE_FINISH,
        ]
    );

    // splash first, app render after bootstrap, then detachment
    assert_eq!(*renders.lock(), vec!["splash", "app", "detach"]);
}

#[tokio::test]
async fn test_app_and_host_contributed_tasks_join_the_drain() {
    let (renderer, _renders) = RecordingRenderer::new();
    let ran: CallLog = Arc::new(Mutex::new(Vec::new()));

    let ran2 = ran.clone();
    let app = Arc::new(TestApp {
        splash_event: None,
        fail: false,
        tasks: vec![initializer_task(move || {
            let ran = ran2.clone();
            async move {
                ran.lock().push("app".to_string());
                Ok(())
            }
        })],
    });

    let runtime = Runtime::new(
        app,
        renderer,
        core_source(vec![simple_core("tasks")]),
        extension_source(vec![]),
        RuntimeOptions::default(),
    );

    // any module holding the runtime handle can queue a task before the drain
    let ran2 = ran.clone();
    runtime.append_initializer(initializer_task(move || {
        let ran = ran2.clone();
        async move {
            ran.lock().push("host".to_string());
            Ok(())
        }
    }));
    assert_eq!(runtime.state().initializer_task_count, 1);

    runtime.run().await.unwrap();

    // host task was queued first; the app's tasks merge in just before the drain
    assert_eq!(*ran.lock(), vec!["host", "app"]);
    assert_eq!(runtime.state().initializer_task_count, 0);
}

#[tokio::test]
async fn test_rejected_extension_does_not_stop_the_bootstrap() {
    let (renderer, _renders) = RecordingRenderer::new();

    let mut broken = simple_extension("broken");
    broken.fail = true;

    let runtime = Runtime::new(
        TestApp::plain(),
        renderer,
        core_source(vec![simple_core("tasks")]),
        extension_source(vec![broken, simple_extension("theme")]),
        RuntimeOptions::default(),
    );

    runtime.run().await.unwrap();

    let state = runtime.state();
    assert_eq!(state.load_state, LoadState::Initialized);
    assert_eq!(state.attached_extensions, vec!["theme"]);
    assert_eq!(state.rejected_extensions, vec!["broken"]);
}

#[tokio::test]
async fn test_core_failure_crashes_the_bootstrap() {
    let (renderer, renders) = RecordingRenderer::new();
    let crash_reports = renderer.crash_reports.clone();

    let mut broken = simple_core("broken");
    broken.fail = true;

    let runtime = Runtime::new(
        TestApp::plain(),
        renderer,
        core_source(vec![broken]),
        extension_source(vec![simple_extension("theme")]),
        RuntimeOptions::default(),
    );

    let lifecycle = event_log(
        &runtime,
        &[events::CORES_FAILED, events::INITIALIZE_CRASH],
    );

    let err = runtime.run().await.unwrap_err();
    assert!(matches!(err, RuntimeError::Core(_)));

    let state = runtime.state();
    assert_eq!(state.load_state, LoadState::Crashed);
    assert!(state.attached_extensions.is_empty());

    assert_eq!(
        *lifecycle.lock(),
        vec![events::CORES_FAILED, events::INITIALIZE_CRASH]
    );
    assert_eq!(
        *renders.lock(),
        vec![
            "splash".to_string(),
            "detach".to_string(),
            "crash:Runtime crashed during initialization".to_string(),
        ]
    );

    // the crash view carries the failing core's error text
    let reports = crash_reports.lock();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].details.contains("broken"));
    assert!(reports[0].details.contains("core boom"));
    drop(reports);

    // crashed is terminal
    runtime.states().set_load_state(LoadState::Initialized);
    assert_eq!(runtime.state().load_state, LoadState::Crashed);
}

#[tokio::test]
async fn test_app_failure_crashes_the_bootstrap() {
    let (renderer, _renders) = RecordingRenderer::new();

    let app = Arc::new(TestApp {
        splash_event: None,
        fail: true,
        tasks: Vec::new(),
    });

    let runtime = Runtime::new(
        app,
        renderer,
        core_source(vec![simple_core("tasks")]),
        extension_source(vec![]),
        RuntimeOptions::default(),
    );

    let err = runtime.run().await.unwrap_err();
    assert!(matches!(err, RuntimeError::AppInitializeFailed(_)));
    assert_eq!(runtime.state().load_state, LoadState::Crashed);
}

#[tokio::test]
async fn test_splash_detachment_deferred_until_app_event() {
    let (renderer, renders) = RecordingRenderer::new();

    let runtime = Runtime::new(
        TestApp::gated("session.ready"),
        renderer,
        core_source(vec![simple_core("tasks")]),
        extension_source(vec![]),
        RuntimeOptions::default(),
    );

    runtime.run().await.unwrap();

    // initialized, yet the splash stays until the gating event fires
    assert_eq!(runtime.state().load_state, LoadState::Initialized);
    assert_eq!(*renders.lock(), vec!["splash", "app"]);

    runtime
        .event_bus()
        .emit("session.ready", serde_json::Value::Null);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(*renders.lock(), vec!["splash", "app", "detach"]);
}

#[tokio::test]
async fn test_external_crash_event_renders_crash_view() {
    let (renderer, renders) = RecordingRenderer::new();

    let runtime = Runtime::new(
        TestApp::plain(),
        renderer,
        core_source(vec![simple_core("tasks")]),
        extension_source(vec![]),
        RuntimeOptions::default(),
    );

    runtime.run().await.unwrap();

    runtime.event_bus().emit(
        events::RUNTIME_CRASH,
        json!({ "message": "Session expired", "details": "401" }),
    );
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(runtime.state().load_state, LoadState::Crashed);
    assert!(renders
        .lock()
        .iter()
        .any(|c| c == "crash:Session expired"));
}

#[tokio::test]
async fn test_initialization_duration_is_stable() {
    let (renderer, _renders) = RecordingRenderer::new();

    let runtime = Runtime::new(
        TestApp::plain(),
        renderer,
        core_source(vec![simple_core("tasks")]),
        extension_source(vec![]),
        RuntimeOptions::default(),
    );

    runtime.run().await.unwrap();

    let first = runtime.state();
    let took = first.initialization_took_ms.unwrap();
    let start = first.initialization_start.unwrap();
    let stop = first.initialization_stop.unwrap();
    assert_eq!(took, stop.signed_duration_since(start).num_milliseconds());

    // a second finish event must not recompute the timing
    runtime
        .event_bus()
        .emit(events::INITIALIZE_FINISH, serde_json::Value::Null);
    assert_eq!(runtime.state().initialization_took_ms, Some(took));
    assert_eq!(runtime.state().initialization_stop, Some(stop));
}

#[tokio::test]
async fn test_builtin_capabilities() {
    let (renderer, _renders) = RecordingRenderer::new();

    let runtime = Runtime::new(
        TestApp::plain(),
        renderer,
        core_source(vec![]),
        extension_source(vec![]),
        RuntimeOptions::default(),
    );

    // version is locked data
    let version = runtime.public_context().get("ignition_version").unwrap();
    assert_eq!(version.as_data(), Some(&json!(env!("CARGO_PKG_VERSION"))));
    assert!(runtime.public_context().is_locked("ignition_version"));

    // emit_event relays onto the bus
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen2 = seen.clone();
    runtime
        .event_bus()
        .on("custom.ping", handler(move |p| seen2.lock().push(p.clone())));

    let emit = runtime.public_context().get("emit_event").unwrap();
    emit.call(json!({ "event": "custom.ping", "payload": { "n": 1 } }))
        .await
        .unwrap();
    assert_eq!(seen.lock()[0], json!({ "n": 1 }));

    // missing event name is an argument error
    assert!(emit.call(json!({})).await.is_err());

    // runtime_state reflects the record
    let state = runtime.public_context().get("runtime_state").unwrap();
    let snapshot = state.call(serde_json::Value::Null).await.unwrap();
    assert_eq!(snapshot["load_state"], "early");

    // toggle_debug flips the flag
    let toggle = runtime.public_context().get("toggle_debug").unwrap();
    assert_eq!(toggle.call(serde_json::Value::Null).await.unwrap(), json!(true));
    assert!(runtime.debug_enabled());
    assert_eq!(toggle.call(json!(false)).await.unwrap(), json!(false));
    assert!(!runtime.debug_enabled());
}

#[tokio::test]
async fn test_debug_view_refreshes_on_state_changes() {
    let (renderer, renders) = RecordingRenderer::new();

    let runtime = Runtime::new(
        TestApp::plain(),
        renderer,
        core_source(vec![simple_core("tasks")]),
        extension_source(vec![]),
        RuntimeOptions {
            debug: true,
            ..RuntimeOptions::default()
        },
    );

    runtime.run().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let debug_renders = renders.lock().iter().filter(|c| *c == "debug").count();
    assert!(debug_renders > 0);
}

#[tokio::test]
async fn test_options_from_config() {
    let config = ignition_config::ConfigLoader::load_str(
        r#"
        [runtime]
        debug = true
        await_event_timeout_ms = 250
        render_mount = "shell"

        [modules.api]
        retries = 2
        "#,
    )
    .unwrap();

    let options = RuntimeOptions::from_config(&config);
    assert!(options.debug);
    assert_eq!(options.await_event_timeout, Some(Duration::from_millis(250)));
    assert_eq!(options.render_mount, "shell");
    assert_eq!(options.module_config["api"]["retries"], 2);
}
