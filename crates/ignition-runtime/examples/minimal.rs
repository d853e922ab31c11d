//! Minimal headless host: one core, one extension, a full bootstrap.
//!
//! Run with `cargo run --example minimal` (set `RUST_LOG=debug` for the
//! lifecycle events).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use ignition_protocols::app::AppDelegate;
use ignition_protocols::context::ContextValue;
use ignition_protocols::core::{Core, CoreManifest};
use ignition_protocols::extension::{Extension, ExtensionContext, ExtensionManifest};
use ignition_protocols::error::ExtensionError;
use ignition_runtime::{NoopRenderer, Runtime, RuntimeOptions, StaticModuleSource};

struct SettingsCore {
    manifest: CoreManifest,
}

#[async_trait]
impl Core for SettingsCore {
    fn manifest(&self) -> &CoreManifest {
        &self.manifest
    }

    fn public_surface(&self) -> HashMap<String, ContextValue> {
        let mut surface = HashMap::new();
        surface.insert("theme".to_string(), ContextValue::data("dark"));
        surface
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

struct GreeterExtension {
    manifest: ExtensionManifest,
}

#[async_trait]
impl Extension for GreeterExtension {
    fn manifest(&self) -> &ExtensionManifest {
        &self.manifest
    }

    async fn initialize(&mut self, ctx: ExtensionContext) -> Result<(), ExtensionError> {
        ctx.event_bus.emit("greeter.loaded", json!({ "ok": true }));
        Ok(())
    }

    fn public_methods(&self) -> HashMap<String, ContextValue> {
        let mut methods = HashMap::new();
        methods.insert(
            "greet".to_string(),
            ContextValue::method(|args| {
                let name = args.as_str().unwrap_or("world");
                Ok(json!(format!("hello, {name}")))
            }),
        );
        methods
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

struct MinimalApp;

#[async_trait]
impl AppDelegate for MinimalApp {
    fn name(&self) -> &str {
        "minimal"
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cores = StaticModuleSource::new().with("mem://settings", || {
        Ok(Box::new(SettingsCore {
            manifest: CoreManifest::new("settings"),
        }) as Box<dyn Core>)
    });

    let extensions = StaticModuleSource::new().with("mem://greeter", || {
        Ok(Box::new(GreeterExtension {
            manifest: ExtensionManifest::new("greeter"),
        }) as Box<dyn Extension>)
    });

    let runtime = Runtime::new(
        Arc::new(MinimalApp),
        Arc::new(NoopRenderer),
        Arc::new(cores),
        Arc::new(extensions),
        RuntimeOptions::default(),
    );

    if runtime.run().await.is_err() {
        std::process::exit(1);
    }

    let greet = runtime
        .public_context()
        .get("greet")
        .expect("greeter published its capability");
    let greeting = greet.call(json!("ignition")).await.expect("callable");
    println!("{greeting}");

    let state = runtime.state();
    println!(
        "initialized in {}ms with {} core(s), {} extension(s)",
        state.initialization_took_ms.unwrap_or_default(),
        state.loaded_cores.len(),
        state.attached_extensions.len(),
    );
}
