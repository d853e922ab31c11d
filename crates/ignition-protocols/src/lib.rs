//! # Ignition Protocols
//!
//! Core protocol definitions (traits) for the Ignition bootstrap runtime.
//! Contains only interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`Extension`] - One-shot plugin module; failure is non-fatal
//! - [`Core`] - Long-lived service module with dependency ordering
//! - [`AppDelegate`] - Application-level lifecycle hooks and surfaces
//! - [`Renderer`] - UI collaborator for splash/crash/app views
//! - [`ModuleSource`] - Discovery collaborator returning lazy module loaders
//! - [`EventBusAccess`] / [`PublicContextAccess`] - capability seams that
//!   decouple modules from the concrete runtime implementation

pub mod app;
pub mod context;
pub mod core;
pub mod error;
pub mod event;
pub mod extension;
pub mod render;
pub mod source;
pub mod task;

// Re-export core traits
pub use app::AppDelegate;
pub use context::{ContextValue, FnMethod, PublicContextAccess, PublicMethod};
pub use core::{Core, CoreContext, CoreManifest};
pub use event::{AwaitEvent, EventBusAccess, EventHandler, EventPayload, SubscriptionId};
pub use extension::{Extension, ExtensionContext, ExtensionManifest};
pub use render::{CrashReport, Renderer};
pub use source::{DiscoveredModule, ModuleLoader, ModuleSource};
pub use task::{InitializerTask, TaskFuture};
pub use error::{
    ContextError, CoreError, EventError, ExtensionError, LoadError, RenderError, RuntimeError,
    TaskError,
};
