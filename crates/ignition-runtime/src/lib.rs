//! # Ignition Runtime
//!
//! The bootstrap orchestrator: one [`Runtime`] takes an app delegate, a
//! renderer and two module sources, and drives the whole lifecycle.
//!
//! ## Bootstrap sequence
//!
//! 1. Splash render, start event
//! 2. Cores: concurrent load, dependency-ordered sequential init (fatal)
//! 3. Extensions: concurrent attach, per-module rejection (fail-soft)
//! 4. Initializer queue drain, app hook, public surface registration
//! 5. Finish event, app render, splash detachment
//!
//! A structural failure flips the state machine to its terminal `crashed`
//! phase and renders the crash view instead.

pub mod core_manager;
pub mod events;
pub mod extension_manager;
pub mod initializer;
pub mod render;
pub mod runtime;
pub mod source;
pub mod state;

pub use core_manager::CoreManager;
pub use extension_manager::ExtensionManager;
pub use initializer::InitializerQueue;
pub use render::NoopRenderer;
pub use runtime::{Runtime, RuntimeOptions};
pub use source::{module_loader, StaticModuleSource};
pub use state::{LoadState, RuntimeState, RuntimeStates};
