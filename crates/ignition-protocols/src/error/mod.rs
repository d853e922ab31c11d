//! Error types for the Ignition runtime.
//!
//! The taxonomy follows the propagation policy of the bootstrap:
//! only structural failures ([`CoreError`], [`RuntimeError`]) propagate as
//! real errors up to the top-level initialize; module rejections, task
//! failures and context violations are converted into logged side effects.

mod context;
mod core;
mod event;
mod extension;
mod render;
mod runtime;
mod source;
mod task;

pub use context::ContextError;
pub use core::CoreError;
pub use event::EventError;
pub use extension::ExtensionError;
pub use render::RenderError;
pub use runtime::RuntimeError;
pub use source::LoadError;
pub use task::TaskError;
