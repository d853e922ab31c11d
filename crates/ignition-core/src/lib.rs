//! # Ignition Core
//!
//! Leaf components of the Ignition bootstrap runtime.
//!
//! ## Components
//!
//! - [`EventBus`] - synchronous publish/subscribe hub with per-handler
//!   fault isolation
//! - [`Observable`] - versioned state container notifying observers after
//!   each committed mutation
//! - [`PublicContext`] - write-once/read-many capability namespace
//! - Registries for attached extensions and loaded cores

pub mod event_bus;
pub mod observable;
pub mod public_context;
pub mod registry;

pub use event_bus::{handler, EventBus};
pub use observable::{Change, ChangeKind, Observable, ObserverId};
pub use public_context::{CoresPublicContext, FrozenNamespace, PublicContext};
pub use registry::{CoreRegistry, ExtensionRegistry};
