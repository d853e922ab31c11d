//! Registries for attached extensions and loaded cores.

mod base;
mod core;
mod extension;

pub use base::{BaseRegistry, DuplicateName, Registerable};
pub use core::CoreRegistry;
pub use extension::ExtensionRegistry;
