//! Core protocol: long-lived service modules.

mod context;
mod manifest;
mod traits;

pub use context::CoreContext;
pub use manifest::CoreManifest;
pub use traits::Core;
