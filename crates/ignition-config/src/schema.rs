//! Configuration schema.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnitionConfig {
    pub runtime: RuntimeSection,

    /// Per-module configuration, keyed by extension ref name or core
    /// namespace, handed to the module through its init context.
    pub modules: HashMap<String, serde_json::Value>,
}

/// Bootstrap parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    /// Render the debug view and refresh it on every state change.
    pub debug: bool,

    /// Upper bound, in milliseconds, for `await_events` and extension
    /// dependency gates. Unset means wait indefinitely (the original
    /// behavior).
    pub await_event_timeout_ms: Option<u64>,

    /// Mount point identifier forwarded to the renderer.
    pub render_mount: String,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            debug: false,
            await_event_timeout_ms: None,
            render_mount: "root".to_string(),
        }
    }
}
