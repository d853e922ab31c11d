//! Core manifest types.

use serde::{Deserialize, Serialize};

/// Core manifest: identity, dependency ordering and readiness gates.
///
/// The namespace doubles as the core's unique name and as the key under
/// which its public surface is exposed (`cores.<namespace>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreManifest {
    pub namespace: String,
    #[serde(default)]
    pub description: String,
    /// Cores that must be initialized before this one.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Events that must fire once before this core counts as loaded.
    #[serde(default)]
    pub await_events: Vec<String>,
}

impl CoreManifest {
    /// Create a new core manifest.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            description: String::new(),
            dependencies: Vec::new(),
            await_events: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_await_events(mut self, await_events: Vec<String>) -> Self {
        self.await_events = await_events;
        self
    }
}
