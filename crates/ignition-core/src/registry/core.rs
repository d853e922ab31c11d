//! Registry of loaded cores.

use std::sync::Arc;

use ignition_protocols::core::{Core, CoreManifest};
use ignition_protocols::error::CoreError;

use super::base::{BaseRegistry, Registerable};

impl Registerable for dyn Core {
    fn registry_name(&self) -> &str {
        &self.manifest().namespace
    }
}

/// The `CORES` map: cores that finished initialization.
pub struct CoreRegistry {
    inner: BaseRegistry<dyn Core>,
}

impl CoreRegistry {
    /// Create a new core registry.
    pub fn new() -> Self {
        Self {
            inner: BaseRegistry::new(),
        }
    }

    /// Store an initialized core. A duplicate namespace is structural.
    pub fn register(&self, core: Arc<dyn Core>) -> Result<(), CoreError> {
        self.inner
            .register(core)
            .map_err(|dup| CoreError::AlreadyRegistered(dup.0))
    }

    /// Get a core by namespace.
    pub fn get(&self, namespace: &str) -> Option<Arc<dyn Core>> {
        self.inner.get(namespace)
    }

    /// Check if a core is loaded.
    pub fn contains(&self, namespace: &str) -> bool {
        self.inner.contains(namespace)
    }

    /// List the manifests of all loaded cores.
    pub fn list(&self) -> Vec<CoreManifest> {
        self.inner.iter().map(|c| c.manifest().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for CoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}
