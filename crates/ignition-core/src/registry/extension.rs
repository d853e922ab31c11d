//! Registry of attached extensions.

use std::sync::Arc;

use ignition_protocols::error::ExtensionError;
use ignition_protocols::extension::{Extension, ExtensionManifest};

use super::base::{BaseRegistry, Registerable};

impl Registerable for dyn Extension {
    fn registry_name(&self) -> &str {
        &self.manifest().ref_name
    }
}

/// The `EXTENSIONS` map: extensions that completed attachment.
pub struct ExtensionRegistry {
    inner: BaseRegistry<dyn Extension>,
}

impl ExtensionRegistry {
    /// Create a new extension registry.
    pub fn new() -> Self {
        Self {
            inner: BaseRegistry::new(),
        }
    }

    /// Store an attached extension. Duplicate names are rejected.
    pub fn register(&self, extension: Arc<dyn Extension>) -> Result<(), ExtensionError> {
        self.inner
            .register(extension)
            .map_err(|dup| ExtensionError::AlreadyAttached(dup.0))
    }

    /// Get an extension by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Extension>> {
        self.inner.get(name)
    }

    /// Check if an extension is attached.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }

    /// List the manifests of all attached extensions.
    pub fn list(&self) -> Vec<ExtensionManifest> {
        self.inner.iter().map(|e| e.manifest().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
