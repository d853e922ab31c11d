//! Generic name-keyed registry.
//!
//! Shared storage for the `EXTENSIONS` and `CORES` maps. Duplicate names
//! are rejected at registration time: the policy for this runtime is
//! reject-the-duplicate, never last-registration-wins.

use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

/// Registration failure: an entry with the same name already exists.
#[derive(Debug, Error)]
#[error("name already registered: {0}")]
pub struct DuplicateName(pub String);

/// Trait for items that can be stored in a registry.
pub trait Registerable: Send + Sync {
    /// Returns the unique name for this item.
    fn registry_name(&self) -> &str;
}

/// Thread-safe registry of items keyed by their unique name.
pub struct BaseRegistry<T: ?Sized + Registerable> {
    items: DashMap<String, Arc<T>>,
}

impl<T: ?Sized + Registerable> BaseRegistry<T> {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    /// Register an item under its own name.
    pub fn register(&self, item: Arc<T>) -> Result<(), DuplicateName> {
        let name = item.registry_name().to_string();

        if self.items.contains_key(&name) {
            return Err(DuplicateName(name));
        }

        self.items.insert(name, item);
        Ok(())
    }

    /// Get an item by name.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.items.get(name).map(|item| item.clone())
    }

    /// Check if an item with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// List all registered names.
    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|item| item.key().clone()).collect()
    }

    /// Iterate over all items.
    pub fn iter(&self) -> impl Iterator<Item = Arc<T>> + '_ {
        self.items.iter().map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: ?Sized + Registerable> Default for BaseRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
