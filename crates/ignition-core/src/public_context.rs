//! Write-once/read-many public context.
//!
//! Modules publish capabilities here for consumption by the UI layer and
//! by each other, without import cycles. A locked key can never be
//! overwritten; the attempt is logged and ignored so a misbehaving module
//! cannot take down unrelated consumers.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

use ignition_protocols::context::{ContextValue, PublicContextAccess};
use ignition_protocols::error::ContextError;

struct ContextEntry {
    value: ContextValue,
    locked: bool,
}

/// The shared public namespace.
pub struct PublicContext {
    entries: DashMap<String, ContextEntry>,
}

impl PublicContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Register a key, returning the value actually stored.
    ///
    /// Re-registering a locked key is a context violation: the original
    /// value is retained, the violation is logged, and the call returns
    /// the original. Unlocked keys may be reconfigured.
    pub fn register(&self, key: &str, value: ContextValue, locked: bool) -> ContextValue {
        match self.entries.entry(key.to_string()) {
            dashmap::Entry::Occupied(mut occupied) => {
                if occupied.get().locked {
                    error!(key, "attempted to overwrite a locked public context key");
                    occupied.get().value.clone()
                } else {
                    debug!(key, "reconfiguring public context key");
                    occupied.insert(ContextEntry {
                        value: value.clone(),
                        locked,
                    });
                    value
                }
            }
            dashmap::Entry::Vacant(vacant) => {
                vacant.insert(ContextEntry {
                    value: value.clone(),
                    locked,
                });
                value
            }
        }
    }

    /// Register a whole capability map with one lock policy.
    pub fn register_many(&self, methods: HashMap<String, ContextValue>, locked: bool) {
        for (key, value) in methods {
            self.register(&key, value, locked);
        }
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<ContextValue> {
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// Check whether a key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Check whether a key is locked.
    pub fn is_locked(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| e.locked)
    }

    /// List all registered keys.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PublicContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicContextAccess for PublicContext {
    fn register(&self, key: &str, value: ContextValue, locked: bool) -> ContextValue {
        PublicContext::register(self, key, value, locked)
    }

    fn get(&self, key: &str) -> Option<ContextValue> {
        PublicContext::get(self, key)
    }

    fn contains(&self, key: &str) -> bool {
        PublicContext::contains(self, key)
    }
}

/// An immutable view over one core's public surface.
///
/// Built once when the core finishes initializing; consumers can only
/// read from it.
pub struct FrozenNamespace {
    namespace: String,
    entries: HashMap<String, ContextValue>,
}

impl FrozenNamespace {
    pub fn new(namespace: impl Into<String>, entries: HashMap<String, ContextValue>) -> Self {
        Self {
            namespace: namespace.into(),
            entries,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only lookup of core public surfaces by namespace
/// (the `app.cores.<namespace>` equivalent).
pub struct CoresPublicContext {
    namespaces: DashMap<String, Arc<FrozenNamespace>>,
}

impl CoresPublicContext {
    pub fn new() -> Self {
        Self {
            namespaces: DashMap::new(),
        }
    }

    /// Expose a core's surface. Each namespace can be exposed exactly once.
    pub fn expose(&self, surface: FrozenNamespace) -> Result<(), ContextError> {
        let namespace = surface.namespace().to_string();

        if self.namespaces.contains_key(&namespace) {
            return Err(ContextError::NamespaceExists(namespace));
        }

        self.namespaces.insert(namespace, Arc::new(surface));
        Ok(())
    }

    /// Look up a core's surface.
    pub fn get(&self, namespace: &str) -> Option<Arc<FrozenNamespace>> {
        self.namespaces.get(namespace).map(|n| n.clone())
    }

    /// List exposed namespaces.
    pub fn namespaces(&self) -> Vec<String> {
        self.namespaces.iter().map(|n| n.key().clone()).collect()
    }
}

impl Default for CoresPublicContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_get() {
        let ctx = PublicContext::new();
        ctx.register("version", ContextValue::data("1.0.0"), true);

        let value = ctx.get("version").unwrap();
        assert_eq!(value.as_data(), Some(&json!("1.0.0")));
        assert!(ctx.is_locked("version"));
    }

    #[test]
    fn test_locked_key_is_never_overwritten() {
        let ctx = PublicContext::new();
        ctx.register("eventBus", ContextValue::data("original"), true);

        // the violation must not panic, and the original must survive
        let returned = ctx.register("eventBus", ContextValue::data("intruder"), true);

        assert_eq!(returned.as_data(), Some(&json!("original")));
        assert_eq!(
            ctx.get("eventBus").unwrap().as_data(),
            Some(&json!("original"))
        );
    }

    #[test]
    fn test_unlocked_key_can_be_reconfigured() {
        let ctx = PublicContext::new();
        ctx.register("theme", ContextValue::data("light"), false);
        ctx.register("theme", ContextValue::data("dark"), false);

        assert_eq!(ctx.get("theme").unwrap().as_data(), Some(&json!("dark")));
    }

    #[test]
    fn test_register_returns_stored_value() {
        let ctx = PublicContext::new();
        let stored = ctx.register("n", ContextValue::data(1), true);
        assert_eq!(stored.as_data(), Some(&json!(1)));
    }

    #[test]
    fn test_register_many() {
        let ctx = PublicContext::new();
        let mut methods = HashMap::new();
        methods.insert("a".to_string(), ContextValue::data(1));
        methods.insert("b".to_string(), ContextValue::data(2));

        ctx.register_many(methods, true);
        assert_eq!(ctx.len(), 2);
        assert!(ctx.contains("a"));
        assert!(ctx.contains("b"));
    }

    #[tokio::test]
    async fn test_method_capability_roundtrip() {
        let ctx = PublicContext::new();
        ctx.register(
            "sum",
            ContextValue::method(|args| {
                let a = args["a"].as_i64().unwrap_or(0);
                let b = args["b"].as_i64().unwrap_or(0);
                Ok(json!(a + b))
            }),
            true,
        );

        let sum = ctx.get("sum").unwrap();
        let out = sum.call(json!({ "a": 2, "b": 3 })).await.unwrap();
        assert_eq!(out, json!(5));
    }

    #[test]
    fn test_frozen_namespace_lookup() {
        let mut surface = HashMap::new();
        surface.insert("test".to_string(), ContextValue::data("ok"));

        let ns = FrozenNamespace::new("exampleCore", surface);
        assert_eq!(ns.namespace(), "exampleCore");
        assert!(ns.get("test").is_some());
        assert!(ns.get("missing").is_none());
    }

    #[test]
    fn test_cores_context_namespace_exposed_once() {
        let cores = CoresPublicContext::new();
        cores
            .expose(FrozenNamespace::new("api", HashMap::new()))
            .unwrap();

        let err = cores
            .expose(FrozenNamespace::new("api", HashMap::new()))
            .unwrap_err();
        assert!(matches!(err, ContextError::NamespaceExists(_)));

        assert!(cores.get("api").is_some());
        assert!(cores.get("missing").is_none());
    }
}
