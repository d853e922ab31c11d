//! In-memory module source.
//!
//! Hosts register constructors up front and the runtime discovers them at
//! bootstrap. Loaders stay lazy so the discovery pass is cheap and the
//! actual construction happens concurrently later.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use ignition_protocols::error::LoadError;
use ignition_protocols::source::{DiscoveredModule, ModuleLoader, ModuleSource};

/// Build a [`ModuleLoader`] from a plain constructor closure.
pub fn module_loader<M, F>(f: F) -> ModuleLoader<M>
where
    M: ?Sized + Send + 'static,
    F: Fn() -> Result<Box<M>, LoadError> + Send + Sync + 'static,
{
    Arc::new(
        move || -> BoxFuture<'static, Result<Box<M>, LoadError>> {
            let built = f();
            Box::pin(async move { built })
        },
    )
}

/// A source backed by a fixed, host-registered candidate list.
pub struct StaticModuleSource<M: ?Sized> {
    modules: Mutex<Vec<DiscoveredModule<M>>>,
}

impl<M: ?Sized + 'static> StaticModuleSource<M> {
    pub fn new() -> Self {
        Self {
            modules: Mutex::new(Vec::new()),
        }
    }

    /// Register a candidate under a diagnostic identifier.
    pub fn push(&self, id: impl Into<String>, loader: ModuleLoader<M>) {
        self.modules.lock().push(DiscoveredModule::new(id, loader));
    }

    /// Builder-style registration from a plain constructor.
    pub fn with<F>(self, id: impl Into<String>, constructor: F) -> Self
    where
        M: Send,
        F: Fn() -> Result<Box<M>, LoadError> + Send + Sync + 'static,
    {
        self.push(id, module_loader(constructor));
        self
    }

    pub fn len(&self) -> usize {
        self.modules.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.lock().is_empty()
    }
}

impl<M: ?Sized + 'static> Default for StaticModuleSource<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<M: ?Sized + 'static> ModuleSource for StaticModuleSource<M> {
    type Module = M;

    async fn discover(&self) -> Vec<DiscoveredModule<M>> {
        self.modules.lock().clone()
    }
}
