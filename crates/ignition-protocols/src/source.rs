//! Module discovery collaborator.
//!
//! Discovery returns lazy loaders, not modules: candidates are enumerated
//! cheaply and loaded concurrently later. The same trait serves core and
//! extension discovery.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::LoadError;

/// Lazy async loader producing one module instance.
pub type ModuleLoader<M> =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Box<M>, LoadError>> + Send + Sync>;

/// A discovered module candidate.
pub struct DiscoveredModule<M: ?Sized> {
    /// Source identifier (path-like), used for load diagnostics.
    pub id: String,
    pub loader: ModuleLoader<M>,
}

impl<M: ?Sized> DiscoveredModule<M> {
    pub fn new(id: impl Into<String>, loader: ModuleLoader<M>) -> Self {
        Self {
            id: id.into(),
            loader,
        }
    }
}

impl<M: ?Sized> Clone for DiscoveredModule<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            loader: self.loader.clone(),
        }
    }
}

/// Enumerates module candidates.
#[async_trait]
pub trait ModuleSource: Send + Sync {
    type Module: ?Sized;

    /// Return all candidates known to this source.
    async fn discover(&self) -> Vec<DiscoveredModule<Self::Module>>;
}
