//! Deferred initializer tasks.
//!
//! Extensions, cores and the app delegate contribute async tasks that the
//! runtime drains strictly sequentially after structural bootstrap. Tasks
//! capture whatever context they need at creation time.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::TaskError;

/// Boxed future returned by an initializer task.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>>;

/// A deferred async task queued for the post-bootstrap drain.
pub type InitializerTask = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// Build an [`InitializerTask`] from an async closure.
pub fn initializer_task<F, Fut>(f: F) -> InitializerTask
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}
