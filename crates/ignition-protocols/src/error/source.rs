//! Module discovery/loading errors.

use thiserror::Error;

/// Failure of a lazy module loader.
///
/// A failed extension load becomes a rejection; a failed core load is
/// logged and skipped at discovery time (the core stage only fails later,
/// during initialization).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Module load failed: {0}")]
    LoadFailed(String),

    #[error("Module is not constructible: {0}")]
    NotConstructible(String),
}
