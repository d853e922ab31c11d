//! Public context seam.
//!
//! The public context is the write-once, read-many namespace through which
//! decoupled modules publish capabilities. Values are either plain JSON
//! data or callable capabilities behind the [`PublicMethod`] trait.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ContextError;

/// A callable capability published into the public context.
#[async_trait]
pub trait PublicMethod: Send + Sync {
    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ContextError>;
}

/// Wrap a plain closure as a [`PublicMethod`].
pub struct FnMethod<F>(pub F);

#[async_trait]
impl<F> PublicMethod for FnMethod<F>
where
    F: Fn(serde_json::Value) -> Result<serde_json::Value, ContextError> + Send + Sync,
{
    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ContextError> {
        (self.0)(args)
    }
}

/// A value stored under a public context key.
#[derive(Clone)]
pub enum ContextValue {
    Data(serde_json::Value),
    Method(Arc<dyn PublicMethod>),
}

impl ContextValue {
    /// Wrap serializable data. Falls back to `Null` if serialization fails.
    pub fn data<T: serde::Serialize>(value: T) -> Self {
        Self::Data(serde_json::to_value(value).unwrap_or(serde_json::Value::Null))
    }

    /// Wrap a closure as a callable capability.
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(serde_json::Value) -> Result<serde_json::Value, ContextError>
            + Send
            + Sync
            + 'static,
    {
        Self::Method(Arc::new(FnMethod(f)))
    }

    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data(v) => Some(v),
            Self::Method(_) => None,
        }
    }

    /// Invoke a method value; data values are not callable.
    pub async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ContextError> {
        match self {
            Self::Method(m) => m.call(args).await,
            Self::Data(_) => Err(ContextError::InvalidArguments(
                "context value is not callable".to_string(),
            )),
        }
    }
}

impl fmt::Debug for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(v) => f.debug_tuple("Data").field(v).finish(),
            Self::Method(_) => f.write_str("Method(..)"),
        }
    }
}

/// Access to the runtime public context.
pub trait PublicContextAccess: Send + Sync {
    /// Register a key. Returns the value actually stored, which is the
    /// existing one when the key is locked (the violation is logged by the
    /// implementation, never propagated).
    fn register(&self, key: &str, value: ContextValue, locked: bool) -> ContextValue;

    /// Look up a key.
    fn get(&self, key: &str) -> Option<ContextValue>;

    /// Check whether a key is registered.
    fn contains(&self, key: &str) -> bool;
}
