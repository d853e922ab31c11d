//! Observable state container.
//!
//! Wraps a record and notifies observers synchronously with a change
//! descriptor after each mutation has been committed, so observers never
//! see a torn state.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Kind of a committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Change descriptor delivered to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    /// Field path within the wrapped record (e.g. `attached_extensions`).
    pub path: String,
    pub value: serde_json::Value,
}

impl Change {
    pub fn insert(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            kind: ChangeKind::Insert,
            path: path.into(),
            value,
        }
    }

    pub fn update(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            kind: ChangeKind::Update,
            path: path.into(),
            value,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Delete,
            path: path.into(),
            value: serde_json::Value::Null,
        }
    }
}

/// Observer registration handle.
pub type ObserverId = Uuid;

type ObserverFn = Arc<dyn Fn(&Change) + Send + Sync>;

/// A mutable record whose writes notify observers.
pub struct Observable<T> {
    inner: RwLock<T>,
    observers: RwLock<Vec<(ObserverId, ObserverFn)>>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(value),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer. Observers run synchronously, after the
    /// mutation is committed, in registration order.
    pub fn observe<F>(&self, f: F) -> ObserverId
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.observers.write().push((id, Arc::new(f)));
        id
    }

    /// Remove an observer.
    pub fn unobserve(&self, id: ObserverId) {
        self.observers.write().retain(|(oid, _)| *oid != id);
    }

    /// Read the wrapped record.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.read())
    }

    /// Apply a mutation, then notify observers with the change descriptor.
    ///
    /// The write lock is released before observers run, so observers may
    /// read (or further mutate) the observable.
    pub fn mutate(&self, change: Change, f: impl FnOnce(&mut T)) {
        {
            let mut inner = self.inner.write();
            f(&mut inner);
        }

        let observers: Vec<ObserverFn> = self
            .observers
            .read()
            .iter()
            .map(|(_, f)| f.clone())
            .collect();

        for observer in observers {
            observer(&change);
        }
    }
}

impl<T: Clone> Observable<T> {
    /// Clone the current record.
    pub fn snapshot(&self) -> T {
        self.inner.read().clone()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
