//! Observable bootstrap state.
//!
//! One record tracks the whole bootstrap: load phase, module rosters and
//! timing. Mutations go through [`RuntimeStates`], which enforces the phase
//! machine (`crashed` is terminal) and computes the initialization duration
//! exactly once.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Notify;
use tracing::warn;

use ignition_core::{Change, ChangeKind, Observable, ObserverId};

/// Bootstrap phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Early,
    Initializing,
    Initialized,
    Crashed,
}

impl LoadState {
    /// No transitions leave this phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Crashed)
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Early => "early",
            Self::Initializing => "initializing",
            Self::Initialized => "initialized",
            Self::Crashed => "crashed",
        };
        f.write_str(name)
    }
}

/// Field paths used in change descriptors.
pub mod paths {
    pub const LOAD_STATE: &str = "load_state";
    pub const LOADED_CORES: &str = "loaded_cores";
    pub const ATTACHED_EXTENSIONS: &str = "attached_extensions";
    pub const REJECTED_EXTENSIONS: &str = "rejected_extensions";
    pub const INITIALIZER_TASK_COUNT: &str = "initializer_task_count";
    pub const INITIALIZATION_START: &str = "initialization_start";
    pub const INITIALIZATION_STOP: &str = "initialization_stop";
}

/// The bootstrap state record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeState {
    pub load_state: LoadState,
    pub loaded_cores: Vec<String>,
    pub attached_extensions: Vec<String>,
    pub rejected_extensions: Vec<String>,
    pub initializer_task_count: usize,
    pub initialization_start: Option<DateTime<Utc>>,
    pub initialization_stop: Option<DateTime<Utc>>,
    /// Wall-clock duration of the bootstrap, in milliseconds.
    pub initialization_took_ms: Option<i64>,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            load_state: LoadState::Early,
            loaded_cores: Vec::new(),
            attached_extensions: Vec::new(),
            rejected_extensions: Vec::new(),
            initializer_task_count: 0,
            initialization_start: None,
            initialization_stop: None,
            initialization_took_ms: None,
        }
    }
}

/// Guarded mutation surface over the observable state record.
pub struct RuntimeStates {
    inner: Observable<RuntimeState>,
}

impl RuntimeStates {
    pub fn new() -> Self {
        Self {
            inner: Observable::new(RuntimeState::default()),
        }
    }

    /// Current load phase.
    pub fn load_state(&self) -> LoadState {
        self.inner.read(|s| s.load_state)
    }

    /// Transition the load phase. Once `crashed`, every further transition
    /// is refused and logged.
    pub fn set_load_state(&self, next: LoadState) {
        let current = self.load_state();
        if current.is_terminal() {
            warn!(%current, %next, "ignoring load state transition out of a terminal phase");
            return;
        }
        if current == next {
            return;
        }

        self.inner
            .mutate(Change::update(paths::LOAD_STATE, json!(next)), |s| {
                s.load_state = next;
            });
    }

    /// Record the bootstrap start timestamp. Only the first call counts.
    pub fn mark_started(&self) {
        if self.inner.read(|s| s.initialization_start.is_some()) {
            return;
        }

        let start = Utc::now();
        self.inner.mutate(
            Change::update(paths::INITIALIZATION_START, json!(start)),
            |s| s.initialization_start = Some(start),
        );
    }

    /// Record the bootstrap stop timestamp and compute the duration. The
    /// duration is computed exactly once; later calls are no-ops.
    pub fn mark_finished(&self) {
        let (start, finished) = self
            .inner
            .read(|s| (s.initialization_start, s.initialization_took_ms.is_some()));
        if finished {
            return;
        }

        let stop = Utc::now();
        let took_ms = start.map(|s| stop.signed_duration_since(s).num_milliseconds());

        self.inner.mutate(
            Change::update(paths::INITIALIZATION_STOP, json!(stop)),
            |s| {
                s.initialization_stop = Some(stop);
                s.initialization_took_ms = took_ms;
            },
        );
    }

    /// Append a core to the loaded roster.
    pub fn push_loaded_core(&self, namespace: &str) {
        let namespace = namespace.to_string();
        self.inner.mutate(
            Change::insert(paths::LOADED_CORES, json!(namespace)),
            |s| s.loaded_cores.push(namespace.clone()),
        );
    }

    /// Append an extension to the attached roster and wake waiters.
    pub fn push_attached_extension(&self, name: &str) {
        let name = name.to_string();
        self.inner.mutate(
            Change::insert(paths::ATTACHED_EXTENSIONS, json!(name)),
            |s| s.attached_extensions.push(name.clone()),
        );
    }

    /// Append an extension to the rejected roster.
    pub fn push_rejected_extension(&self, name: &str) {
        let name = name.to_string();
        self.inner.mutate(
            Change::insert(paths::REJECTED_EXTENSIONS, json!(name)),
            |s| s.rejected_extensions.push(name.clone()),
        );
    }

    /// Record the current size of the initializer queue.
    pub fn set_task_count(&self, count: usize) {
        self.inner.mutate(
            Change::update(paths::INITIALIZER_TASK_COUNT, json!(count)),
            |s| s.initializer_task_count = count,
        );
    }

    /// Whether an extension has completed attachment.
    pub fn is_attached(&self, name: &str) -> bool {
        self.inner
            .read(|s| s.attached_extensions.iter().any(|n| n == name))
    }

    /// Wait until the named extension appears in the attached roster.
    ///
    /// Resolves immediately if the extension is already attached. With a
    /// timeout, returns `false` when the bound elapses first.
    pub async fn wait_attached(&self, name: &str, timeout: Option<Duration>) -> bool {
        let notify = Arc::new(Notify::new());
        let waker = notify.clone();
        let wanted = name.to_string();

        let observer = self.inner.observe(move |change| {
            if change.kind == ChangeKind::Insert
                && change.path == paths::ATTACHED_EXTENSIONS
                && change.value == json!(wanted)
            {
                waker.notify_one();
            }
        });

        // the roster may have changed before the observer was registered
        let attached = if self.is_attached(name) {
            true
        } else {
            match timeout {
                Some(bound) => tokio::time::timeout(bound, notify.notified())
                    .await
                    .is_ok(),
                None => {
                    notify.notified().await;
                    true
                }
            }
        };

        self.inner.unobserve(observer);
        attached
    }

    /// Register an observer on the underlying record.
    pub fn observe<F>(&self, f: F) -> ObserverId
    where
        F: Fn(&Change) + Send + Sync + 'static,
    {
        self.inner.observe(f)
    }

    /// Remove an observer.
    pub fn unobserve(&self, id: ObserverId) {
        self.inner.unobserve(id)
    }

    /// Clone the current record.
    pub fn snapshot(&self) -> RuntimeState {
        self.inner.snapshot()
    }
}

impl Default for RuntimeStates {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
