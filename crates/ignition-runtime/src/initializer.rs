//! Deferred initializer queue.
//!
//! Cores and extensions queue tasks here during structural bootstrap; the
//! runtime drains the queue strictly sequentially afterwards. A failing
//! task is logged and never stops the tasks behind it.

use parking_lot::Mutex;
use tracing::{debug, error, warn};

use ignition_protocols::task::InitializerTask;

/// FIFO queue of deferred async tasks.
pub struct InitializerQueue {
    tasks: Mutex<Vec<InitializerTask>>,
}

impl InitializerQueue {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Queue one task.
    pub fn append(&self, task: InitializerTask) {
        self.tasks.lock().push(task);
    }

    /// Queue a batch of tasks, preserving order.
    pub fn append_all(&self, tasks: Vec<InitializerTask>) {
        self.tasks.lock().extend(tasks);
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }

    /// Run all queued tasks one at a time, in queue order, emptying the
    /// queue. Returns the number of tasks that completed successfully.
    pub async fn drain(&self) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.lock());

        if tasks.is_empty() {
            warn!("initializer queue drained with no tasks queued");
            return 0;
        }

        debug!(count = tasks.len(), "draining initializer queue");

        let mut succeeded = 0;
        for (index, task) in tasks.into_iter().enumerate() {
            match task().await {
                Ok(()) => succeeded += 1,
                Err(e) => error!(index, error = %e, "initializer task failed"),
            }
        }

        succeeded
    }
}

impl Default for InitializerQueue {
    fn default() -> Self {
        Self::new()
    }
}
