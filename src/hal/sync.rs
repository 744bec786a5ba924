//! Cross-queue synchronization primitives.
//!
//! A [`SyncHandle`] is the value returned by
//! [`CommandContext::execute`](super::CommandContext::execute): an opaque
//! fence point representing a submitted workload's completion. Handles are
//! cheap to clone and can cross threads; a later queue waits on one via
//! [`CommandContext::wait_for_sync_handle`](super::CommandContext::wait_for_sync_handle),
//! and the CPU can block on [`SyncHandle::wait`].

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// A monotonically increasing timeline fence.
///
/// Device backends own one per queue and signal it as submissions retire.
pub struct Fence {
    completed: Mutex<u64>,
    condvar: Condvar,
}

impl Fence {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            completed: Mutex::new(0),
            condvar: Condvar::new(),
        })
    }

    /// Marks every point up to `value` complete and wakes waiters.
    pub fn signal(&self, value: u64) {
        let mut completed = self.completed.lock();
        if *completed < value {
            *completed = value;
            self.condvar.notify_all();
        }
    }

    /// The highest completed fence point.
    #[must_use]
    pub fn completed_value(&self) -> u64 {
        *self.completed.lock()
    }

    fn wait_for(&self, value: u64) {
        let mut completed = self.completed.lock();
        while *completed < value {
            self.condvar.wait(&mut completed);
        }
    }
}

/// An opaque fence point for a submitted GPU workload.
///
/// The default handle is null: it is never incomplete and waiting on it
/// returns immediately, so "no dependency" needs no special casing.
#[derive(Clone, Default)]
pub struct SyncHandle {
    fence: Option<Arc<Fence>>,
    value: u64,
}

impl SyncHandle {
    #[must_use]
    pub fn new(fence: Arc<Fence>, value: u64) -> Self {
        Self {
            fence: Some(fence),
            value,
        }
    }

    /// Whether the handle refers to an actual submission.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.fence.is_some()
    }

    /// The fence point this handle waits for.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Blocks until the workload completes. No-op for the null handle.
    pub fn wait(&self) {
        if let Some(fence) = &self.fence {
            fence.wait_for(self.value);
        }
    }

    /// Polls completion without blocking. The null handle is always complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match &self.fence {
            Some(fence) => fence.completed_value() >= self.value,
            None => true,
        }
    }
}

impl std::fmt::Debug for SyncHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "SyncHandle({})", self.value)
        } else {
            write!(f, "SyncHandle(null)")
        }
    }
}
