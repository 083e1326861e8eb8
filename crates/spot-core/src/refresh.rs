//! Level-triggered redraw signal shared by the background tasks and the
//! render loop.
//!
//! Any number of `raise()` calls before the consumer's `clear()` collapse
//! into one pending wake. The render loop must `clear()` right after waking
//! and before reading state, so a raise that races with the read is kept for
//! the next iteration instead of being lost.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct Inner {
    pending: AtomicBool,
    notify: Notify,
}

/// Cheap to clone; all clones share one flag. Intended for a single waiter.
#[derive(Debug, Clone, Default)]
pub struct RefreshSignal {
    inner: Arc<Inner>,
}

impl RefreshSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.inner.pending.store(true, Ordering::Release);
        // notify_one keeps at most one stored permit, so raises never queue.
        self.inner.notify.notify_one();
    }

    pub fn clear(&self) {
        self.inner.pending.store(false, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Wait until the signal is raised or `timeout` elapses.
    /// Returns whether the signal is raised; does not clear it.
    pub async fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            // Build the waiter before checking the flag so a raise landing in
            // between still leaves a permit behind.
            let notified = self.inner.notify.notified();
            if self.is_raised() {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.is_raised();
            }
            // Woken by a permit left over from an already-cleared raise;
            // re-check the flag and keep waiting on the same deadline.
        }
    }
}
