//! Synchronous observer registry.
//!
//! [`ChangeNotifier`] fans a zero-argument "something changed" signal out
//! to registered callbacks. Subscribers re-read whatever state they care
//! about; the notification itself carries no payload. Designed to be
//! owned by the store and shared behind it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Handle identifying one subscription, returned by
/// [`ChangeNotifier::subscribe`] and accepted by
/// [`ChangeNotifier::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Registry of change callbacks with panic isolation.
///
/// Callbacks are invoked synchronously, in subscription order, outside
/// the registry lock, so a callback may subscribe or unsubscribe without
/// deadlocking. A panicking callback is logged and skipped; it never
/// prevents later callbacks from running.
pub struct ChangeNotifier {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriberId, Callback)>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback. The returned id is the unsubscribe handle.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_subscribers().push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription. Returns `false` if the id is unknown
    /// (already unsubscribed ids are tolerated).
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.lock_subscribers();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    /// Invoke every callback once, isolating panics.
    pub fn notify(&self) {
        // Snapshot under the lock, invoke outside it.
        let subscribers: Vec<(SubscriberId, Callback)> = self.lock_subscribers().clone();

        for (id, callback) in subscribers {
            if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                tracing::error!(subscriber_id = id.0, "Subscriber panicked during notification");
            }
        }
    }

    /// Callbacks never run under the lock, so poisoning can only come from
    /// a panic between lock and unlock here; recover the data either way.
    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriberId, Callback)>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
