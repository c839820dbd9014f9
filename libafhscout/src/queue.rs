//! Active notification set with timed auto-dismiss
//!
//! Every notification gets an expiry timer when it is enqueued. Manual
//! dismissal, expiry, eviction at capacity and `clear` all go through the
//! same removal path, so the view sees exactly one `unrender` per
//! notification regardless of how it left.
//!
//! Bookkeeping is updated before the renderer is called; a failing renderer
//! is logged and otherwise ignored.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tracing::{debug, warn};

use crate::notification::{Notification, NotificationId, NotificationKind};
use crate::timer::{TimerHandle, Timers};
use crate::view::ViewRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Removal {
    Manual,
    Expired,
    Evicted,
    Cleared,
}

struct Entry {
    notification: Notification,
    expiry: Option<TimerHandle>,
}

struct Shared {
    /// Newest first
    active: Mutex<VecDeque<Entry>>,
    renderer: Arc<dyn ViewRenderer>,
    timers: Timers,
    auto_dismiss: Duration,
    max_active: Option<usize>,
    next_id: AtomicU64,
}

/// Cheap to clone; clones share the same active set.
#[derive(Clone)]
pub struct NotificationQueue {
    shared: Arc<Shared>,
}

impl NotificationQueue {
    pub fn new(timers: Timers, renderer: Arc<dyn ViewRenderer>, auto_dismiss: Duration) -> Self {
        Self::build(timers, renderer, auto_dismiss, None)
    }

    /// Same as [`NotificationQueue::new`] but evicting the oldest
    /// notifications once more than `max_active` are showing.
    ///
    /// A cap of zero is treated as one.
    pub fn with_capacity(
        timers: Timers,
        renderer: Arc<dyn ViewRenderer>,
        auto_dismiss: Duration,
        max_active: usize,
    ) -> Self {
        Self::build(timers, renderer, auto_dismiss, Some(max_active.max(1)))
    }

    fn build(
        timers: Timers,
        renderer: Arc<dyn ViewRenderer>,
        auto_dismiss: Duration,
        max_active: Option<usize>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                active: Mutex::new(VecDeque::new()),
                renderer,
                timers,
                auto_dismiss,
                max_active,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn auto_dismiss(&self) -> Duration {
        self.shared.auto_dismiss
    }

    pub fn enqueue(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let shared = &self.shared;
        let weak: Weak<Shared> = Arc::downgrade(shared);
        let mut active = shared.lock_active();

        // Allocated under the lock so ids follow render order
        let id = NotificationId(shared.next_id.fetch_add(1, Ordering::Relaxed));
        let notification = Notification::new(id, message, kind);

        let expiry = shared.timers.schedule(shared.auto_dismiss, move || {
            if let Some(shared) = weak.upgrade() {
                shared.remove(id, Removal::Expired);
            }
        });

        debug!(%id, %kind, "Notification enqueued");
        if let Err(e) = shared.renderer.render(&notification) {
            warn!(%id, "Failed to render notification: {}", e);
        }

        active.push_front(Entry {
            notification,
            expiry: Some(expiry),
        });

        if let Some(max) = shared.max_active {
            while active.len() > max {
                if let Some(oldest) = active.pop_back() {
                    shared.finish_removal(oldest, Removal::Evicted);
                }
            }
        }

        id
    }

    /// Remove a notification. Returns `false` if it was not active, in which
    /// case nothing happens.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.shared.remove(id, Removal::Manual)
    }

    /// Dismiss every active notification
    pub fn clear(&self) -> usize {
        let shared = &self.shared;
        let mut active = shared.lock_active();
        let count = active.len();
        while let Some(entry) = active.pop_front() {
            shared.finish_removal(entry, Removal::Cleared);
        }
        count
    }

    /// Snapshot of the active notifications, newest first
    pub fn active(&self) -> Vec<Notification> {
        self.shared
            .lock_active()
            .iter()
            .map(|entry| entry.notification.clone())
            .collect()
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.shared
            .lock_active()
            .iter()
            .any(|entry| entry.notification.id == id)
    }

    pub fn len(&self) -> usize {
        self.shared.lock_active().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Shared {
    fn lock_active(&self) -> MutexGuard<'_, VecDeque<Entry>> {
        // A panicking renderer cannot leave the deque half-updated
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: NotificationId, reason: Removal) -> bool {
        let mut active = self.lock_active();
        let Some(index) = active.iter().position(|entry| entry.notification.id == id) else {
            return false;
        };
        if let Some(entry) = active.remove(index) {
            self.finish_removal(entry, reason);
        }
        true
    }

    /// Called with the active set already updated and still locked, which
    /// keeps unrender calls in removal order.
    fn finish_removal(&self, entry: Entry, reason: Removal) {
        let id = entry.notification.id;
        if reason != Removal::Expired {
            if let Some(expiry) = &entry.expiry {
                expiry.cancel();
            }
        }
        debug!(%id, ?reason, "Notification removed");
        if let Err(e) = self.renderer.unrender(id) {
            warn!(%id, "Failed to unrender notification: {}", e);
        }
    }
}
