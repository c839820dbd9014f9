//! Single-flight guard for user-triggered async actions
//!
//! The guard owns the busy indicator. It is shown when the first action
//! enters and hidden when the last one leaves, on every exit path: success,
//! failure, panic, or the `run` future being dropped before completion.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, ScoutError};
use crate::notification::NotificationKind;
use crate::queue::NotificationQueue;
use crate::view::ViewRenderer;

/// What to do with a call that arrives while another action is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyPolicy {
    /// Fail fast with [`ScoutError::Busy`]; the new action is never polled
    #[default]
    Reject,
    /// Let actions overlap; the indicator covers the whole busy period
    Overlap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    Busy,
}

/// User-facing text for one kind of guarded action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLabels {
    /// Shown next to the busy indicator
    pub busy_text: String,
    /// Body of the error notification raised when the action fails
    pub failure_message: String,
}

impl ActionLabels {
    pub fn new(busy_text: impl Into<String>, failure_message: impl Into<String>) -> Self {
        Self {
            busy_text: busy_text.into(),
            failure_message: failure_message.into(),
        }
    }
}

struct Shared {
    /// Number of actions currently in flight
    in_flight: Mutex<usize>,
    policy: ConcurrencyPolicy,
    renderer: Arc<dyn ViewRenderer>,
    notifications: NotificationQueue,
}

#[derive(Clone)]
pub struct ActionGuard {
    shared: Arc<Shared>,
}

impl ActionGuard {
    pub fn new(
        policy: ConcurrencyPolicy,
        renderer: Arc<dyn ViewRenderer>,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                in_flight: Mutex::new(0),
                policy,
                renderer,
                notifications,
            }),
        }
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.shared.policy
    }

    pub fn state(&self) -> GuardState {
        if self.in_flight() == 0 {
            GuardState::Idle
        } else {
            GuardState::Busy
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state() == GuardState::Busy
    }

    pub fn in_flight(&self) -> usize {
        *self.shared.lock_in_flight()
    }

    /// Run `action` under the guard.
    ///
    /// On failure an error notification with `labels.failure_message` is
    /// enqueued before [`ScoutError::ActionFailed`] is returned, so callers
    /// have nothing left to show the user.
    ///
    /// # Errors
    ///
    /// - [`ScoutError::Busy`] if the policy is `Reject` and an action is
    ///   already in flight.
    /// - [`ScoutError::ActionFailed`] if `action` resolved to an error.
    pub async fn run<F, T, E>(&self, labels: &ActionLabels, action: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: fmt::Display,
    {
        let scope = self.enter(&labels.busy_text)?;
        let outcome = action.await;
        drop(scope);

        outcome.map_err(|e| {
            // Surfaced to the user by the notification, not the log
            info!("{} failed: {}", labels.busy_text, e);
            self.shared
                .notifications
                .enqueue(labels.failure_message.clone(), NotificationKind::Error);
            ScoutError::ActionFailed(e.to_string())
        })
    }

    fn enter(&self, busy_text: &str) -> Result<BusyScope<'_>> {
        let shared = &*self.shared;
        let mut in_flight = shared.lock_in_flight();

        if *in_flight > 0 && shared.policy == ConcurrencyPolicy::Reject {
            debug!("Rejected '{}': another action is in flight", busy_text);
            return Err(ScoutError::Busy(busy_text.to_string()));
        }

        *in_flight += 1;
        if *in_flight == 1 {
            debug!("Guard busy: {}", busy_text);
            if let Err(e) = shared.renderer.show_busy_indicator(busy_text) {
                warn!("Failed to show busy indicator: {}", e);
            }
        }

        Ok(BusyScope { shared })
    }
}

impl Shared {
    fn lock_in_flight(&self) -> MutexGuard<'_, usize> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases one in-flight slot on drop
struct BusyScope<'a> {
    shared: &'a Shared,
}

impl Drop for BusyScope<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.shared.lock_in_flight();
        *in_flight = in_flight.saturating_sub(1);
        if *in_flight == 0 {
            debug!("Guard idle");
            if let Err(e) = self.shared.renderer.hide_busy_indicator() {
                warn!("Failed to hide busy indicator: {}", e);
            }
        }
    }
}
