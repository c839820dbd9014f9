//! Cancellable one-shot timers on the tokio runtime
//!
//! A [`TimerHandle`] is the only way to reach a scheduled callback. The
//! callback runs at most once: whichever of "deadline reached" and
//! [`TimerHandle::cancel`] wins the state transition decides whether it runs.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::error::{Result, ScoutError};

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Schedules delayed callbacks on a tokio runtime
#[derive(Clone)]
pub struct Timers {
    runtime: Handle,
    next_id: Arc<AtomicU64>,
}

impl Timers {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Bind to the runtime the caller is running on
    ///
    /// # Errors
    ///
    /// Returns [`ScoutError::Runtime`] when called outside a tokio runtime.
    pub fn current() -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| ScoutError::Runtime(e.to_string()))?;
        Ok(Self::new(runtime))
    }

    /// Run `callback` once `delay` has elapsed, unless cancelled first.
    ///
    /// The deadline is taken now, not when the runtime first polls the
    /// timer task. Dropping the returned handle does not cancel the timer.
    pub fn schedule<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + delay;
        let state = Arc::new(AtomicU8::new(PENDING));

        let task_state = Arc::clone(&state);
        let task = self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if task_state
                .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                tracing::trace!(timer_id = id, "Timer fired");
                callback();
            }
        });

        TimerHandle {
            id,
            state,
            abort: task.abort_handle(),
        }
    }
}

/// Handle to a scheduled callback
#[derive(Debug)]
pub struct TimerHandle {
    id: u64,
    state: Arc<AtomicU8>,
    abort: AbortHandle,
}

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cancel the timer.
    ///
    /// Returns `true` if this call prevented the callback from running,
    /// `false` if it had already fired or been cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if cancelled {
            self.abort.abort();
            tracing::trace!(timer_id = self.id, "Timer cancelled");
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.state.load(Ordering::Acquire) == PENDING
    }

    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }
}
