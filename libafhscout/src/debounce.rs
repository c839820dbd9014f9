//! Trailing-edge debounce
//!
//! ```no_run
//! # async fn example() -> libafhscout::Result<()> {
//! use std::time::Duration;
//! use libafhscout::debounce::Debouncer;
//! use libafhscout::timer::Timers;
//!
//! let search = Debouncer::new(Timers::current()?, Duration::from_millis(300), |query: String| {
//!     println!("searching for {query}");
//! });
//! search.call("ke".to_string());
//! search.call("kent".to_string()); // only this one runs, 300ms from now
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::timer::{TimerHandle, Timers};

struct Inner<A> {
    timers: Timers,
    wait: Duration,
    func: Box<dyn Fn(A) + Send + Sync>,
    pending: Mutex<Option<TimerHandle>>,
    /// Bumped on every call and cancel; a timer only invokes `func` if its
    /// generation is still current.
    generation: AtomicU64,
}

/// Cheap to clone; clones debounce together.
pub struct Debouncer<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for Debouncer<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(timers: Timers, wait: Duration, func: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                timers,
                wait,
                func: Box::new(func),
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn wait(&self) -> Duration {
        self.inner.wait
    }

    /// Replace any pending invocation with one carrying `args`, due `wait`
    /// from now.
    pub fn call(&self, args: A) {
        let mut pending = self.inner.lock_pending();
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(previous) = pending.take() {
            previous.cancel();
        }

        let inner = Arc::clone(&self.inner);
        *pending = Some(self.inner.timers.schedule(self.inner.wait, move || {
            if inner.generation.load(Ordering::Acquire) == generation {
                (inner.func)(args);
            }
        }));
    }

    /// Drop the pending invocation, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let mut pending = self.inner.lock_pending();
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        pending.take().is_some_and(|handle| handle.cancel())
    }

    pub fn is_pending(&self) -> bool {
        self.inner
            .lock_pending()
            .as_ref()
            .is_some_and(TimerHandle::is_pending)
    }
}

impl<A> Inner<A> {
    fn lock_pending(&self) -> MutexGuard<'_, Option<TimerHandle>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
