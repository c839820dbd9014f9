//! AFH Property Scout - notification and action plumbing for the property
//! analysis dashboard
//!
//! The crate provides the parts of the dashboard with ordering and lifetime
//! rules: auto-expiring notifications, a single-flight guard for the
//! analysis request, trailing-edge debounce, and the timers beneath them.
//! Drawing is delegated to a [`view::ViewRenderer`].

pub mod analysis;
pub mod app;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod guard;
pub mod logging;
pub mod notification;
pub mod queue;
pub mod timer;
pub mod view;

// Re-export commonly used types
pub use app::ScoutApp;
pub use config::Config;
pub use error::{Result, ScoutError};
pub use guard::{ActionGuard, ConcurrencyPolicy, GuardState};
pub use notification::{Notification, NotificationId, NotificationKind};
pub use queue::NotificationQueue;
