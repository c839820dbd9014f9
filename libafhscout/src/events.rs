//! In-process event bus for view updates
//!
//! The bus uses `tokio::sync::broadcast` so any number of views (terminal,
//! web front end, tests) can follow the same stream of UI changes.
//! Emitting never blocks: with no subscribers the event is dropped, and a
//! lagging subscriber loses the oldest events first.
//!
//! # Example
//!
//! ```
//! use libafhscout::events::{EventBus, UiEvent};
//!
//! let bus = EventBus::new(16);
//! let mut receiver = bus.subscribe();
//! bus.emit(UiEvent::BusyHidden);
//! assert!(matches!(receiver.try_recv(), Ok(UiEvent::BusyHidden)));
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::notification::{Notification, NotificationId};

pub type EventReceiver = broadcast::Receiver<UiEvent>;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<UiEvent>,
}

impl EventBus {
    /// `capacity` is the number of events buffered per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: UiEvent) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Changes the core asks the view to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    NotificationShown { notification: Notification },
    NotificationRemoved { id: NotificationId },
    BusyShown { text: String },
    BusyHidden,
}
