//! The seam between the core and whatever draws it
//!
//! The notification queue and the action guard only ever talk to a
//! [`ViewRenderer`]. Renderers are called while the caller holds its own
//! bookkeeping lock, so an implementation must not call back into the queue
//! or the guard.

use crate::error::RenderError;
use crate::events::{EventBus, UiEvent};
use crate::notification::{Notification, NotificationId};

pub type RenderResult = std::result::Result<(), RenderError>;

pub trait ViewRenderer: Send + Sync {
    fn render(&self, notification: &Notification) -> RenderResult;

    fn unrender(&self, id: NotificationId) -> RenderResult;

    fn show_busy_indicator(&self, text: &str) -> RenderResult;

    fn hide_busy_indicator(&self) -> RenderResult;
}

/// Renderer for headless use; every call succeeds and draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl ViewRenderer for NullRenderer {
    fn render(&self, _notification: &Notification) -> RenderResult {
        Ok(())
    }

    fn unrender(&self, _id: NotificationId) -> RenderResult {
        Ok(())
    }

    fn show_busy_indicator(&self, _text: &str) -> RenderResult {
        Ok(())
    }

    fn hide_busy_indicator(&self) -> RenderResult {
        Ok(())
    }
}

/// Renderer that publishes every view change on an [`EventBus`]
#[derive(Clone)]
pub struct EventRenderer {
    bus: EventBus,
}

impl EventRenderer {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl ViewRenderer for EventRenderer {
    fn render(&self, notification: &Notification) -> RenderResult {
        self.bus.emit(UiEvent::NotificationShown {
            notification: notification.clone(),
        });
        Ok(())
    }

    fn unrender(&self, id: NotificationId) -> RenderResult {
        self.bus.emit(UiEvent::NotificationRemoved { id });
        Ok(())
    }

    fn show_busy_indicator(&self, text: &str) -> RenderResult {
        self.bus.emit(UiEvent::BusyShown {
            text: text.to_string(),
        });
        Ok(())
    }

    fn hide_busy_indicator(&self) -> RenderResult {
        self.bus.emit(UiEvent::BusyHidden);
        Ok(())
    }
}
