//! Terminal view: notifications and the busy indicator go to stderr
//!
//! Every change is also published on an [`EventBus`] so the command loop
//! can wait on view changes instead of polling the queue.

use std::io::Write;

use libafhscout::error::RenderError;
use libafhscout::events::{EventBus, UiEvent};
use libafhscout::view::{RenderResult, ViewRenderer};
use libafhscout::{Notification, NotificationId, NotificationKind};

pub struct TerminalRenderer {
    bus: EventBus,
}

impl TerminalRenderer {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn write_line(&self, line: &str) -> RenderResult {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "{}", line).map_err(|e| RenderError(e.to_string()))
    }
}

fn tag(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Info => "[info]",
        NotificationKind::Success => "[ok]",
        NotificationKind::Warning => "[warn]",
        NotificationKind::Error => "[error]",
    }
}

impl ViewRenderer for TerminalRenderer {
    fn render(&self, notification: &Notification) -> RenderResult {
        self.write_line(&format!("{} {}", tag(notification.kind), notification.message))?;
        self.bus.emit(UiEvent::NotificationShown {
            notification: notification.clone(),
        });
        Ok(())
    }

    fn unrender(&self, id: NotificationId) -> RenderResult {
        tracing::debug!(%id, "Notification dismissed");
        self.bus.emit(UiEvent::NotificationRemoved { id });
        Ok(())
    }

    fn show_busy_indicator(&self, text: &str) -> RenderResult {
        self.write_line(&format!("... {}", text))?;
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
