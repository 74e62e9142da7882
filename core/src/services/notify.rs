// catalog_kit/src/services/notify.rs

//! User-facing notifications, injected wherever an operation has something to tell the user.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{event, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
  Info,
  Success,
  Warning,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
  pub level: NotificationLevel,
  pub message: String,
}

pub trait NotificationSink: Send + Sync {
  fn notify(&self, level: NotificationLevel, message: &str);
}

/// Forwards notifications to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
  fn notify(&self, level: NotificationLevel, message: &str) {
    match level {
      NotificationLevel::Info | NotificationLevel::Success => {
        event!(target: "catalog_kit::notify", Level::INFO, ?level, "{}", message)
      }
      NotificationLevel::Warning => event!(target: "catalog_kit::notify", Level::WARN, "{}", message),
      NotificationLevel::Error => event!(target: "catalog_kit::notify", Level::ERROR, "{}", message),
    }
  }
}

/// Queues notifications until a UI drains them.
///
/// Nothing expires on its own: a message stays queued until `drain` is called,
/// which is the UI acknowledging it.
#[derive(Debug, Default)]
pub struct MemoryNotificationSink {
  queue: Mutex<VecDeque<Notification>>,
}

impl MemoryNotificationSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn pending(&self) -> Vec<Notification> {
    self.queue.lock().iter().cloned().collect()
  }

  pub fn drain(&self) -> Vec<Notification> {
    self.queue.lock().drain(..).collect()
  }
}

impl NotificationSink for MemoryNotificationSink {
  fn notify(&self, level: NotificationLevel, message: &str) {
    self.queue.lock().push_back(Notification {
      level,
      message: message.to_string(),
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn memory_sink_keeps_messages_until_drained() {
    let sink = MemoryNotificationSink::new();
    sink.notify(NotificationLevel::Error, "no se pudo eliminar");
    sink.notify(NotificationLevel::Success, "producto actualizado");
    assert_eq!(sink.pending().len(), 2);
    let drained = sink.drain();
    assert_eq!(drained[0].level, NotificationLevel::Error);
    assert!(sink.pending().is_empty());
  }
}
