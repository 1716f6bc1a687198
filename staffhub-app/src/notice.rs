//! User-facing notices
//!
//! Every surfaced error or confirmation becomes a [`Notice`] on a
//! broadcast channel; rendering (toast, status bar, log line) is the view
//! layer's concern. Nothing is dropped silently: services that fail
//! propagate their error AND the controllers emit a notice for it.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Cloneable sender side of the notice channel
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: broadcast::Sender<Notice>,
}

impl NoticeSender {
    /// Create a sender with room for `capacity` undelivered notices
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to notices; each receiver sees every notice sent after
    /// it subscribed
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Emit a success notice
    pub fn success(&self, message: impl Into<String>) {
        self.send(Notice::success(message));
    }

    /// Emit an error notice
    pub fn error(&self, message: impl Into<String>) {
        self.send(Notice::error(message));
    }

    fn send(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, message = %notice.message, "Notice");
        // No receivers is fine: headless callers still get the Result
        let _ = self.tx.send(notice);
    }
}

impl Default for NoticeSender {
    fn default() -> Self {
        Self::new(64)
    }
}
