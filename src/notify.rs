//! User-facing notifications (toasts)
//!
//! Stores report outcomes here instead of returning errors to the view. A
//! consumer subscribes and renders whatever arrives; persistent toasts stay up
//! until something dismisses them by id.

use crate::ringbuf::RingBuffer;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;
const HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub message: String,
    /// Stays visible until dismissed
    pub persistent: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Shown(Toast),
    Dismissed(Uuid),
}

/// Toast bus shared by every store
///
/// Cheaply cloneable.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<NotificationEvent>,
    history: Arc<RingBuffer<Toast>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            history: Arc::new(RingBuffer::new(HISTORY_CAPACITY)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.tx.subscribe()
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.push(ToastLevel::Info, message.into(), false)
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.push(ToastLevel::Success, message.into(), false)
    }

    pub fn error(&self, message: impl Into<String>) -> Uuid {
        self.push(ToastLevel::Error, message.into(), false)
    }

    /// Error toast that is not dismissable by the user
    pub fn persistent_error(&self, message: impl Into<String>) -> Uuid {
        self.push(ToastLevel::Error, message.into(), true)
    }

    pub fn dismiss(&self, id: Uuid) {
        let _ = self.tx.send(NotificationEvent::Dismissed(id));
    }

    /// Most recent toasts, oldest first
    pub fn history(&self) -> Vec<Toast> {
        self.history.items()
    }

    /// True if a toast with exactly this message was shown recently
    pub fn was_shown(&self, message: &str) -> bool {
        self.history.any(|t| t.message == message)
    }

    fn push(&self, level: ToastLevel, message: String, persistent: bool) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            level,
            message,
            persistent,
        };
        let id = toast.id;

        debug!(?level, message = %toast.message, "toast");
        self.history.push(toast.clone());
        // No receivers is fine: the history still records it.
        let _ = self.tx.send(NotificationEvent::Shown(toast));

        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notifier_broadcasts_toasts() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        let id = notifier.success("Warning created");

        match rx.recv().await.unwrap() {
            NotificationEvent::Shown(toast) => {
                assert_eq!(toast.id, id);
                assert_eq!(toast.level, ToastLevel::Success);
                assert_eq!(toast.message, "Warning created");
                assert!(!toast.persistent);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_notifier_dismiss() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        let id = notifier.persistent_error("connection lost");
        notifier.dismiss(id);

        assert!(matches!(rx.recv().await.unwrap(), NotificationEvent::Shown(t) if t.persistent));
        assert_eq!(rx.recv().await.unwrap(), NotificationEvent::Dismissed(id));
    }

    #[test]
    fn test_notifier_history_without_subscribers() {
        let notifier = Notifier::new();
        notifier.error("Could not get servers");
        notifier.info("hello");

        let history = notifier.history();
        assert_eq!(history.len(), 2);
        assert!(notifier.was_shown("Could not get servers"));
        assert!(!notifier.was_shown("Could not get stats"));
    }
}
