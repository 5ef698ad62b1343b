//! Transient notices
//!
//! Short-lived messages for whoever renders the application: success
//! confirmations, failure notices and pop-ups for newly arrived
//! notifications. Nothing here is persisted.

use crate::config::NOTICE_CHANNEL_CAPACITY;
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

/// Fan-out channel for notices
#[derive(Clone)]
pub struct NoticeBus {
    tx: broadcast::Sender<Notice>,
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new(NOTICE_CHANNEL_CAPACITY)
    }
}

impl NoticeBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn publish(&self, notice: Notice) {
        // No subscriber is not an error; the notice is simply dropped.
        let _ = self.tx.send(notice);
    }

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
        self.publish(Notice {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        });
    }

    pub fn failure(&self, title: impl Into<String>, description: impl Into<String>) {
        self.publish(Notice {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_notices() {
        let bus = NoticeBus::default();
        let mut rx = bus.subscribe();

        bus.success("Saved", "All good");
        bus.failure("Failed", "Nope");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.title, "Saved");
        assert_eq!(first.variant, NoticeVariant::Default);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.variant, NoticeVariant::Destructive);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = NoticeBus::new(4);
        bus.success("Nobody", "is listening");
    }
}
