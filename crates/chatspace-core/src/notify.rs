//! Bounded in-memory notification feed.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Notifications retained before the oldest drop off.
pub const NOTIFICATION_LOG_CAP: usize = 100;

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Server-reported error envelope.
    Error,
    /// Inbound chat message.
    Message,
    /// Friend went online or offline.
    FriendStatus,
    /// Client lifecycle event (connection lost, retries exhausted).
    System,
}

/// One entry in the notification feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Category of the event.
    pub kind: NotificationKind,
    /// Human-readable summary, when the event carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Originating account, for message and status notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Message body preview, for message notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Local receipt time in epoch milliseconds.
    pub timestamp: i64,
}

impl Notification {
    /// Builds an error notification from a server error envelope.
    #[must_use]
    pub fn error(message: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: Some(message.into()),
            from: None,
            content: None,
            timestamp,
        }
    }

    /// Builds a notification for an inbound chat message.
    #[must_use]
    pub fn message(from: impl Into<String>, content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: NotificationKind::Message,
            message: None,
            from: Some(from.into()),
            content: Some(content.into()),
            timestamp,
        }
    }

    /// Builds a friend status-change notification.
    #[must_use]
    pub fn friend_status(account: impl Into<String>, online: bool, timestamp: i64) -> Self {
        let account = account.into();
        let verb = if online { "logged in" } else { "logged out" };
        Self {
            kind: NotificationKind::FriendStatus,
            message: Some(format!("{account} {verb}")),
            from: Some(account),
            content: None,
            timestamp,
        }
    }

    /// Builds a client lifecycle notification.
    #[must_use]
    pub fn system(message: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: NotificationKind::System,
            message: Some(message.into()),
            from: None,
            content: None,
            timestamp,
        }
    }
}

/// Append-only notification log capped at [`NOTIFICATION_LOG_CAP`].
#[derive(Debug, Default)]
pub struct NotificationBus {
    entries: VecDeque<Notification>,
}

impl NotificationBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notification, dropping the oldest entry on overflow.
    pub fn push(&mut self, notification: Notification) {
        if self.entries.len() == NOTIFICATION_LOG_CAP {
            self.entries.pop_front();
        }
        self.entries.push_back(notification);
    }

    /// Removes entries stamped with the given timestamp. Removing an already
    /// dismissed notification is a no-op.
    pub fn dismiss(&mut self, timestamp: i64) {
        self.entries.retain(|n| n.timestamp != timestamp);
    }

    /// Current entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Number of retained notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no notifications are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_drops_oldest() {
        let mut bus = NotificationBus::new();
        for i in 0..150 {
            bus.push(Notification::system(format!("n{i}"), i));
        }
        assert_eq!(bus.len(), NOTIFICATION_LOG_CAP);
        let first = bus.entries().next().map(|n| n.timestamp);
        assert_eq!(first, Some(50));
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut bus = NotificationBus::new();
        bus.push(Notification::error("bad token", 10));
        bus.push(Notification::message("alice", "hi", 20));
        bus.dismiss(10);
        assert_eq!(bus.len(), 1);
        bus.dismiss(10);
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.entries().next().map(|n| n.timestamp), Some(20));
    }

    #[test]
    fn test_friend_status_wording() {
        let on = Notification::friend_status("bob", true, 5);
        assert_eq!(on.message.as_deref(), Some("bob logged in"));
        let off = Notification::friend_status("bob", false, 6);
        assert_eq!(off.message.as_deref(), Some("bob logged out"));
    }
}
