//! Message data model.

use chatspace_ws::MessageKind;
use serde::{Deserialize, Serialize};

/// Reserved sender value marking locally-originated messages.
///
/// Distinct from any real account; local messages are appended after a
/// successful send, before/without server confirmation, and their ids are
/// never fed to the deduplicator.
pub const LOCAL_SENDER: &str = "me";

/// One chat message, received or locally originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Sender account, or [`LOCAL_SENDER`].
    pub from_account: String,
    /// Recipient account, set only on locally-originated messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account: Option<String>,
    /// Message body.
    pub content: String,
    /// Message type.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Message time in epoch milliseconds.
    pub time: i64,
    /// Unique id within the dedup window; best-effort elsewhere.
    pub id: String,
    /// Local receipt time in epoch milliseconds.
    #[serde(default)]
    pub received_at: i64,
}

impl Message {
    /// Builds a received message.
    #[must_use]
    pub fn received(
        from_account: impl Into<String>,
        content: impl Into<String>,
        kind: MessageKind,
        time: i64,
        id: impl Into<String>,
        received_at: i64,
    ) -> Self {
        Self {
            from_account: from_account.into(),
            to_account: None,
            content: content.into(),
            kind,
            time,
            id: id.into(),
            received_at,
        }
    }

    /// Builds a locally-originated message for an outbound send.
    #[must_use]
    pub fn local(to_account: impl Into<String>, content: impl Into<String>, kind: MessageKind, now: i64) -> Self {
        Self {
            from_account: LOCAL_SENDER.to_string(),
            to_account: Some(to_account.into()),
            content: content.into(),
            kind,
            time: now,
            id: format!("{LOCAL_SENDER}-{now}"),
            received_at: now,
        }
    }

    /// Returns true for locally-originated messages.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.from_account == LOCAL_SENDER
    }
}

/// One row of the recent-chats derived view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentChat {
    /// Conversation partner account.
    pub chat_id: String,
    /// Body of the newest message.
    pub last_message: String,
    /// Time of the newest message, epoch milliseconds.
    pub last_time: i64,
    /// Type of the newest message.
    pub kind: MessageKind,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_local_message_marking() {
        let msg = Message::local("bob", "hi", MessageKind::ChatText, 1000);
        assert!(msg.is_local());
        assert_eq!(msg.id, "me-1000");
        assert_eq!(msg.to_account.as_deref(), Some("bob"));

        let received =
            Message::received("alice", "yo", MessageKind::ChatText, 2000, "m1", 2001);
        assert!(!received.is_local());
    }

    #[test]
    fn test_serde_round_trip_uses_wire_kind() {
        let msg = Message::received("alice", "yo", MessageKind::ChatText, 2000, "m1", 2001);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"00""#));
        assert!(!json.contains("to_account"));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
