//! In-memory per-chat message logs and derived views.

use std::collections::BTreeMap;

use crate::message::{Message, RecentChat};
use crate::policy::cap_to_recent;

/// In-memory cap on each chat log.
pub const MAX_MESSAGES_PER_CHAT: usize = 1000;

/// Per-chat message logs with explicit unread tracking.
///
/// Logs are append-only and capped at [`MAX_MESSAGES_PER_CHAT`]; the oldest
/// entries drop silently on overflow. Derived views (`recent_chats`, unread
/// counts) are pull-based queries over the canonical maps, recomputed on
/// demand.
#[derive(Debug, Default)]
pub struct MessageStore {
    logs: BTreeMap<String, Vec<Message>>,
    unread: BTreeMap<String, u32>,
    active_chat: Option<String>,
}

impl MessageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to the chat's log and returns the updated log so
    /// the caller can mirror it to durable storage (best-effort; a mirror
    /// failure never rolls back the append).
    ///
    /// A received (non-self) message increments the chat's unread count
    /// unless that chat is the active conversation.
    pub fn append(&mut self, chat_id: &str, message: Message) -> &[Message] {
        let counts_as_unread =
            !message.is_local() && self.active_chat.as_deref() != Some(chat_id);
        if counts_as_unread {
            *self.unread.entry(chat_id.to_string()).or_insert(0) += 1;
        }

        let log = self.logs.entry(chat_id.to_string()).or_default();
        log.push(message);
        cap_to_recent(log, MAX_MESSAGES_PER_CHAT);
        log
    }

    /// Messages for a chat, oldest first. Empty if the chat has no log.
    #[must_use]
    pub fn messages(&self, chat_id: &str) -> &[Message] {
        self.logs.get(chat_id).map_or(&[], Vec::as_slice)
    }

    /// Loads cached history into a chat whose log is absent or empty.
    /// Does not touch unread counts.
    pub fn hydrate(&mut self, chat_id: &str, mut messages: Vec<Message>) {
        if !self.messages(chat_id).is_empty() || messages.is_empty() {
            return;
        }
        cap_to_recent(&mut messages, MAX_MESSAGES_PER_CHAT);
        self.logs.insert(chat_id.to_string(), messages);
    }

    /// One row per chat with a non-empty log, sorted descending by the time
    /// of its newest message. Ties keep a stable order (by chat id).
    #[must_use]
    pub fn recent_chats(&self) -> Vec<RecentChat> {
        let mut chats: Vec<RecentChat> = self
            .logs
            .iter()
            .filter_map(|(chat_id, log)| {
                let last = log.last()?;
                Some(RecentChat {
                    chat_id: chat_id.clone(),
                    last_message: last.content.clone(),
                    last_time: last.time,
                    kind: last.kind,
                })
            })
            .collect();
        // stable sort; BTreeMap iteration fixes the tie order
        chats.sort_by(|a, b| b.last_time.cmp(&a.last_time));
        chats
    }

    /// Unread count for a chat.
    #[must_use]
    pub fn unread_count(&self, chat_id: &str) -> u32 {
        self.unread.get(chat_id).copied().unwrap_or(0)
    }

    /// All non-zero unread counts.
    #[must_use]
    pub fn unread_counts(&self) -> &BTreeMap<String, u32> {
        &self.unread
    }

    /// Marks a chat as the active conversation and clears its unread count.
    pub fn open_chat(&mut self, chat_id: &str) {
        self.active_chat = Some(chat_id.to_string());
        self.unread.remove(chat_id);
    }

    /// Clears the active conversation.
    pub fn close_chat(&mut self) {
        self.active_chat = None;
    }

    /// The currently open conversation, if any.
    #[must_use]
    pub fn active_chat(&self) -> Option<&str> {
        self.active_chat.as_deref()
    }

    /// Removes the in-memory log for one chat. Durable cache untouched.
    pub fn clear(&mut self, chat_id: &str) {
        self.logs.remove(chat_id);
    }

    /// Resets every in-memory map. The caller clears durable storage.
    pub fn clear_all(&mut self) {
        self.logs.clear();
        self.unread.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatspace_ws::MessageKind;

    fn msg(from: &str, content: &str, time: i64, id: &str) -> Message {
        Message::received(from, content, MessageKind::ChatText, time, id, time)
    }

    #[test]
    fn test_append_preserves_send_order() {
        let mut store = MessageStore::new();
        for (i, body) in ["one", "two", "three"].iter().enumerate() {
            let message = Message::local("bob", *body, MessageKind::ChatText, i as i64);
            store.append("bob", message);
        }
        let log = store.messages("bob");
        assert_eq!(log.len(), 3);
        let bodies: Vec<&str> = log.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_log_capped_at_most_recent_1000() {
        let mut store = MessageStore::new();
        for i in 0..1200 {
            store.append("alice", msg("alice", &format!("m{i}"), i, &format!("id-{i}")));
        }
        let log = store.messages("alice");
        assert_eq!(log.len(), MAX_MESSAGES_PER_CHAT);
        assert_eq!(log[0].content, "m200");
        assert_eq!(log[999].content, "m1199");
    }

    #[test]
    fn test_unread_counting() {
        let mut store = MessageStore::new();
        store.append("alice", msg("alice", "a", 1, "i1"));
        store.append("alice", msg("alice", "b", 2, "i2"));
        assert_eq!(store.unread_count("alice"), 2);

        // self-originated messages never count
        store.append("alice", Message::local("alice", "mine", MessageKind::ChatText, 3));
        assert_eq!(store.unread_count("alice"), 2);

        // opening clears, and the active chat stops accumulating
        store.open_chat("alice");
        assert_eq!(store.unread_count("alice"), 0);
        store.append("alice", msg("alice", "c", 4, "i3"));
        assert_eq!(store.unread_count("alice"), 0);

        // other chats still accumulate
        store.append("bob", msg("bob", "hey", 5, "i4"));
        assert_eq!(store.unread_count("bob"), 1);

        store.close_chat();
        store.append("alice", msg("alice", "d", 6, "i5"));
        assert_eq!(store.unread_count("alice"), 1);
    }

    #[test]
    fn test_recent_chats_sorted_descending() {
        let mut store = MessageStore::new();
        store.append("alice", msg("alice", "old", 10, "i1"));
        store.append("bob", msg("bob", "new", 30, "i2"));
        store.append("carol", msg("carol", "mid", 20, "i3"));

        let recent = store.recent_chats();
        let order: Vec<&str> = recent.iter().map(|c| c.chat_id.as_str()).collect();
        assert_eq!(order, vec!["bob", "carol", "alice"]);
        assert_eq!(recent[0].last_message, "new");
    }

    #[test]
    fn test_recent_chats_tie_order_stable() {
        let mut store = MessageStore::new();
        store.append("zeta", msg("zeta", "z", 10, "i1"));
        store.append("alpha", msg("alpha", "a", 10, "i2"));
        let first: Vec<String> = store.recent_chats().into_iter().map(|c| c.chat_id).collect();
        let second: Vec<String> = store.recent_chats().into_iter().map(|c| c.chat_id).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_hydrate_only_fills_empty_logs() {
        let mut store = MessageStore::new();
        store.hydrate("alice", vec![msg("alice", "cached", 1, "c1")]);
        assert_eq!(store.messages("alice").len(), 1);
        // unread untouched by hydration
        assert_eq!(store.unread_count("alice"), 0);

        store.hydrate("alice", vec![msg("alice", "other", 2, "c2")]);
        assert_eq!(store.messages("alice")[0].content, "cached");
    }

    #[test]
    fn test_clear_is_memory_only_and_scoped() {
        let mut store = MessageStore::new();
        store.append("alice", msg("alice", "a", 1, "i1"));
        store.append("bob", msg("bob", "b", 2, "i2"));
        store.clear("alice");
        assert!(store.messages("alice").is_empty());
        assert_eq!(store.messages("bob").len(), 1);

        store.clear_all();
        assert!(store.messages("bob").is_empty());
        assert_eq!(store.unread_count("bob"), 0);
    }
}
