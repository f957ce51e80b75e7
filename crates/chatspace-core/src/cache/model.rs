//! Cache data models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Durable snapshot of one chat's recent history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCacheEntry {
    /// Most recent messages, oldest first.
    pub messages: Vec<Message>,
    /// When this chat was last written, epoch milliseconds.
    pub last_updated: i64,
    /// Number of cached messages.
    pub message_count: usize,
}

/// The full durable cache, keyed by chat id.
pub type MessageCache = BTreeMap<String, ChatCacheEntry>;

/// Bookkeeping stored alongside the message cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When expired entries were last swept, epoch milliseconds.
    pub last_cleanup: i64,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached chats.
    pub chat_count: usize,
    /// Total cached messages across all chats.
    pub message_count: usize,
    /// Byte length of the stored message record.
    pub cache_size: usize,
    /// When expired entries were last swept, epoch milliseconds.
    pub last_cleanup: i64,
}
