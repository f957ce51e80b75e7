//! Durable message cache.
//!
//! Mirrors recent per-chat history to SQLite so conversations survive a
//! restart. The cache is strictly best-effort: storage failures degrade to
//! warnings and the in-memory session keeps working.

mod model;
mod repository;

pub use model::{CacheMetadata, CacheStats, ChatCacheEntry, MessageCache};
pub use repository::{
    CACHE_EXPIRY_MS, CACHE_MAX_CHATS, CACHE_MESSAGES_PER_CHAT, CacheRepository, SWEEP_INTERVAL_MS,
};
