//! Durable message cache storage repository.

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::warn;

use super::model::{CacheMetadata, CacheStats, ChatCacheEntry, MessageCache};
use crate::message::Message;
use crate::policy::{evict_least_recent, evict_oldest_fraction};
use crate::time::now_millis;
use crate::Result;

/// Messages kept per chat in the durable cache.
pub const CACHE_MESSAGES_PER_CHAT: usize = 200;
/// Chats kept in the durable cache before least-recent eviction.
pub const CACHE_MAX_CHATS: usize = 50;
/// Entries untouched for longer than this are expired.
pub const CACHE_EXPIRY_MS: i64 = 7 * 24 * 60 * 60 * 1000;
/// Minimum interval between automatic expiry sweeps.
pub const SWEEP_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

/// Fraction of chats dropped when a write fails on a full store.
const PRESSURE_EVICT_FRACTION: f64 = 0.25;

const KEY_MESSAGES: &str = "message_cache";
const KEY_METADATA: &str = "cache_metadata";

/// Repository for the durable message cache.
///
/// The cache is two opaque JSON records in a key-value table: the per-chat
/// message map and its maintenance metadata. Storage failures degrade to
/// warnings; the in-memory session is the source of truth and never blocks
/// on the cache.
pub struct CacheRepository {
    pool: Option<SqlitePool>,
    // number of upcoming saves forced to fail, for storage-pressure tests
    #[cfg(test)]
    fail_saves: std::cell::Cell<u32>,
}

impl CacheRepository {
    fn with_pool(pool: Option<SqlitePool>) -> Self {
        Self {
            pool,
            #[cfg(test)]
            fail_saves: std::cell::Cell::new(0),
        }
    }

    /// Create a new repository with the given database path.
    ///
    /// Creates the database and schema if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self::with_pool(Some(pool));
        repo.ensure_schema().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self::with_pool(Some(pool));
        repo.ensure_schema().await?;
        Ok(repo)
    }

    /// Create a repository with no backing storage.
    ///
    /// Every operation is a no-op; reads return empty. Used when durable
    /// storage is unavailable and the session runs memory-only.
    #[must_use]
    pub fn disabled() -> Self {
        Self::with_pool(None)
    }

    /// Whether a backing store is attached.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn ensure_schema(&self) -> Result<()> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS cache_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            ",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Run startup maintenance: sweep expired entries if the last sweep is
    /// older than [`SWEEP_INTERVAL_MS`].
    pub async fn initialize(&self) {
        self.initialize_at(now_millis()).await;
    }

    async fn initialize_at(&self, now: i64) {
        let metadata = match self.load_metadata().await {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(error = %err, "cache metadata unreadable, skipping sweep");
                return;
            }
        };
        if now - metadata.last_cleanup >= SWEEP_INTERVAL_MS {
            self.sweep_at(now).await;
        }
    }

    /// Mirror a chat's log to durable storage, keeping only the most recent
    /// [`CACHE_MESSAGES_PER_CHAT`] messages. A full store evicts its
    /// least-recently-updated chats first; the chat being written is never
    /// the eviction victim. Failures are logged and dropped.
    pub async fn write(&self, chat_id: &str, messages: &[Message]) {
        self.write_at(chat_id, messages, now_millis()).await;
    }

    async fn write_at(&self, chat_id: &str, messages: &[Message], now: i64) {
        if self.pool.is_none() {
            return;
        }
        let mut cache = match self.load_cache().await {
            Ok(cache) => cache,
            Err(err) => {
                warn!(error = %err, chat_id, "cache unreadable, dropping write");
                return;
            }
        };

        let start = messages.len().saturating_sub(CACHE_MESSAGES_PER_CHAT);
        let recent = messages[start..].to_vec();
        let entry = ChatCacheEntry {
            message_count: recent.len(),
            messages: recent,
            last_updated: now,
        };
        cache.insert(chat_id.to_string(), entry);

        let evicted = evict_least_recent(&mut cache, CACHE_MAX_CHATS, Some(chat_id), |e| {
            e.last_updated
        });
        if !evicted.is_empty() {
            warn!(count = evicted.len(), "evicted least-recent chats from cache");
        }

        if let Err(err) = self.save_cache(&cache).await {
            warn!(error = %err, chat_id, "cache write failed, evicting and retrying");
            let dropped =
                evict_oldest_fraction(&mut cache, PRESSURE_EVICT_FRACTION, |e| e.last_updated);
            warn!(count = dropped.len(), "dropped oldest chats under storage pressure");
            if let Err(err) = self.save_cache(&cache).await {
                warn!(error = %err, chat_id, "cache write failed after eviction, dropping");
            }
        }
    }

    /// Cached messages for a chat, oldest first. An expired entry is
    /// deleted on read and an empty history returned. Failures are logged
    /// and read as empty.
    pub async fn read(&self, chat_id: &str) -> Vec<Message> {
        self.read_at(chat_id, now_millis()).await
    }

    async fn read_at(&self, chat_id: &str, now: i64) -> Vec<Message> {
        if self.pool.is_none() {
            return Vec::new();
        }
        let mut cache = match self.load_cache().await {
            Ok(cache) => cache,
            Err(err) => {
                warn!(error = %err, chat_id, "cache unreadable, reading as empty");
                return Vec::new();
            }
        };
        let Some(entry) = cache.get(chat_id) else {
            return Vec::new();
        };

        if now - entry.last_updated > CACHE_EXPIRY_MS {
            cache.remove(chat_id);
            if let Err(err) = self.save_cache(&cache).await {
                warn!(error = %err, chat_id, "failed to delete expired cache entry");
            }
            return Vec::new();
        }

        cache
            .remove(chat_id)
            .map(|entry| entry.messages)
            .unwrap_or_default()
    }

    /// Delete every entry older than [`CACHE_EXPIRY_MS`] and record the
    /// sweep time.
    pub async fn sweep(&self) {
        self.sweep_at(now_millis()).await;
    }

    async fn sweep_at(&self, now: i64) {
        if self.pool.is_none() {
            return;
        }
        let mut cache = match self.load_cache().await {
            Ok(cache) => cache,
            Err(err) => {
                warn!(error = %err, "cache unreadable, skipping sweep");
                return;
            }
        };
        let before = cache.len();
        cache.retain(|_, entry| now - entry.last_updated <= CACHE_EXPIRY_MS);
        if cache.len() < before {
            tracing::debug!(removed = before - cache.len(), "swept expired cache entries");
        }

        if let Err(err) = self.save_cache(&cache).await {
            warn!(error = %err, "failed to persist cache sweep");
            return;
        }
        if let Err(err) = self.save_metadata(CacheMetadata { last_cleanup: now }).await {
            warn!(error = %err, "failed to record sweep time");
        }
    }

    /// Remove one chat from the durable cache.
    pub async fn clear(&self, chat_id: &str) {
        if self.pool.is_none() {
            return;
        }
        let mut cache = match self.load_cache().await {
            Ok(cache) => cache,
            Err(err) => {
                warn!(error = %err, chat_id, "cache unreadable, skipping clear");
                return;
            }
        };
        if cache.remove(chat_id).is_some()
            && let Err(err) = self.save_cache(&cache).await
        {
            warn!(error = %err, chat_id, "failed to persist chat clear");
        }
    }

    /// Remove every cached chat and reset maintenance metadata.
    pub async fn clear_all(&self) {
        let Some(pool) = &self.pool else {
            return;
        };
        if let Err(err) = sqlx::query("DELETE FROM cache_store").execute(pool).await {
            warn!(error = %err, "failed to clear cache");
        }
    }

    /// Point-in-time cache statistics.
    pub async fn stats(&self) -> CacheStats {
        if self.pool.is_none() {
            return CacheStats::default();
        }
        let raw = self.load_value(KEY_MESSAGES).await.ok().flatten();
        let cache_size = raw.as_ref().map_or(0, String::len);
        let cache: MessageCache = raw
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        let metadata = self.load_metadata().await.unwrap_or_default();
        CacheStats {
            chat_count: cache.len(),
            message_count: cache.values().map(|e| e.message_count).sum(),
            cache_size,
            last_cleanup: metadata.last_cleanup,
        }
    }

    async fn load_cache(&self) -> Result<MessageCache> {
        match self.load_value(KEY_MESSAGES).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(MessageCache::new()),
        }
    }

    async fn save_cache(&self, cache: &MessageCache) -> Result<()> {
        self.save_value(KEY_MESSAGES, &serde_json::to_string(cache)?)
            .await
    }

    async fn load_metadata(&self) -> Result<CacheMetadata> {
        match self.load_value(KEY_METADATA).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(CacheMetadata::default()),
        }
    }

    async fn save_metadata(&self, metadata: CacheMetadata) -> Result<()> {
        self.save_value(KEY_METADATA, &serde_json::to_string(&metadata)?)
            .await
    }

    async fn load_value(&self, key: &str) -> Result<Option<String>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };
        let row = sqlx::query("SELECT value FROM cache_store WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|row| row.get("value")))
    }

    async fn save_value(&self, key: &str, value: &str) -> Result<()> {
        let Some(pool) = &self.pool else {
            return Ok(());
        };
        #[cfg(test)]
        {
            let remaining = self.fail_saves.get();
            if remaining > 0 {
                self.fail_saves.set(remaining - 1);
                return Err(sqlx::Error::PoolClosed.into());
            }
        }
        sqlx::query(
            r"
            INSERT INTO cache_store (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }
}

impl std::fmt::Debug for CacheRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheRepository")
            .field("enabled", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}
