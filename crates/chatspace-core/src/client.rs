//! Session lifecycle: connect, reconnect, send, and the event pump.

use chatspace_ws::{
    ConnectionState, LinkEvent, MessageKind, OutboundFrame, SessionConfig, SessionLink, Transport,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheRepository, CacheStats};
use crate::inbound::{ClientEvent, InboundQueue};
use crate::message::{Message, RecentChat};
use crate::notify::{Notification, NotificationBus};
use crate::roster::Roster;
use crate::store::MessageStore;
use crate::time::now_millis;
use crate::{Error, Result};

/// The chat session core.
///
/// Owns the socket session, the in-memory logs, the durable cache, and the
/// notification feed. All state mutation happens on the caller's task: the
/// caller invokes [`pump`](Self::pump) in a loop to advance the session, so
/// no locks are needed and frame handling is serialized by construction.
///
/// Generic over [`Transport`] so the session logic runs against a scripted
/// transport in tests.
pub struct ChatClient<T: Transport> {
    transport: T,
    config: SessionConfig,
    state: ConnectionState,
    attempts: u32,
    retry_at: Option<Instant>,
    link: Option<T::Link>,
    queue: InboundQueue,
    store: MessageStore,
    cache: CacheRepository,
    bus: NotificationBus,
    roster: Roster,
}

impl<T: Transport> std::fmt::Debug for ChatClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("state", &self.state)
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> ChatClient<T> {
    /// Creates a disconnected client.
    pub fn new(transport: T, config: SessionConfig, cache: CacheRepository) -> Self {
        Self {
            transport,
            config,
            state: ConnectionState::Disconnected,
            attempts: 0,
            retry_at: None,
            link: None,
            queue: InboundQueue::new(),
            store: MessageStore::new(),
            cache,
            bus: NotificationBus::new(),
            roster: Roster::new(),
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Opens the session.
    ///
    /// A missing auth token logs a warning and leaves the client
    /// disconnected. Calling while already connecting or connected is a
    /// no-op. A failed attempt schedules the first reconnect rather than
    /// returning an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the configured URL cannot be built.
    pub async fn connect(&mut self) -> Result<()> {
        if self.config.token.is_none() {
            warn!("no auth token configured, not connecting");
            return Ok(());
        }
        if self.state.is_active() {
            debug!(state = ?self.state, "connect ignored, session already active");
            return Ok(());
        }
        let url = self.config.configured_session_url()?;
        self.try_connect(&url).await;
        Ok(())
    }

    async fn try_connect(&mut self, url: &str) {
        self.state = ConnectionState::Connecting;
        match self.transport.connect(url).await {
            Ok(link) => {
                info!("session connected");
                self.link = Some(link);
                self.state = ConnectionState::Connected;
                self.attempts = 0;
                self.retry_at = None;
                self.cache.initialize().await;
            }
            Err(err) => {
                warn!(error = %err, "connect failed");
                self.schedule_reconnect();
            }
        }
    }

    /// Returns true when a retry was scheduled, false when the episode's
    /// attempts are exhausted.
    fn schedule_reconnect(&mut self) -> bool {
        if self.attempts >= self.config.max_reconnect_attempts {
            warn!(
                attempts = self.attempts,
                "reconnect attempts exhausted, going dormant"
            );
            self.state = ConnectionState::Disconnected;
            self.retry_at = None;
            self.bus.push(Notification::system(
                "connection lost, no longer retrying",
                now_millis(),
            ));
            return false;
        }
        let next = self.attempts + 1;
        info!(attempt = next, "scheduling reconnect");
        self.state = ConnectionState::Reconnecting(next);
        self.retry_at = Some(Instant::now() + self.config.reconnect_delay);
        true
    }

    /// Advances the session one step and returns the events it produced.
    ///
    /// While connected this awaits the next socket event; while a reconnect
    /// is pending it awaits the retry deadline. Returns immediately with no
    /// events when the session is dormant.
    pub async fn pump(&mut self) -> Vec<ClientEvent> {
        if let Some(retry_at) = self.retry_at {
            tokio::time::sleep_until(retry_at).await;
            self.retry_at = None;
            self.attempts += 1;
            let url = match self.config.configured_session_url() {
                Ok(url) => url,
                Err(err) => {
                    warn!(error = %err, "cannot build session url, going dormant");
                    self.state = ConnectionState::Disconnected;
                    return Vec::new();
                }
            };
            self.try_connect(&url).await;
            return match self.state {
                ConnectionState::Connected => vec![ClientEvent::Connected],
                ConnectionState::Disconnected => vec![ClientEvent::RetriesExhausted],
                _ => Vec::new(),
            };
        }

        let Some(link) = self.link.as_mut() else {
            return Vec::new();
        };
        match link.next().await {
            LinkEvent::Frame(raw) => {
                self.queue.enqueue(raw);
                self.queue
                    .drain(&mut self.store, &self.cache, &mut self.bus, &mut self.roster)
                    .await
            }
            LinkEvent::Closed { normal } => {
                self.link = None;
                if normal {
                    info!("session closed by peer");
                    self.state = ConnectionState::Disconnected;
                    vec![ClientEvent::Disconnected]
                } else {
                    warn!("session lost");
                    let will_retry = self.schedule_reconnect();
                    if will_retry {
                        vec![ClientEvent::ConnectionLost { will_retry }]
                    } else {
                        vec![
                            ClientEvent::ConnectionLost { will_retry },
                            ClientEvent::RetriesExhausted,
                        ]
                    }
                }
            }
        }
    }

    /// Sends a chat message and optimistically appends it to the local log.
    ///
    /// Fails immediately when the session is not connected; nothing is
    /// queued for later delivery. The durable mirror of the append is
    /// best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] without a session, or a transport
    /// error if the write fails.
    pub async fn send(&mut self, to_account: &str, content: &str) -> Result<()> {
        if !self.state.is_connected() {
            return Err(Error::NotConnected);
        }
        let Some(link) = self.link.as_mut() else {
            return Err(Error::NotConnected);
        };

        let frame = OutboundFrame {
            to_account: to_account.to_string(),
            content: content.to_string(),
            kind: MessageKind::ChatText,
        };
        link.send(frame.to_wire()?).await?;

        let message = Message::local(to_account, content, MessageKind::ChatText, now_millis());
        let log = self.store.append(to_account, message).to_vec();
        self.cache.write(to_account, &log).await;
        Ok(())
    }

    /// Closes the session deliberately: cancels any pending reconnect and
    /// sends a normal close. Idempotent.
    pub async fn disconnect(&mut self) {
        self.retry_at = None;
        self.attempts = 0;
        if let Some(mut link) = self.link.take() {
            link.close().await;
        }
        if self.state != ConnectionState::Disconnected {
            info!("session disconnected");
            self.state = ConnectionState::Disconnected;
        }
    }

    /// Full logout: disconnects and clears every transient structure. The
    /// durable cache is left untouched.
    pub async fn shutdown(&mut self) {
        self.disconnect().await;
        self.store.clear_all();
        self.queue = InboundQueue::new();
        self.bus = NotificationBus::new();
        self.roster = Roster::new();
    }

    /// Messages for a chat, hydrating an empty log from the durable cache.
    pub async fn messages(&mut self, chat_id: &str) -> &[Message] {
        if self.store.messages(chat_id).is_empty() {
            let cached = self.cache.read(chat_id).await;
            self.store.hydrate(chat_id, cached);
        }
        self.store.messages(chat_id)
    }

    /// Recent-chats view, newest first.
    #[must_use]
    pub fn recent_chats(&self) -> Vec<RecentChat> {
        self.store.recent_chats()
    }

    /// Unread count for a chat.
    #[must_use]
    pub fn unread_count(&self, chat_id: &str) -> u32 {
        self.store.unread_count(chat_id)
    }

    /// Marks a chat as the open conversation and clears its unread count.
    pub fn open_chat(&mut self, chat_id: &str) {
        self.store.open_chat(chat_id);
    }

    /// Clears the open conversation.
    pub fn close_chat(&mut self) {
        self.store.close_chat();
    }

    /// The notification feed.
    #[must_use]
    pub fn notifications(&self) -> &NotificationBus {
        &self.bus
    }

    /// Dismisses notifications stamped with the given timestamp.
    pub fn dismiss_notification(&mut self, timestamp: i64) {
        self.bus.dismiss(timestamp);
    }

    /// The online-friend roster.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Removes one chat's in-memory log. The durable cache entry is left
    /// in place, so a later [`messages`](Self::messages) call rehydrates
    /// from it.
    pub fn clear_chat(&mut self, chat_id: &str) {
        self.store.clear(chat_id);
    }

    /// Removes one chat's durable cache entry.
    pub async fn clear_chat_cache(&mut self, chat_id: &str) {
        self.cache.clear(chat_id).await;
    }

    /// Removes all history from memory and durable storage.
    pub async fn clear_all(&mut self) {
        self.store.clear_all();
        self.cache.clear_all().await;
    }

    /// Durable cache statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}
