//! Serialized inbound frame queue and dispatch.

use std::collections::VecDeque;

use chatspace_ws::{FrameError, InboundFrame};
use tracing::{debug, warn};

use crate::cache::CacheRepository;
use crate::dedup::Deduplicator;
use crate::message::Message;
use crate::notify::{Notification, NotificationBus};
use crate::roster::Roster;
use crate::store::MessageStore;
use crate::time::{now_millis, server_time_to_millis};

/// Something the session surfaced to the embedding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The session reached the server.
    Connected,
    /// A new inbound message was appended to a chat log.
    MessageReceived {
        /// Chat the message belongs to.
        chat_id: String,
        /// The appended message.
        message: Message,
    },
    /// A friend's presence changed.
    FriendStatus {
        /// Account whose status changed.
        account: String,
        /// True when the friend came online.
        online: bool,
    },
    /// The full online roster was replaced.
    RosterReplaced {
        /// Number of accounts now online.
        count: usize,
    },
    /// The server reported a structured error.
    ServerError {
        /// Server error code.
        code: i64,
        /// Server error text.
        message: String,
    },
    /// The session dropped without a clean close.
    ConnectionLost {
        /// True when a reconnect attempt is scheduled.
        will_retry: bool,
    },
    /// Every reconnect attempt failed; the session is dormant.
    RetriesExhausted,
    /// The session was closed deliberately.
    Disconnected,
}

/// FIFO of raw inbound frames with fully serialized handling.
///
/// One drain pass processes each frame to completion, durable mirror
/// included, before the next frame starts. Malformed frames are logged and
/// dropped; duplicates are dropped with no mutation at all.
#[derive(Debug)]
pub struct InboundQueue {
    frames: VecDeque<String>,
    in_flight: bool,
    dedup: Deduplicator,
    fallback_seq: u64,
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InboundQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: VecDeque::new(),
            in_flight: false,
            dedup: Deduplicator::default(),
            fallback_seq: 0,
        }
    }

    /// Appends a raw frame for later processing.
    pub fn enqueue(&mut self, raw: String) {
        self.frames.push_back(raw);
    }

    /// Number of frames awaiting processing.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.frames.len()
    }

    /// Drains every queued frame in arrival order, applying each to the
    /// session state and collecting the resulting events. Returns empty
    /// immediately if a drain is already in flight.
    pub async fn drain(
        &mut self,
        store: &mut MessageStore,
        cache: &CacheRepository,
        bus: &mut NotificationBus,
        roster: &mut Roster,
    ) -> Vec<ClientEvent> {
        if self.in_flight {
            return Vec::new();
        }
        self.in_flight = true;

        let mut events = Vec::new();
        while let Some(raw) = self.frames.pop_front() {
            if let Some(event) = self.dispatch(&raw, store, cache, bus, roster).await {
                events.push(event);
            }
        }

        self.in_flight = false;
        events
    }

    async fn dispatch(
        &mut self,
        raw: &str,
        store: &mut MessageStore,
        cache: &CacheRepository,
        bus: &mut NotificationBus,
        roster: &mut Roster,
    ) -> Option<ClientEvent> {
        let frame = match InboundFrame::decode(raw) {
            Ok(frame) => frame,
            Err(err) => {
                log_decode_failure(&err, raw);
                return None;
            }
        };
        let received_at = now_millis();

        match frame {
            InboundFrame::ServerError { code, message } => {
                warn!(code, %message, "server reported an error");
                bus.push(Notification::error(message.clone(), received_at));
                Some(ClientEvent::ServerError { code, message })
            }
            InboundFrame::ChatText {
                from_account,
                content,
                time,
                message_id,
            } => {
                let time = server_time_to_millis(time, received_at);
                let id = match message_id {
                    Some(id) => id,
                    None => self.fallback_id(&from_account, time),
                };
                if !self.dedup.insert(&id) {
                    debug!(%id, "dropping duplicate message");
                    return None;
                }

                let message = Message::received(
                    from_account.clone(),
                    content.clone(),
                    chatspace_ws::MessageKind::ChatText,
                    time,
                    id,
                    received_at,
                );
                let log = store.append(&from_account, message.clone()).to_vec();
                cache.write(&from_account, &log).await;
                bus.push(Notification::message(&from_account, content, received_at));
                Some(ClientEvent::MessageReceived {
                    chat_id: from_account,
                    message,
                })
            }
            InboundFrame::FriendStatus {
                account,
                online,
                time,
            } => {
                let time = server_time_to_millis(time, received_at);
                roster.apply(&account, online, time);
                bus.push(Notification::friend_status(&account, online, received_at));
                Some(ClientEvent::FriendStatus { account, online })
            }
            InboundFrame::OnlineRoster { accounts, .. } => {
                let count = accounts.len();
                roster.replace_online(accounts);
                bus.push(Notification::system(
                    format!("{count} friends online"),
                    received_at,
                ));
                Some(ClientEvent::RosterReplaced { count })
            }
        }
    }

    /// Deterministic id for messages the server sent without one. Sender
    /// and timestamp alone can collide within the same millisecond, so a
    /// monotonic sequence disambiguates.
    fn fallback_id(&mut self, from_account: &str, time: i64) -> String {
        self.fallback_seq += 1;
        format!("{from_account}-{time}-{}", self.fallback_seq)
    }
}

fn log_decode_failure(err: &FrameError, raw: &str) {
    let preview: String = raw.chars().take(120).collect();
    warn!(error = %err, frame = %preview, "dropping malformed frame");
}
