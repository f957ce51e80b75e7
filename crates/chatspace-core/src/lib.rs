//! # chatspace-core
//!
//! Message-delivery core for the chatspace client.
//!
//! This crate provides:
//! - Session lifecycle with fixed-delay reconnection ([`ChatClient`])
//! - Serialized inbound-frame dispatch with deduplication
//! - Bounded in-memory per-chat logs with unread tracking
//! - A bounded, expiring durable cache (`SQLite`)
//! - Online-friend roster and a capped notification feed
//!
//! The embedding application drives the session: call
//! [`ChatClient::connect`], then loop on [`ChatClient::pump`] to receive
//! [`ClientEvent`]s. All mutation happens on that single control flow.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
mod client;
mod dedup;
mod error;
mod inbound;
pub mod message;
mod notify;
mod policy;
mod roster;
mod store;
mod time;

pub use cache::{CacheRepository, CacheStats};
pub use client::ChatClient;
pub use dedup::{DEDUP_CAPACITY, Deduplicator};
pub use error::{Error, Result};
pub use inbound::{ClientEvent, InboundQueue};
pub use message::{LOCAL_SENDER, Message, RecentChat};
pub use notify::{NOTIFICATION_LOG_CAP, Notification, NotificationBus, NotificationKind};
pub use roster::{FriendStatusUpdate, Roster, STATUS_LOG_CAP};
pub use store::{MAX_MESSAGES_PER_CHAT, MessageStore};
