//! # chatspace-ws
//!
//! Wire protocol and socket transport for the chatspace client core.
//!
//! The server speaks JSON frames over a single persistent WebSocket opened
//! against a fixed endpoint path, with the auth token passed as a query
//! parameter at connect time. This crate provides:
//!
//! - **Frame codec**: tagged-variant decoding of inbound frames (`"00"`
//!   chat text, `"02"` friend login/logout, `"04"` online roster, plus the
//!   `{code, msg}` error envelope), rejecting unknown variants with a
//!   distinguishable [`FrameError`]
//! - **Session configuration**: builder-style [`SessionConfig`] with the
//!   fixed reconnect policy (3000 ms delay, 5 attempts)
//! - **Transport seam**: [`Transport`]/[`SessionLink`] traits with a
//!   tokio-tungstenite implementation, so session logic is testable against
//!   a scripted transport

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod error;
pub mod frame;
mod state;
pub mod transport;

pub use config::{
    CHAT_ENDPOINT, DEFAULT_BASE_URL, MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY, SessionConfig,
};
pub use error::{Error, Result};
pub use frame::{FrameError, InboundFrame, MessageKind, OutboundFrame, SUCCESS_CODE};
pub use state::ConnectionState;
pub use transport::{LinkEvent, SessionLink, Transport, WsLink, WsTransport};
