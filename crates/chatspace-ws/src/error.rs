//! Error types for the wire/transport library.

use thiserror::Error;

use crate::frame::FrameError;

/// Errors that can occur at the connection and protocol layer.
#[derive(Debug, Error)]
pub enum Error {
    /// WebSocket transport failure (handshake, I/O, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Malformed or unrecognized inbound frame.
    #[error("protocol error: {0}")]
    Protocol(#[from] FrameError),

    /// Outbound frame could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The session endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// No auth token is available to open a session.
    #[error("no auth token available")]
    NoToken,

    /// The link was used after it was closed.
    #[error("connection closed")]
    Closed,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
