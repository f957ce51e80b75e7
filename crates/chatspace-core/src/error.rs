//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection or protocol failure.
    #[error("connection error: {0}")]
    Ws(#[from] chatspace_ws::Error),

    /// Durable storage failure.
    #[error("storage error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// `send()` was invoked while the session is not connected.
    #[error("not connected")]
    NotConnected,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
