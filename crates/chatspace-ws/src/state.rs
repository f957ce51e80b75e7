//! Connection state vocabulary.

/// Lifecycle state of the socket session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No session and no pending retry.
    Disconnected,
    /// A connect is in progress.
    Connecting,
    /// The session is open.
    Connected,
    /// An abnormal closure occurred; the numbered retry is pending.
    Reconnecting(u32),
}

impl ConnectionState {
    /// Returns true while the session is open.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true while a connect is in progress or the session is open.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}
