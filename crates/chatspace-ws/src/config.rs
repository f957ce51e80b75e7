//! Session configuration.

use std::time::Duration;

use url::Url;

use crate::{Error, Result};

/// Default server base URL.
pub const DEFAULT_BASE_URL: &str = "wss://chatspace.bond";

/// Fixed endpoint path for the chat session.
pub const CHAT_ENDPOINT: &str = "/ws/chat/";

/// Fixed delay between reconnection attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Maximum reconnection attempts per disconnection episode.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Configuration for a chat session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server base URL (`ws://` or `wss://`).
    pub base_url: String,
    /// Endpoint path appended to the base URL.
    pub endpoint: String,
    /// Auth token passed as a query parameter at connect time.
    pub token: Option<String>,
    /// Delay between reconnection attempts.
    pub reconnect_delay: Duration,
    /// Maximum reconnection attempts per disconnection episode.
    pub max_reconnect_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SessionConfig {
    /// Creates a configuration for the given server base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: CHAT_ENDPOINT.to_string(),
            token: None,
            reconnect_delay: RECONNECT_DELAY,
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }

    /// Sets the auth token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the endpoint path.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the delay between reconnection attempts.
    #[must_use]
    pub const fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Sets the maximum reconnection attempts.
    #[must_use]
    pub const fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Builds the session URL with the token as a percent-encoded
    /// `token` query parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or endpoint path is invalid.
    pub fn session_url(&self, token: &str) -> Result<String> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(&self.endpoint);
        url.query_pairs_mut().append_pair("token", token);
        Ok(url.into())
    }

    /// Builds the session URL from the configured token, if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoToken`] if no token is configured, or an error if
    /// the URL is invalid.
    pub fn configured_session_url(&self) -> Result<String> {
        let token = self.token.as_deref().ok_or(Error::NoToken)?;
        self.session_url(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_url_encodes_token() {
        let config = SessionConfig::new("wss://chatspace.bond");
        let url = config.session_url("a b+c/=").unwrap();
        assert_eq!(url, "wss://chatspace.bond/ws/chat/?token=a+b%2Bc%2F%3D");
    }

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.endpoint, CHAT_ENDPOINT);
        assert_eq!(config.reconnect_delay, Duration::from_millis(3000));
        assert_eq!(config.max_reconnect_attempts, 5);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = SessionConfig::new("ws://localhost:8080")
            .token("t0k3n")
            .reconnect_delay(Duration::from_millis(50))
            .max_reconnect_attempts(2);
        assert_eq!(config.token.as_deref(), Some("t0k3n"));
        assert_eq!(config.reconnect_delay, Duration::from_millis(50));
        assert_eq!(config.max_reconnect_attempts, 2);
        assert_eq!(
            config.configured_session_url().unwrap(),
            "ws://localhost:8080/ws/chat/?token=t0k3n"
        );
    }
}
