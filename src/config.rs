//! Public, transport-agnostic client configuration.
//!
//! This type intentionally contains no transport-specific concepts
//! (e.g. which host API carries plugin messages). Transport layers are
//! responsible for interpreting this config into concrete channel settings.

use std::time::Duration;

use crate::protocol::ENVELOPE_MARKER;

/// Configuration for a [`BungeeClient`](crate::BungeeClient) session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // ---
    /// Name of the plugin-messaging channel this protocol family uses.
    ///
    /// Outbound requests are addressed to this channel; inbound frames whose
    /// leading envelope tag does not match it (case-insensitively) are
    /// ignored by the dispatcher.
    ///
    /// Default: `"BungeeCord"`.
    pub channel: String,

    /// Buffer capacity of the inbound frame subscription.
    ///
    /// Default: 16.
    pub inbox_capacity: usize,

    /// Optional timeout applied while awaiting each reply.
    ///
    /// The underlying protocol has no request identifiers and no timeout:
    /// a request whose reply never arrives stays pending forever. The
    /// default (`None`) preserves that behavior. Setting a timeout makes
    /// the awaiting facade methods fail with
    /// [`Error::Timeout`](crate::Error::Timeout) instead — note the waiter
    /// itself cannot be removed from the middle of its FIFO queue, so a
    /// timed-out slot is still consumed by the next reply of that type.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        // ---
        Self {
            channel: ENVELOPE_MARKER.to_string(),
            inbox_capacity: 16,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different plugin-messaging channel name.
    ///
    /// Modern proxy builds register the namespaced `"bungeecord:main"`
    /// alongside the legacy `"BungeeCord"` name.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Set the inbound subscription buffer capacity.
    pub fn with_inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = capacity;
        self
    }

    /// Enable a per-reply await timeout.
    ///
    /// See [`ClientConfig::request_timeout`] for the semantics and the
    /// deviation from the base protocol this opts into.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_defaults() {
        // ---
        let config = ClientConfig::new();
        assert_eq!(config.channel, "BungeeCord");
        assert_eq!(config.inbox_capacity, 16);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_builders() {
        // ---
        let config = ClientConfig::new()
            .with_channel("bungeecord:main")
            .with_inbox_capacity(64)
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(config.channel, "bungeecord:main");
        assert_eq!(config.inbox_capacity, 64);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
    }
}
