//! Client configuration.

use std::time::Duration;

use hostlink_core::auth::ApiCredentials;
use hostlink_core::constants::{
    CHUNK_SIZE, CHUNK_THRESHOLD, CMD_PATH, COMMAND_TIMEOUT, CONNECT_TIMEOUT, DEFAULT_PORT,
    DEFAULT_TLS_PORT, PING_INTERVAL, RECONNECT_INITIAL_DELAY, RECONNECT_MAX_DELAY, WS_PATH,
};

/// Connection and behavior settings for a [`Computer`](crate::Computer).
///
/// Every timing knob has a production default from
/// [`hostlink_core::constants`]; tests shrink them to keep suites fast.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Target hostname or IP.
    pub host: String,
    /// Target port.
    pub port: u16,
    /// Use https/wss URLs (TLS terminated by the fronting proxy).
    pub use_tls: bool,
    /// Credentials for authenticated mode. None for direct connections.
    pub credentials: Option<ApiCredentials>,

    /// Timeout for establishing the WebSocket (TCP + upgrade + handshake).
    pub connect_timeout: Duration,
    /// Per-command timeout covering both transport attempts.
    pub command_timeout: Duration,
    /// Keepalive ping cadence on the WebSocket.
    pub ping_interval: Duration,
    /// First reconnect delay; doubles up to `reconnect_max_delay`.
    pub reconnect_initial_delay: Duration,
    /// Reconnect delay ceiling.
    pub reconnect_max_delay: Duration,

    /// File size above which transfers are chunked.
    pub chunk_threshold: u64,
    /// Chunk size for chunked transfers.
    pub chunk_size: u64,
}

impl ClientConfig {
    /// Direct (unauthenticated) connection to a host.
    pub fn direct(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            use_tls: false,
            credentials: None,
            connect_timeout: CONNECT_TIMEOUT,
            command_timeout: COMMAND_TIMEOUT,
            ping_interval: PING_INTERVAL,
            reconnect_initial_delay: RECONNECT_INITIAL_DELAY,
            reconnect_max_delay: RECONNECT_MAX_DELAY,
            chunk_threshold: CHUNK_THRESHOLD,
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Authenticated connection through a TLS-terminating gateway.
    pub fn authenticated(host: impl Into<String>, credentials: ApiCredentials) -> Self {
        let mut config = Self::direct(host, DEFAULT_TLS_PORT);
        config.use_tls = true;
        config.credentials = Some(credentials);
        config
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn with_chunking(mut self, threshold: u64, chunk_size: u64) -> Self {
        self.chunk_threshold = threshold;
        self.chunk_size = chunk_size;
        self
    }

    /// REST command endpoint URL.
    pub fn cmd_url(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, CMD_PATH)
    }

    /// WebSocket endpoint URL.
    pub fn ws_url(&self) -> String {
        let scheme = if self.use_tls { "wss" } else { "ws" };
        format!("{}://{}:{}{}", scheme, self.host, self.port, WS_PATH)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::direct("127.0.0.1", DEFAULT_PORT)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_urls() {
        let config = ClientConfig::direct("10.0.0.5", 8000);
        assert_eq!(config.cmd_url(), "http://10.0.0.5:8000/cmd");
        assert_eq!(config.ws_url(), "ws://10.0.0.5:8000/ws");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn authenticated_uses_tls() {
        let creds = ApiCredentials::new("key", "vm-1");
        let config = ClientConfig::authenticated("gateway.example.com", creds);
        assert_eq!(config.cmd_url(), "https://gateway.example.com:8443/cmd");
        assert_eq!(config.ws_url(), "wss://gateway.example.com:8443/ws");
        assert!(config.use_tls);
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::default()
            .with_port(9000)
            .with_chunking(1024, 256);
        assert_eq!(config.port, 9000);
        assert_eq!(config.chunk_threshold, 1024);
        assert_eq!(config.chunk_size, 256);
    }
}
