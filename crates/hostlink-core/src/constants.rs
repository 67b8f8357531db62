//! Protocol and configuration constants for hostlink.

use std::time::Duration;

// =============================================================================
// Protocol Constants
// =============================================================================

/// Current protocol version.
///
/// Absent on the wire means version 0; the field is only serialized when
/// non-zero so that version-0 envelopes stay byte-compatible with peers
/// that predate the field.
pub const PROTOCOL_VERSION: u8 = 0;

/// REST endpoint path for single-command requests.
pub const CMD_PATH: &str = "/cmd";

/// WebSocket endpoint path for the command stream.
pub const WS_PATH: &str = "/ws";

/// Default port in plain (unauthenticated) mode.
pub const DEFAULT_PORT: u16 = 8000;

/// Default port in authenticated/cloud mode (TLS terminated in front).
pub const DEFAULT_TLS_PORT: u16 = 8443;

/// Header carrying the API key on REST requests.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Header carrying the target container name on REST requests.
pub const CONTAINER_NAME_HEADER: &str = "X-Container-Name";

/// Command name for the WebSocket authentication handshake.
pub const AUTHENTICATE_COMMAND: &str = "authenticate";

// =============================================================================
// Timing Constants
// =============================================================================

/// WebSocket connect timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Authentication handshake round-trip timeout.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default per-command timeout.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Keepalive ping interval once connected.
pub const PING_INTERVAL: Duration = Duration::from_secs(5);

/// Initial reconnect backoff delay. Also the minimum inter-attempt delay.
pub const RECONNECT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// Maximum reconnect backoff delay.
pub const RECONNECT_MAX_DELAY: Duration = Duration::from_secs(30);

// =============================================================================
// Chunked Transfer Constants
// =============================================================================

/// Payload size above which reads/writes are split into chunks (5 MiB).
pub const CHUNK_THRESHOLD: u64 = 5 * 1024 * 1024;

/// Size of each chunk in a chunked transfer (1 MiB).
pub const CHUNK_SIZE: u64 = 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_constants_are_consistent() {
        // A transfer at the threshold must span more than one chunk,
        // otherwise chunking would never trigger.
        assert!(CHUNK_SIZE < CHUNK_THRESHOLD);
        assert_eq!(CHUNK_THRESHOLD % CHUNK_SIZE, 0);
    }

    #[test]
    fn timing_constants_are_ordered() {
        assert!(RECONNECT_INITIAL_DELAY <= RECONNECT_MAX_DELAY);
        assert!(PING_INTERVAL < COMMAND_TIMEOUT);
    }

    #[test]
    fn wire_version_starts_at_zero() {
        // Backward compatibility: absence on the wire decodes as version 0.
        assert_eq!(PROTOCOL_VERSION, 0);
    }
}
