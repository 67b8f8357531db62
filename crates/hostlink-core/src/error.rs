//! Error types for hostlink-core.

use thiserror::Error;

/// Main error type for hostlink operations.
///
/// Domain-level failures (a handler returning `success: false`) are not
/// errors; they travel back to the caller inside a [`crate::ResultEnvelope`].
/// This type covers everything that goes wrong around the envelope: the
/// transport, the protocol framing, authentication, and chunked transfers.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from underlying system calls.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport layer failure (connect refused, socket closed mid-call,
    /// unreachable host). Eligible for fallback to the alternate transport.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Protocol violation: malformed response body, unexpected frame,
    /// or an envelope the peer cannot understand. Never retried.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// Authentication handshake was rejected. Fatal for the connection.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// The server executed the command and reported failure. Neither
    /// transient nor fatal; retrying is the caller's call.
    #[error("command failed: {message}")]
    Command { message: String },

    /// Operation exceeded its per-call timeout.
    #[error("operation timed out")]
    Timeout,

    /// Connection was closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// A multi-chunk transfer failed; `offset` names where it stopped.
    #[error("chunked transfer failed at offset {offset}: {message}")]
    ChunkTransfer { offset: u64, message: String },

    /// Invalid configuration.
    #[error("config error: {message}")]
    Config { message: String },
}

impl Error {
    /// Shorthand for a transport error with a formatted message.
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
        }
    }

    /// Shorthand for a protocol error with a formatted message.
    pub fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }

    /// Shorthand for a server-reported command failure.
    pub fn command(message: impl Into<String>) -> Self {
        Error::Command {
            message: message.into(),
        }
    }

    /// Returns true if this error is transient and another transport or a
    /// reconnect may help.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::Timeout | Error::ConnectionClosed | Error::Io(_)
        )
    }

    /// Returns true if this error is fatal and retrying won't help.
    ///
    /// Credentials don't fix themselves and a protocol mismatch doesn't
    /// heal; these are surfaced immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationFailed | Error::Protocol { .. } | Error::Config { .. }
        )
    }
}

/// Convenience result type for hostlink operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let err = Error::transport("connection refused");
        assert_eq!(err.to_string(), "transport error: connection refused");
    }

    #[test]
    fn error_display_chunk() {
        let err = Error::ChunkTransfer {
            offset: 1048576,
            message: "read failed".into(),
        };
        assert_eq!(
            err.to_string(),
            "chunked transfer failed at offset 1048576: read failed"
        );
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn transient_errors() {
        assert!(Error::transport("lost").is_transient());
        assert!(Error::ConnectionClosed.is_transient());
        assert!(Error::Timeout.is_transient());
        assert!(Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset"
        ))
        .is_transient());

        assert!(!Error::AuthenticationFailed.is_transient());
        assert!(!Error::protocol("bad frame").is_transient());
        assert!(!Error::command("file not found").is_transient());
    }

    #[test]
    fn fatal_errors() {
        assert!(Error::AuthenticationFailed.is_fatal());
        assert!(Error::protocol("unexpected frame").is_fatal());

        assert!(!Error::transport("lost").is_fatal());
        assert!(!Error::ConnectionClosed.is_fatal());
        assert!(!Error::Timeout.is_fatal());
        assert!(!Error::command("file not found").is_fatal());
        assert!(!Error::ChunkTransfer {
            offset: 0,
            message: "x".into()
        }
        .is_fatal());
    }
}
