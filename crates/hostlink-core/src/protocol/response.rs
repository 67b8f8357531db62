//! Response body parsing.
//!
//! The REST endpoint historically replied either with a plain JSON result
//! envelope or with a Server-Sent-Events-style `data: <json>` line. That
//! wire quirk is isolated here so no other component branches on response
//! shape: everything downstream sees a [`ResultEnvelope`] or a protocol
//! error.

use crate::error::{Error, Result};
use crate::protocol::ResultEnvelope;

/// Parse a REST or WebSocket response body into a [`ResultEnvelope`].
///
/// Accepts plain JSON or a single SSE-prefixed `data: <json>` line. Any
/// other shape is a malformed-response protocol error.
pub fn parse_result_body(body: &str) -> Result<ResultEnvelope> {
    let trimmed = body.trim();
    let json = match trimmed.strip_prefix("data: ") {
        Some(rest) => rest.trim(),
        None => trimmed,
    };

    serde_json::from_str(json).map_err(|e| {
        Error::protocol(format!(
            "malformed response body: {e} (body starts with {:?})",
            &trimmed.chars().take(32).collect::<String>()
        ))
    })
}
