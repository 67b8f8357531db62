//! Command and result envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single command sent from client to server.
///
/// Immutable once sent. `command` is a stable identifier from the protocol
/// command table; `params` is command-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Command name, e.g. `left_click` or `read_bytes`.
    pub command: String,
    /// Command-specific parameters.
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Protocol version. Absent on the wire means 0; only serialized when
    /// non-zero so version-0 envelopes match the original wire format.
    #[serde(default, skip_serializing_if = "version_is_zero")]
    pub version: u8,
}

fn version_is_zero(v: &u8) -> bool {
    *v == 0
}

impl CommandEnvelope {
    /// Create an envelope with no parameters.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: Map::new(),
            version: 0,
        }
    }

    /// Create an envelope with the given parameters.
    pub fn with_params(command: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            command: command.into(),
            params,
            version: 0,
        }
    }
}

/// The reply to a [`CommandEnvelope`].
///
/// On success, command-specific payload fields sit next to `success`
/// (flattened). On failure, `error` carries a message and no domain payload
/// fields are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// Whether the command executed successfully.
    pub success: bool,
    /// Failure message; present only when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Command-specific payload fields.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ResultEnvelope {
    /// A bare success with no payload.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            payload: Map::new(),
        }
    }

    /// A success carrying the given payload fields.
    pub fn with(payload: Map<String, Value>) -> Self {
        Self {
            success: true,
            error: None,
            payload,
        }
    }

    /// A failure with the given message. Carries no payload.
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            payload: Map::new(),
        }
    }

    /// Get a payload field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Get a payload field as a string slice.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Get a payload field as an unsigned integer.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.payload.get(key).and_then(Value::as_u64)
    }

    /// Get a payload field as a signed integer.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.payload.get(key).and_then(Value::as_i64)
    }

    /// Get a payload field as a bool.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.payload.get(key).and_then(Value::as_bool)
    }
}

// =============================================================================
// Tests
// =============================================================================
