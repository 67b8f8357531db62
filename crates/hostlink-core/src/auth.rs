//! Authentication handshake payloads.
//!
//! Present only in authenticated/cloud mode, where an API key and a target
//! container name are configured. The session is per-connection: it is
//! re-established on every reconnect and never assumed to survive a socket
//! drop.

use serde_json::{json, Map};

use crate::constants::AUTHENTICATE_COMMAND;
use crate::protocol::CommandEnvelope;

/// Credentials for the authenticated mode handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// API key identifying the caller.
    pub api_key: String,
    /// Target container/VM identifier in multi-tenant deployments.
    pub container_name: String,
}

impl ApiCredentials {
    /// Create credentials.
    pub fn new(api_key: impl Into<String>, container_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            container_name: container_name.into(),
        }
    }

    /// Build the `authenticate` envelope sent as the first WebSocket frame.
    pub fn handshake_envelope(&self) -> CommandEnvelope {
        let mut params = Map::new();
        params.insert("api_key".into(), json!(self.api_key));
        params.insert("container_name".into(), json!(self.container_name));
        CommandEnvelope::with_params(AUTHENTICATE_COMMAND, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_envelope_shape() {
        let creds = ApiCredentials::new("sk-123", "vm-7");
        let env = creds.handshake_envelope();

        assert_eq!(env.command, "authenticate");
        assert_eq!(env.params["api_key"], "sk-123");
        assert_eq!(env.params["container_name"], "vm-7");

        let wire = serde_json::to_value(&env).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "command": "authenticate",
                "params": {"api_key": "sk-123", "container_name": "vm-7"}
            })
        );
    }
}
