//! Command transports: REST and WebSocket behind one trait.
//!
//! [`CommandTransport`] is the seam the dispatcher works against, so
//! transport behavior (fallback, ordering, timeouts) is testable with mock
//! transports and no sockets.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use hostlink_core::constants::{API_KEY_HEADER, CONTAINER_NAME_HEADER};
use hostlink_core::protocol::{parse_result_body, CommandEnvelope, ResultEnvelope};
use hostlink_core::{Error, Result};

use crate::config::ClientConfig;
use crate::connection::ConnectionManager;

/// One way of delivering a command envelope and getting its result back.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    /// Short name for logs and combined error messages.
    fn name(&self) -> &'static str;

    /// Deliver one envelope and wait for its result.
    async fn send(&self, envelope: &CommandEnvelope) -> Result<ResultEnvelope>;
}

/// Stateless request/response transport over `POST /cmd`.
pub struct RestTransport {
    client: reqwest::Client,
    url: String,
    credentials: Option<hostlink_core::auth::ApiCredentials>,
}

impl RestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| Error::Config {
                message: format!("HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            url: config.cmd_url(),
            credentials: config.credentials.clone(),
        })
    }
}

#[async_trait]
impl CommandTransport for RestTransport {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn send(&self, envelope: &CommandEnvelope) -> Result<ResultEnvelope> {
        let mut request = self.client.post(&self.url).json(envelope);
        if let Some(creds) = &self.credentials {
            request = request
                .header(API_KEY_HEADER, &creds.api_key)
                .header(CONTAINER_NAME_HEADER, &creds.container_name);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("REST request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::AuthenticationFailed);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("REST body read failed: {e}")))?;

        match parse_result_body(&body) {
            Ok(result) => Ok(result),
            // Proxies answer with HTML error pages; that's the transport's
            // fault, not a protocol break, so it stays fallback-eligible.
            Err(_) if !status.is_success() => {
                debug!(%status, "REST endpoint returned non-envelope error body");
                Err(Error::transport(format!("HTTP {status}")))
            }
            Err(e) => Err(e),
        }
    }
}

/// Transport that rides the managed WebSocket session.
pub struct WsTransport {
    manager: Arc<ConnectionManager>,
}

impl WsTransport {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl CommandTransport for WsTransport {
    fn name(&self) -> &'static str {
        "websocket"
    }

    async fn send(&self, envelope: &CommandEnvelope) -> Result<ResultEnvelope> {
        self.manager.send(envelope.clone()).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_transport_builds_url_from_config() {
        let config = ClientConfig::direct("localhost", 8000);
        let transport = RestTransport::new(&config).unwrap();
        assert_eq!(transport.url, "http://localhost:8000/cmd");
        assert_eq!(transport.name(), "rest");
    }
}
