//! Transport endpoints: REST and WebSocket, sharing one registry.
//!
//! Both endpoints serialize the same [`ResultEnvelope`] type, so a client
//! can fall back from one transport to the other without branching on
//! payload shape.
//!
//! - `POST /cmd`: one envelope per request, stateless, may be served
//!   concurrently across clients.
//! - `GET /ws`: optional auth handshake first, then a strictly sequential
//!   stream: one command frame in, one result frame out, in order.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use hostlink_core::constants::{
    API_KEY_HEADER, AUTHENTICATE_COMMAND, AUTH_TIMEOUT, CMD_PATH, CONTAINER_NAME_HEADER, WS_PATH,
};
use hostlink_core::protocol::{CommandEnvelope, Params, ResultEnvelope};
use hostlink_core::{Error, Result};

use crate::registry::CommandRegistry;

/// Expected credentials in authenticated mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub api_key: String,
    pub container_name: String,
}

impl AuthConfig {
    pub fn new(api_key: impl Into<String>, container_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            container_name: container_name.into(),
        }
    }

    fn matches(&self, api_key: Option<&str>, container_name: Option<&str>) -> bool {
        api_key == Some(self.api_key.as_str())
            && container_name == Some(self.container_name.as_str())
    }
}

/// Shared state behind both endpoints.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<CommandRegistry>,
    auth: Option<AuthConfig>,
    shutdown: watch::Receiver<bool>,
}

impl AppState {
    /// Build endpoint state.
    ///
    /// The returned sender drives shutdown: sending `true` (or dropping it)
    /// closes the listener and every open WebSocket.
    pub fn new(
        registry: Arc<CommandRegistry>,
        auth: Option<AuthConfig>,
    ) -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                registry,
                auth,
                shutdown: rx,
            },
            tx,
        )
    }
}

/// Build the axum router serving both endpoints.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(CMD_PATH, post(cmd_handler))
        .route(WS_PATH, get(ws_handler))
        .with_state(state)
}

/// Serve until the shutdown sender fires or is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let mut shutdown = state.shutdown.clone();
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, auth = state.auth.is_some(), "Server listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
        .map_err(|e| Error::transport(format!("server error: {e}")))
}

async fn cmd_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    if let Some(auth) = &state.auth {
        let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
        let container = headers
            .get(CONTAINER_NAME_HEADER)
            .and_then(|v| v.to_str().ok());
        if !auth.matches(api_key, container) {
            debug!("REST request rejected: bad credentials");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ResultEnvelope::err("authentication failed")),
            );
        }
    }

    match serde_json::from_str::<CommandEnvelope>(&body) {
        Ok(envelope) => (
            StatusCode::OK,
            Json(state.registry.dispatch(envelope).await),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ResultEnvelope::err(format!("malformed envelope: {e}"))),
        ),
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut shutdown = state.shutdown.clone();

    if let Some(auth) = &state.auth {
        match authenticate_socket(&mut socket, auth).await {
            Ok(()) => debug!("WebSocket authenticated"),
            Err(e) => {
                warn!(error = %e, "WebSocket authentication failed");
                let _ = socket
                    .send(Message::Text(reply_json(&ResultEnvelope::err(
                        "authentication failed",
                    ))))
                    .await;
                let _ = socket.send(Message::Close(None)).await;
                return;
            }
        }
        let _ = socket
            .send(Message::Text(reply_json(&ResultEnvelope::ok())))
            .await;
    }

    // One command in, one result out, strictly in order.
    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let result = match serde_json::from_str::<CommandEnvelope>(&text) {
                            Ok(envelope) => state.registry.dispatch(envelope).await,
                            Err(e) => ResultEnvelope::err(format!("malformed envelope: {e}")),
                        };
                        if socket.send(Message::Text(reply_json(&result))).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let err = ResultEnvelope::err("binary frames are not supported");
                        if socket.send(Message::Text(reply_json(&err))).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket read error");
                        break;
                    }
                }
            }
            _ = shutdown.changed() => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }
}

/// Validate the `authenticate` envelope that must arrive first.
async fn authenticate_socket(socket: &mut WebSocket, auth: &AuthConfig) -> Result<()> {
    let frame = tokio::time::timeout(AUTH_TIMEOUT, socket.recv())
        .await
        .map_err(|_| Error::Timeout)?;

    let text = match frame {
        Some(Ok(Message::Text(text))) => text,
        Some(Ok(_)) => return Err(Error::protocol("expected authenticate frame")),
        Some(Err(e)) => return Err(Error::transport(e.to_string())),
        None => return Err(Error::ConnectionClosed),
    };

    let envelope: CommandEnvelope = serde_json::from_str(&text)
        .map_err(|e| Error::protocol(format!("malformed authenticate envelope: {e}")))?;
    if envelope.command != AUTHENTICATE_COMMAND {
        return Err(Error::protocol(format!(
            "expected authenticate, got {}",
            envelope.command
        )));
    }

    let params = Params::new(&envelope.params);
    if auth.matches(params.str_opt("api_key"), params.str_opt("container_name")) {
        Ok(())
    } else {
        Err(Error::AuthenticationFailed)
    }
}

fn reply_json(result: &ResultEnvelope) -> String {
    // ResultEnvelope serialization cannot fail: all payloads are already Values.
    serde_json::to_string(result).unwrap_or_else(|_| r#"{"success":false,"error":"serialization failed"}"#.to_string())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_matching() {
        let auth = AuthConfig::new("key", "vm-1");
        assert!(auth.matches(Some("key"), Some("vm-1")));
        assert!(!auth.matches(Some("key"), Some("vm-2")));
        assert!(!auth.matches(Some("wrong"), Some("vm-1")));
        assert!(!auth.matches(None, None));
    }

    #[test]
    fn reply_json_shape() {
        let json = reply_json(&ResultEnvelope::err("nope"));
        assert_eq!(json, r#"{"success":false,"error":"nope"}"#);
    }
}
