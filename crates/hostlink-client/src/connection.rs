//! WebSocket connection manager with transparent reconnection.
//!
//! `ConnectionManager` owns the socket exclusively; callers never touch it.
//! Commands are submitted over an mpsc channel and answered through a
//! oneshot, so a caller that times out and walks away only drops its reply
//! slot. The socket and the strict one-in one-out ordering survive, and the
//! late response is discarded when it arrives.
//!
//! # Design
//!
//! - A supervisor task runs the connect / authenticate / session loop and
//!   publishes [`ConnectionState`] through a watch channel.
//! - Transient failures trigger reconnection with exponential backoff
//!   ([`Backoff`]); a successful session resets the backoff.
//! - Keepalive pings are sent on a fixed cadence. A pong must arrive before
//!   the next tick or the session is declared dead and torn down.
//! - Fatal failures (server rejects credentials) stop reconnecting: the
//!   supervisor parks and answers every pending and future request with
//!   `Error::AuthenticationFailed`.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use hostlink_core::constants::AUTH_TIMEOUT;
use hostlink_core::protocol::{CommandEnvelope, ResultEnvelope};
use hostlink_core::{ConnectionMetrics, Error, Result};

use crate::backoff::Backoff;
use crate::config::ClientConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected; the supervisor is between attempts.
    Disconnected,
    /// TCP + WebSocket upgrade in progress.
    Connecting,
    /// Upgrade done, waiting for the authenticate handshake result.
    Authenticating,
    /// Session established; commands flow.
    Connected,
    /// Shutdown requested, draining.
    Closing,
    /// Manager stopped; no further attempts.
    Closed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Connected => "connected",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

struct WsRequest {
    envelope: CommandEnvelope,
    reply: oneshot::Sender<Result<ResultEnvelope>>,
}

/// Handle to the supervisor task owning the WebSocket.
pub struct ConnectionManager {
    requests: mpsc::Sender<WsRequest>,
    state_rx: watch::Receiver<ConnectionState>,
    shutdown: watch::Sender<bool>,
    metrics: Arc<Mutex<ConnectionMetrics>>,
}

impl ConnectionManager {
    /// Spawn the supervisor. Connection is established lazily in the
    /// background; `send` calls queue until the session is up.
    pub fn spawn(config: ClientConfig) -> Self {
        let (req_tx, req_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let metrics = Arc::new(Mutex::new(ConnectionMetrics::new()));

        let supervisor = Supervisor {
            config,
            requests: req_rx,
            state: state_tx,
            shutdown: shutdown_rx,
            metrics: Arc::clone(&metrics),
        };
        tokio::spawn(supervisor.run());

        Self {
            requests: req_tx,
            state_rx,
            shutdown: shutdown_tx,
            metrics,
        }
    }

    /// Send one command and wait for its result frame.
    ///
    /// Queues while the supervisor is reconnecting. Callers apply their own
    /// timeout; abandoning the returned future is safe.
    pub async fn send(&self, envelope: CommandEnvelope) -> Result<ResultEnvelope> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(WsRequest {
                envelope,
                reply: tx,
            })
            .await
            .map_err(|_| Error::ConnectionClosed)?;
        rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Watch stream of state changes.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Wait until the session is established.
    ///
    /// Returns an error if the manager stops first (shutdown or fatal
    /// authentication failure).
    pub async fn wait_connected(&self) -> Result<()> {
        let mut rx = self.state_rx.clone();
        loop {
            match *rx.borrow_and_update() {
                ConnectionState::Connected => return Ok(()),
                ConnectionState::Closed => return Err(Error::ConnectionClosed),
                _ => {}
            }
            if rx.changed().await.is_err() {
                return Err(Error::ConnectionClosed);
            }
        }
    }

    /// Snapshot of connection metrics.
    pub fn metrics(&self) -> ConnectionMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Stop the supervisor and close the socket.
    pub fn close(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

enum SessionEnd {
    /// Socket died; reconnect.
    Disconnected,
    /// Shutdown requested or all request senders dropped.
    Shutdown,
}

struct Supervisor {
    config: ClientConfig,
    requests: mpsc::Receiver<WsRequest>,
    state: watch::Sender<ConnectionState>,
    shutdown: watch::Receiver<bool>,
    metrics: Arc<Mutex<ConnectionMetrics>>,
}

impl Supervisor {
    async fn run(mut self) {
        let mut backoff = Backoff::new(
            self.config.reconnect_initial_delay,
            self.config.reconnect_max_delay,
        );
        let mut ever_connected = false;

        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let _ = self.state.send(ConnectionState::Connecting);
            match self.connect_and_authenticate().await {
                Ok(ws) => {
                    backoff.reset();
                    if ever_connected {
                        self.with_metrics(|m| m.record_reconnect());
                    }
                    ever_connected = true;
                    info!(url = %self.config.ws_url(), "WebSocket session established");
                    let _ = self.state.send(ConnectionState::Connected);

                    match self.run_session(ws).await {
                        SessionEnd::Disconnected => {
                            warn!("WebSocket session lost, reconnecting");
                            let _ = self.state.send(ConnectionState::Disconnected);
                        }
                        SessionEnd::Shutdown => break,
                    }
                }
                Err(e) if e.is_fatal() => {
                    warn!(error = %e, "Fatal connection failure, giving up");
                    self.park(e).await;
                    break;
                }
                Err(e) => {
                    let _ = self.state.send(ConnectionState::Disconnected);
                    let delay = backoff.next_delay();
                    debug!(
                        error = %e,
                        attempt = backoff.attempt(),
                        delay_ms = delay.as_millis() as u64,
                        "Connection attempt failed"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.shutdown.changed() => break,
                    }
                }
            }
        }

        let _ = self.state.send(ConnectionState::Closed);
    }

    /// Answer every pending and future request with the fatal error.
    async fn park(&mut self, error: Error) {
        let _ = self.state.send(ConnectionState::Closed);
        loop {
            tokio::select! {
                req = self.requests.recv() => match req {
                    Some(req) => {
                        let _ = req.reply.send(Err(clone_fatal(&error)));
                    }
                    None => return,
                },
                _ = self.shutdown.changed() => return,
            }
        }
    }

    async fn connect_and_authenticate(&mut self) -> Result<WsStream> {
        let url = self.config.ws_url();
        let connect = connect_async(url.as_str());
        let (mut ws, _response) = tokio::time::timeout(self.config.connect_timeout, connect)
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|e| Error::transport(format!("WebSocket connect failed: {e}")))?;

        if let Some(creds) = self.config.credentials.clone() {
            let _ = self.state.send(ConnectionState::Authenticating);
            let handshake = serde_json::to_string(&creds.handshake_envelope())
                .map_err(|e| Error::protocol(format!("handshake serialization: {e}")))?;
            ws.send(Message::Text(handshake))
                .await
                .map_err(|e| Error::transport(format!("handshake send failed: {e}")))?;

            let reply = tokio::time::timeout(AUTH_TIMEOUT, async {
                loop {
                    match ws.next().await {
                        Some(Ok(Message::Text(text))) => return Ok(text),
                        Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                        Some(Ok(_)) | None => return Err(Error::ConnectionClosed),
                        Some(Err(e)) => return Err(Error::transport(e.to_string())),
                    }
                }
            })
            .await
            .map_err(|_| Error::Timeout)??;

            let result: ResultEnvelope = serde_json::from_str(&reply)
                .map_err(|e| Error::protocol(format!("malformed handshake reply: {e}")))?;
            if !result.success {
                return Err(Error::AuthenticationFailed);
            }
        }

        Ok(ws)
    }

    /// Pump the established session until it dies or shutdown is requested.
    async fn run_session(&mut self, mut ws: WsStream) -> SessionEnd {
        let mut ping_tick = tokio::time::interval(self.config.ping_interval);
        ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ping_tick.reset();

        let mut pending: Option<oneshot::Sender<Result<ResultEnvelope>>> = None;
        let mut pong_seen = true;
        let mut ping_sent_at: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    let _ = self.state.send(ConnectionState::Closing);
                    fail_pending(&mut pending, Error::ConnectionClosed);
                    let _ = ws.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                }

                req = self.requests.recv(), if pending.is_none() => {
                    let Some(req) = req else {
                        let _ = ws.send(Message::Close(None)).await;
                        return SessionEnd::Shutdown;
                    };
                    let text = match serde_json::to_string(&req.envelope) {
                        Ok(text) => text,
                        Err(e) => {
                            let _ = req.reply.send(Err(Error::protocol(format!(
                                "envelope serialization: {e}"
                            ))));
                            continue;
                        }
                    };
                    self.with_metrics(|m| m.record_send(text.len()));
                    if let Err(e) = ws.send(Message::Text(text)).await {
                        let _ = req
                            .reply
                            .send(Err(Error::transport(format!("send failed: {e}"))));
                        return SessionEnd::Disconnected;
                    }
                    pending = Some(req.reply);
                }

                frame = ws.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            self.with_metrics(|m| m.record_recv(text.len()));
                            let parsed = serde_json::from_str::<ResultEnvelope>(&text)
                                .map_err(|e| Error::protocol(format!("malformed result: {e}")));
                            match pending.take() {
                                // Caller gone after timeout: drop the frame, keep the socket.
                                Some(reply) => { let _ = reply.send(parsed); }
                                None => debug!("Discarding response with no waiting caller"),
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if ws.send(Message::Pong(data)).await.is_err() {
                                fail_pending(&mut pending, Error::ConnectionClosed);
                                return SessionEnd::Disconnected;
                            }
                        }
                        Some(Ok(Message::Pong(_))) => {
                            pong_seen = true;
                            if let Some(sent) = ping_sent_at.take() {
                                self.with_metrics(|m| m.update_rtt(sent.elapsed()));
                            }
                        }
                        Some(Ok(Message::Binary(_))) => {
                            debug!("Ignoring unexpected binary frame");
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            fail_pending(&mut pending, Error::ConnectionClosed);
                            return SessionEnd::Disconnected;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            fail_pending(&mut pending, Error::transport(e.to_string()));
                            return SessionEnd::Disconnected;
                        }
                    }
                }

                _ = ping_tick.tick() => {
                    if !pong_seen {
                        warn!("Keepalive pong missed, dropping connection");
                        fail_pending(&mut pending, Error::ConnectionClosed);
                        return SessionEnd::Disconnected;
                    }
                    pong_seen = false;
                    ping_sent_at = Some(Instant::now());
                    if ws.send(Message::Ping(Vec::new())).await.is_err() {
                        fail_pending(&mut pending, Error::ConnectionClosed);
                        return SessionEnd::Disconnected;
                    }
                }
            }
        }
    }

    fn with_metrics(&self, f: impl FnOnce(&mut ConnectionMetrics)) {
        let mut metrics = self.metrics.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut metrics);
    }
}

fn fail_pending(pending: &mut Option<oneshot::Sender<Result<ResultEnvelope>>>, error: Error) {
    if let Some(reply) = pending.take() {
        let _ = reply.send(Err(error));
    }
}

/// Fatal errors are parked and re-delivered per request; reproduce the
/// variant rather than requiring Clone on the whole error type.
fn clone_fatal(error: &Error) -> Error {
    match error {
        Error::AuthenticationFailed => Error::AuthenticationFailed,
        Error::Protocol { message } => Error::protocol(message.clone()),
        Error::Config { message } => Error::Config {
            message: message.clone(),
        },
        other => Error::transport(other.to_string()),
    }
}

// =============================================================================
// Tests
// =============================================================================
