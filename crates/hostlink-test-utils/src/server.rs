//! In-process server for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use hostlink_core::Result;
use hostlink_server::capability::Platform;
use hostlink_server::{serve, AppState, AuthConfig, CommandRegistry};

/// A real hostlink server on an ephemeral port.
///
/// Stopping (or dropping) closes the listener and every open WebSocket,
/// which is how reconnection tests simulate an outage. A new `TestServer`
/// can then be started on the same port via [`TestServer::start_on`].
pub struct TestServer {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<Result<()>>,
}

impl TestServer {
    /// Start on an ephemeral 127.0.0.1 port.
    pub async fn start(platform: &Platform, auth: Option<AuthConfig>) -> Result<Self> {
        Self::bind("127.0.0.1:0".parse().map_err(io_addr_error)?, platform, auth).await
    }

    /// Start on a specific address (used to restart on the same port).
    pub async fn start_on(
        addr: SocketAddr,
        platform: &Platform,
        auth: Option<AuthConfig>,
    ) -> Result<Self> {
        Self::bind(addr, platform, auth).await
    }

    async fn bind(addr: SocketAddr, platform: &Platform, auth: Option<AuthConfig>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let registry = Arc::new(CommandRegistry::for_platform(platform));
        let (state, shutdown) = AppState::new(registry, auth);
        let handle = tokio::spawn(serve(listener, state));
        Ok(Self {
            addr,
            shutdown,
            handle,
        })
    }

    /// Address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Host string for building a client config.
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop the server and wait for it to wind down.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

/// A WebSocket endpoint that completes the upgrade and then goes silent.
///
/// The socket is held open but never polled, so keepalive pings from the
/// client pile up unanswered. Connection-liveness tests use this to force
/// a missed-pong teardown without killing the TCP link.
pub struct StalledWsServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl StalledWsServer {
    /// Start on an ephemeral 127.0.0.1 port.
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    if let Ok(socket) = tokio_tungstenite::accept_async(stream).await {
                        // Hold the connection open without reading or
                        // writing. An unpolled socket answers nothing.
                        let _socket = socket;
                        std::future::pending::<()>().await;
                    }
                });
            }
        });
        Ok(Self { addr, handle })
    }

    /// Host string for building a client config.
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Port the endpoint is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop accepting connections.
    pub fn stop(self) {
        self.handle.abort();
    }
}

fn io_addr_error(e: std::net::AddrParseError) -> hostlink_core::Error {
    hostlink_core::Error::Config {
        message: format!("bind address: {e}"),
    }
}

// =============================================================================
// Tests
// =============================================================================
