//! hostlink-client: library for driving hostlink targets.
//!
//! Provides:
//! - CLI argument parsing
//! - Connection management with reconnection and keepalive
//! - REST-first command dispatch with WebSocket fallback
//! - Chunked transfer for large files
//! - A typed command surface ([`Computer`])
//!
//! A [`Computer`] is the usual entry point:
//!
//! ```no_run
//! use hostlink_client::{ClientConfig, Computer};
//!
//! # async fn demo() -> hostlink_core::Result<()> {
//! let computer = Computer::connect(ClientConfig::direct("10.0.0.5", 8000))?;
//! computer.left_click(Some(100), Some(200)).await?;
//! let shot = computer.screenshot().await?;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod chunk;
pub mod cli;
pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod interface;
pub mod transport;

pub use backoff::Backoff;
pub use cli::{Cli, Command};
pub use config::ClientConfig;
pub use connection::{ConnectionManager, ConnectionState};
pub use dispatcher::Dispatcher;
pub use interface::{Button, Computer, ShellOutput};
pub use transport::{CommandTransport, RestTransport, WsTransport};
