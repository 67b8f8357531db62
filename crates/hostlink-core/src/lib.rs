//! hostlink-core: Shared library for the hostlink control-plane protocol.
//!
//! This crate provides:
//! - Command/result envelope definitions and wire parsing
//! - Protocol command table and capability grouping
//! - Error taxonomy shared by client and server
//! - Coordinate scaling between screen and screenshot space
//! - Authentication handshake payloads
//! - Logging and connection metrics

pub mod auth;
pub mod constants;
pub mod coords;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod protocol;

pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat};
pub use metrics::ConnectionMetrics;
pub use protocol::{CommandEnvelope, ResultEnvelope};
