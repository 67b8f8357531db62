//! hostlink-server: command dispatcher and transport endpoints.
//!
//! A server is assembled from three pieces:
//! - a [`Platform`](capability::Platform) bundling the capability
//!   implementations this target supports,
//! - a [`CommandRegistry`](registry::CommandRegistry) mapping command names
//!   to handlers over those capabilities,
//! - the axum [`router`](endpoints::router) exposing the registry over
//!   `POST /cmd` and the `/ws` WebSocket stream.

pub mod capability;
pub mod cli;
mod commands;
pub mod endpoints;
pub mod local;
pub mod registry;

pub use capability::Platform;
pub use cli::Cli;
pub use endpoints::{router, serve, AppState, AuthConfig};
pub use local::{LocalFilesystem, LocalShell};
pub use registry::CommandRegistry;
