//! Wire protocol for hostlink.
//!
//! The protocol is a JSON request/response pair: a [`CommandEnvelope`] goes
//! from client to server, one [`ResultEnvelope`] comes back, over either the
//! REST endpoint or the WebSocket stream. Both transports carry the exact
//! same envelope shapes.

mod commands;
mod envelope;
mod params;
mod response;

pub use commands::{capability_of, Capability, COMMANDS};
pub use envelope::{CommandEnvelope, ResultEnvelope};
pub use params::Params;
pub use response::parse_result_body;
