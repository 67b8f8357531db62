//! hostlink-test-utils: Test infrastructure for hostlink.
//!
//! Provides:
//! - RecordingInput: mouse/keyboard/scroll/clipboard ops that record calls
//! - FixedScreen: screen ops returning canned pixels and geometry
//! - StaticAccessibility: accessibility ops over a fixed JSON tree
//! - TestServer: a real server on an ephemeral port with a stop switch
//! - StalledWsServer: a WebSocket endpoint that upgrades and then goes silent

mod mock_platform;
mod server;

pub use mock_platform::{mock_platform, FixedScreen, RecordingInput, StaticAccessibility};
pub use server::{StalledWsServer, TestServer};
