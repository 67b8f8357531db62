//! Per-capability handler registration.
//!
//! Each submodule wires one capability's commands into the registry,
//! translating between envelope parameters and the typed trait methods.

pub(crate) mod access;
pub(crate) mod clipboard;
pub(crate) mod fs;
pub(crate) mod keyboard;
pub(crate) mod mouse;
pub(crate) mod screen;
pub(crate) mod scroll;
pub(crate) mod shell;
