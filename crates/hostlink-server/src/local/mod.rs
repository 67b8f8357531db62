//! Local (in-process) capability implementations.
//!
//! Filesystem and shell execution are plain Rust and work on any host the
//! server runs on. OS input/screen/accessibility primitives are provided by
//! external platform crates implementing the capability traits.

mod fs;
mod shell;

pub use fs::LocalFilesystem;
pub use shell::LocalShell;
