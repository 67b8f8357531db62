//! Server CLI implementation.
//!
//! Provides command-line argument parsing for the hostlink server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use hostlink_core::constants::DEFAULT_PORT;

use crate::endpoints::AuthConfig;

/// Log output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CliLogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

impl From<CliLogFormat> for hostlink_core::LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => hostlink_core::LogFormat::Text,
            CliLogFormat::Json => hostlink_core::LogFormat::Json,
        }
    }
}

/// hostlink server - command endpoint for hostlink clients.
#[derive(Debug, Parser)]
#[command(
    name = "hostlink-server",
    version,
    about = "hostlink server - REST/WebSocket command endpoint"
)]
pub struct Cli {
    /// Address to listen on
    #[arg(short = 'b', long = "bind", default_value = "0.0.0.0")]
    pub bind_addr: IpAddr,

    /// Port to listen on
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Require this API key on every request (enables authenticated mode)
    #[arg(long = "api-key", value_name = "KEY", requires = "container_name")]
    pub api_key: Option<String>,

    /// Container name clients must present alongside the API key
    #[arg(long = "container-name", value_name = "NAME", requires = "api_key")]
    pub container_name: Option<String>,

    /// Root directory for file commands (default: unrestricted)
    #[arg(long = "fs-root", value_name = "DIR")]
    pub fs_root: Option<PathBuf>,

    /// Disable file commands entirely
    #[arg(long = "no-fs")]
    pub no_fs: bool,

    /// Disable shell execution
    #[arg(long = "no-shell")]
    pub no_shell: bool,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Log to file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", default_value = "text")]
    pub log_format: CliLogFormat,
}

impl Cli {
    /// Socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Credentials to enforce, if authenticated mode is configured.
    pub fn auth_config(&self) -> Option<AuthConfig> {
        match (&self.api_key, &self.container_name) {
            (Some(key), Some(name)) => Some(AuthConfig::new(key, name)),
            _ => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
