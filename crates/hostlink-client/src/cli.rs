//! Client CLI implementation.
//!
//! One-shot command sender: connect, run a single command, print the
//! result, exit. Scripted control flows use the library instead.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use hostlink_core::auth::ApiCredentials;
use hostlink_core::constants::DEFAULT_PORT;
use hostlink_core::{Error, Result};

use crate::config::ClientConfig;

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

/// hostlink - drive a remote machine over REST/WebSocket.
#[derive(Debug, Parser)]
#[command(
    name = "hostlink",
    version,
    about = "hostlink - drive a remote machine over REST/WebSocket"
)]
pub struct Cli {
    /// Target host
    #[arg(short = 'H', long = "host", default_value = "127.0.0.1")]
    pub host: String,

    /// Target port
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// API key for authenticated mode
    #[arg(long = "api-key", value_name = "KEY", requires = "container_name")]
    pub api_key: Option<String>,

    /// Container name for authenticated mode
    #[arg(long = "container-name", value_name = "NAME", requires = "api_key")]
    pub container_name: Option<String>,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Log to file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", default_value = "text")]
    pub log_format: CliLogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the server version
    Version,
    /// Run a shell command on the target
    Run {
        /// Command line to execute
        command: String,
        /// Timeout in seconds
        #[arg(long = "timeout", value_name = "SECS")]
        timeout_secs: Option<u64>,
    },
    /// Capture a screenshot
    Screenshot {
        /// Output file (default: screenshot.png)
        #[arg(short = 'o', long = "output", default_value = "screenshot.png")]
        output: PathBuf,
    },
    /// Type text on the target
    Type { text: String },
    /// Press a key (name or combination joined with '+')
    Key { key: String },
    /// Left-click at coordinates
    Click { x: i64, y: i64 },
    /// Copy a local file to the target
    Push {
        local: PathBuf,
        remote: String,
        /// Append instead of overwrite
        #[arg(long = "append")]
        append: bool,
    },
    /// Copy a remote file from the target
    Pull { remote: String, local: PathBuf },
    /// Send a raw command envelope
    Exec {
        /// Command name from the protocol table
        name: String,
        /// Parameters as a JSON object
        #[arg(long = "params", default_value = "{}")]
        params: String,
    },
}

impl Cli {
    /// Build the client configuration these flags describe.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let config = match (&self.api_key, &self.container_name) {
            (Some(key), Some(name)) => {
                ClientConfig::authenticated(self.host.clone(), ApiCredentials::new(key, name))
            }
            (None, None) => ClientConfig::direct(self.host.clone(), DEFAULT_PORT),
            // clap's `requires` makes this unreachable from the command line.
            _ => {
                return Err(Error::Config {
                    message: "api key and container name must be set together".into(),
                })
            }
        };
        Ok(match self.port {
            Some(port) => config.with_port(port),
            None => config,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_config_from_defaults() {
        let cli = Cli::parse_from(["hostlink", "version"]);
        let config = cli.client_config().unwrap();
        assert_eq!(config.cmd_url(), "http://127.0.0.1:8000/cmd");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn authenticated_config() {
        let cli = Cli::parse_from([
            "hostlink",
            "--host",
            "gw.example.com",
            "--api-key",
            "k",
            "--container-name",
            "vm-1",
            "version",
        ]);
        let config = cli.client_config().unwrap();
        assert!(config.use_tls);
        assert_eq!(config.cmd_url(), "https://gw.example.com:8443/cmd");
    }

    #[test]
    fn port_override_applies_to_authenticated() {
        let cli = Cli::parse_from([
            "hostlink",
            "--api-key",
            "k",
            "--container-name",
            "c",
            "-p",
            "9443",
            "version",
        ]);
        let config = cli.client_config().unwrap();
        assert_eq!(config.port, 9443);
    }

    #[test]
    fn run_subcommand_parses() {
        let cli = Cli::parse_from(["hostlink", "run", "ls -la", "--timeout", "5"]);
        match cli.command {
            Command::Run {
                command,
                timeout_secs,
            } => {
                assert_eq!(command, "ls -la");
                assert_eq!(timeout_secs, Some(5));
            }
            other => panic!("unexpected subcommand: {other:?}"),
        }
    }
}
