//! hostlink client binary entry point.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;
use tracing::{error, info};

use hostlink_client::{Cli, Command, Computer};
use hostlink_core::protocol::CommandEnvelope;
use hostlink_core::{Error, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_format = cli.log_format.into();
    if let Err(e) = hostlink_core::init_logging(cli.verbose, cli.log_file.as_deref(), log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("hostlink: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.client_config()?;
    info!(url = %config.cmd_url(), "Connecting");
    let computer = Computer::connect(config)?;

    let code = match cli.command {
        Command::Version => {
            println!("{}", computer.version().await?);
            ExitCode::SUCCESS
        }
        Command::Run {
            command,
            timeout_secs,
        } => {
            let timeout = timeout_secs.map(Duration::from_secs);
            let output = computer.run_command(&command, timeout).await?;
            print!("{}", output.stdout);
            eprint!("{}", output.stderr);
            ExitCode::from(remote_exit_code(output.return_code))
        }
        Command::Screenshot { output } => {
            let image = computer.screenshot().await?;
            tokio::fs::write(&output, &image).await?;
            info!(path = %output.display(), bytes = image.len(), "Screenshot saved");
            ExitCode::SUCCESS
        }
        Command::Type { text } => {
            computer.type_text(&text).await?;
            ExitCode::SUCCESS
        }
        Command::Key { key } => {
            if key.contains('+') {
                let keys: Vec<&str> = key.split('+').collect();
                computer.hotkey(&keys).await?;
            } else {
                computer.press_key(&key).await?;
            }
            ExitCode::SUCCESS
        }
        Command::Click { x, y } => {
            computer.left_click(Some(x), Some(y)).await?;
            ExitCode::SUCCESS
        }
        Command::Push {
            local,
            remote,
            append,
        } => {
            let data = tokio::fs::read(&local).await?;
            computer.write_file(&remote, &data, append).await?;
            info!(bytes = data.len(), remote = remote.as_str(), "File pushed");
            ExitCode::SUCCESS
        }
        Command::Pull { remote, local } => {
            let data = computer.read_file(&remote).await?;
            tokio::fs::write(&local, &data).await?;
            info!(bytes = data.len(), local = %local.display(), "File pulled");
            ExitCode::SUCCESS
        }
        Command::Exec { name, params } => {
            let params: Value = serde_json::from_str(&params)
                .map_err(|e| Error::protocol(format!("invalid --params JSON: {e}")))?;
            let Value::Object(map) = params else {
                return Err(Error::protocol("--params must be a JSON object"));
            };
            let envelope = CommandEnvelope::with_params(name, map);
            let result = computer.send_raw(&envelope).await?;
            println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
            if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    };

    computer.close();
    Ok(code)
}

/// Propagate the remote exit code. Signal-terminated commands report -1
/// and anything outside the u8 range still has to exit nonzero.
fn remote_exit_code(return_code: i64) -> u8 {
    u8::try_from(return_code).unwrap_or(1)
}

// =============================================================================
// Tests
// =============================================================================
