//! hostlink server binary entry point.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use hostlink_server::{
    AppState, Cli, CommandRegistry, LocalFilesystem, LocalShell, Platform,
};

fn main() {
    let cli = Cli::parse();

    let log_format = cli.log_format.into();
    if let Err(e) = hostlink_core::init_logging(cli.verbose, cli.log_file.as_deref(), log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "hostlink-server starting"
    );

    let mut platform = Platform::new();
    if !cli.no_fs {
        let fs = match &cli.fs_root {
            Some(root) => LocalFilesystem::rooted(root),
            None => LocalFilesystem::new(),
        };
        platform = platform.with_filesystem(Arc::new(fs));
    }
    if !cli.no_shell {
        platform = platform.with_process(Arc::new(LocalShell::new()));
    }

    info!(capabilities = ?platform.capabilities(), "Platform assembled");

    let registry = Arc::new(CommandRegistry::for_platform(&platform));
    let auth = cli.auth_config();
    if auth.is_some() {
        info!("Authenticated mode enabled");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start runtime");
            std::process::exit(1);
        }
    };

    let addr = cli.socket_addr();
    let result = runtime.block_on(async move {
        let listener = TcpListener::bind(addr).await?;
        let (state, shutdown) = AppState::new(registry, auth);
        let server = hostlink_server::serve(listener, state);
        tokio::select! {
            result = server => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                let _ = shutdown.send(true);
                Ok(())
            }
        }
    });

    if let Err(e) = result {
        error!(error = %e, "Server exited with error");
        std::process::exit(1);
    }
}
