//! Local shell execution capability.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use hostlink_core::{Error, Result};

use crate::capability::{CommandOutput, ProcessOps};

/// Runs commands through `sh -c`, capturing stdout/stderr and the exit code.
#[derive(Debug, Clone)]
pub struct LocalShell {
    shell: String,
    default_timeout: Duration,
}

impl Default for LocalShell {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalShell {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
            default_timeout: Duration::from_secs(60),
        }
    }

    /// Use a specific shell binary instead of `sh`.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Timeout applied when the envelope doesn't carry one.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }
}

#[async_trait]
impl ProcessOps for LocalShell {
    async fn run_command(&self, command: &str, timeout: Option<Duration>) -> Result<CommandOutput> {
        debug!(command, "Executing shell command");

        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let limit = timeout.unwrap_or(self.default_timeout);
        let output = tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| Error::Timeout)??;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            // Terminated by signal: no exit code, report -1 like the shell.
            return_code: output.status.code().map(i64::from).unwrap_or(-1),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let shell = LocalShell::new();
        let out = shell.run_command("echo hello", None).await.unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.return_code, 0);
        assert!(out.stderr.is_empty());
    }

    #[tokio::test]
    async fn captures_stderr_and_nonzero_exit() {
        let shell = LocalShell::new();
        let out = shell
            .run_command("echo oops >&2; exit 3", None)
            .await
            .unwrap();
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.return_code, 3);
    }

    #[tokio::test]
    async fn timeout_kills_slow_commands() {
        let shell = LocalShell::new();
        let result = shell
            .run_command("sleep 10", Some(Duration::from_millis(100)))
            .await;
        assert!(matches!(result, Err(Error::Timeout)));
    }
}
