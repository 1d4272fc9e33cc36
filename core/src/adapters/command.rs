//! Command runner backed by `tokio::process`.

use std::process::Stdio;

use tokio::process::Command;
use tracing::trace;

use crate::error::{Error, Result};
use crate::ports::{CommandRunner, Invocation};

/// Runs invocations as real child processes.
///
/// Standard input and standard error are detached; standard output is decoded
/// lossily so a stray non-UTF-8 byte in an interface description does not
/// throw away the whole table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    async fn execute(&self, invocation: &Invocation) -> Result<Vec<String>> {
        trace!(command = %invocation, "Spawning command");

        let output = Command::new(invocation.program())
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                Error::CommandFailed(format!("Failed to run {}: {}", invocation.program(), e))
            })?;

        if !output.status.success() {
            return Err(Error::NonZeroExit {
                program: invocation.program().to_string(),
                code: output.status.code(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().map(str::to_string).collect())
    }
}
