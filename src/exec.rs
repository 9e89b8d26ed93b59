//! External command execution for the initiator management tool.

use crate::error::{ExternalTool, IscsiError};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::trace;

/// Command runner the interface and session helpers are written against.
/// Swappable so their invocation sequences are testable without a real
/// initiator daemon.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `command` with `args`, returning its stdout on success.
    async fn execute(&self, command: &str, args: &[&str]) -> Result<Vec<u8>, IscsiError>;
}

/// Executor backed by the host's binaries.
pub struct HostExec;

#[async_trait]
impl Executor for HostExec {
    async fn execute(&self, command: &str, args: &[&str]) -> Result<Vec<u8>, IscsiError> {
        let binary = which::which(command).map_err(|error| {
            ExternalTool {
                command,
                output: error.to_string(),
            }
            .build()
        })?;
        let output = Command::new(binary)
            .args(args)
            .output()
            .await
            .map_err(|error| {
                ExternalTool {
                    command,
                    output: error.to_string(),
                }
                .build()
            })?;
        trace!(command, ?args, status = ?output.status, "external command completed");
        if !output.status.success() {
            let mut combined = output.stdout;
            combined.extend_from_slice(&output.stderr);
            return ExternalTool {
                command,
                output: String::from_utf8_lossy(&combined).trim().to_string(),
            }
            .fail();
        }
        Ok(output.stdout)
    }
}
