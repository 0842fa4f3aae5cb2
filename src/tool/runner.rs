//! External tool invocation
//!
//! Spawns the configured headsetcontrol binary once per query and captures
//! standard output. Standard error is not captured and is not part of the
//! contract. Every invocation is independent: no process reuse, no pooling.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Sentinel for "no usable output" (spawn failure, missing field).
pub const SENTINEL: &str = "N/A";

/// Why an invocation produced no output.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("malformed command line: {0}")]
    Split(#[from] shell_words::ParseError),

    #[error("failed to run {command}: {source}")]
    Run {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} did not finish within {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Seam for invoking the external tool; mocked in scheduler tests.
pub trait ToolRunner: Send + Sync {
    fn execute(
        &self,
        command_line: &str,
    ) -> impl Future<Output = Result<String, ExecutionError>> + Send;
}

impl<T: ToolRunner> ToolRunner for std::sync::Arc<T> {
    fn execute(
        &self,
        command_line: &str,
    ) -> impl Future<Output = Result<String, ExecutionError>> + Send {
        (**self).execute(command_line)
    }
}

/// The real headsetcontrol invoker.
pub struct HeadsetTool {
    timeout: Duration,
}

impl HeadsetTool {
    /// A hung tool binary would stall every later refresh, so each
    /// invocation is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ToolRunner for HeadsetTool {
    fn execute(
        &self,
        command_line: &str,
    ) -> impl Future<Output = Result<String, ExecutionError>> + Send {
        let command_line = command_line.to_string();
        let timeout = self.timeout;
        async move {
            let argv = shell_words::split(&command_line)?;
            let (program, args) = argv.split_first().ok_or(ExecutionError::EmptyCommand)?;

            debug!(command = %command_line, "invoking tool");
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .kill_on_drop(true);

            let child = command.spawn().map_err(|source| ExecutionError::Run {
                command: command_line.clone(),
                source,
            })?;

            let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(result) => result.map_err(|source| ExecutionError::Run {
                    command: command_line.clone(),
                    source,
                })?,
                Err(_) => {
                    return Err(ExecutionError::Timeout {
                        command: command_line,
                        timeout,
                    })
                }
            };

            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
    }
}

/// Reduce a legacy (non-JSON) invocation's stdout to its single value.
///
/// The first newline and the first literal `Success!` each collapse into a
/// separator; the value is whatever sits after the first separator. Output
/// with no separator at all carries no value.
pub fn legacy_value(stdout: &str) -> Option<String> {
    let marked = stdout
        .replacen('\n', "###", 1)
        .replacen("Success!", "###", 1);
    marked.split("###").nth(1).map(|v| v.to_string())
}

/// Invoke a legacy command and return its single value, or the sentinel on
/// any failure. Errors are logged and absorbed here; callers only ever see
/// a string.
pub async fn invoke_legacy<R: ToolRunner>(runner: &R, command_line: &str) -> String {
    match runner.execute(command_line).await {
        Ok(stdout) => legacy_value(&stdout).unwrap_or_else(|| SENTINEL.to_string()),
        Err(err) => {
            tracing::warn!(%err, "tool invocation failed");
            SENTINEL.to_string()
        }
    }
}

/// Invoke the combined JSON status command; trimmed raw stdout, or the
/// sentinel on any failure.
pub async fn invoke_json<R: ToolRunner>(runner: &R, command_line: &str) -> String {
    match runner.execute(command_line).await {
        Ok(stdout) => stdout.trim().to_string(),
        Err(err) => {
            tracing::warn!(%err, "tool invocation failed");
            SENTINEL.to_string()
        }
    }
}
