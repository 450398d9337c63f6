//! Running synthesized command lines.
//!
//! [`CommandExecutor`] is the seam between command synthesis and the outside
//! world; [`ShellExecutor`] is the tokio implementation that hands the line to
//! the platform shell.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Per-call execution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// Working directory; the current directory when `None`.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables layered over the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Kill the command after this many milliseconds.
    pub timeout_ms: Option<u64>,
}

impl ExecOptions {
    /// Options that run in `cwd`.
    #[must_use]
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Self::default()
        }
    }
}

/// What a finished command produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecOutput {
    /// Exit code; `None` when the platform reports none.
    pub exit_code: Option<i32>,
    /// Stdout and stderr lines, newline-terminated, in arrival order.
    pub combined_output: String,
    /// True iff the exit code is 0 or absent.
    pub success: bool,
}

impl ExecOutput {
    /// Builds an output, deriving `success` from the exit code.
    #[must_use]
    pub fn new(exit_code: Option<i32>, combined_output: String) -> Self {
        Self {
            exit_code,
            combined_output,
            success: exit_code.is_none_or(|code| code == 0),
        }
    }
}

/// Something that can run a command line.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs `command` and returns its aggregated output.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be started or times out. A
    /// non-zero exit is reported through [`ExecOutput::success`].
    async fn execute(&self, command: &str, options: &ExecOptions) -> Result<ExecOutput> {
        self.execute_streaming(command, options, &|_line: &str| {}).await
    }

    /// Like [`CommandExecutor::execute`], also calling `on_line` for every
    /// output line as it arrives.
    ///
    /// # Errors
    ///
    /// Same as [`CommandExecutor::execute`].
    async fn execute_streaming(
        &self,
        command: &str,
        options: &ExecOptions,
        on_line: &(dyn for<'l> Fn(&'l str) + Send + Sync),
    ) -> Result<ExecOutput>;
}

/// Runs commands through `sh -c` (or `cmd /C` on Windows).
///
/// On unix the shell leads its own process group, so a timeout also kills
/// whatever the command line started.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    /// Creates a shell executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn shell_command(command: &str) -> Command {
        let (shell, flag) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(command);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    let Ok(pid) = i32::try_from(pid) else {
        return;
    };
    // SAFETY: a negative pid signals the process group the shell leads,
    // created at spawn and not yet reaped.
    #[expect(unsafe_code, reason = "Required for POSIX signal handling")]
    unsafe {
        libc::kill(-pid, libc::SIGKILL);
    }
}

async fn forward_lines<R>(reader: R, sender: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if sender.send(line).is_err() {
            break;
        }
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute_streaming(
        &self,
        command: &str,
        options: &ExecOptions,
        on_line: &(dyn for<'l> Fn(&'l str) + Send + Sync),
    ) -> Result<ExecOutput> {
        tracing::info!(command = %command, cwd = ?options.cwd, "Executing command");

        let mut cmd = Self::shell_command(command);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        cmd.envs(&options.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| Error::spawn(command, e))?;
        #[cfg(unix)]
        let pid = child.id();

        let stdout = child.stdout.take().ok_or_else(|| {
            Error::spawn(command, std::io::Error::other("stdout pipe not available"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            Error::spawn(command, std::io::Error::other("stderr pipe not available"))
        })?;

        let (sender, mut receiver) = mpsc::unbounded_channel();
        let stdout_task = tokio::spawn(forward_lines(stdout, sender.clone()));
        let stderr_task = tokio::spawn(forward_lines(stderr, sender));

        let run = async {
            let mut combined_output = String::new();
            while let Some(line) = receiver.recv().await {
                on_line(&line);
                combined_output.push_str(&line);
                combined_output.push('\n');
            }
            let status = child.wait().await;
            (combined_output, status)
        };

        let finished = match options.timeout_ms {
            Some(timeout_ms) => tokio::time::timeout(Duration::from_millis(timeout_ms), run)
                .await
                .ok(),
            None => Some(run.await),
        };

        let Some((combined_output, status)) = finished else {
            stdout_task.abort();
            stderr_task.abort();
            #[cfg(unix)]
            if let Some(pid) = pid {
                kill_process_group(pid);
            }
            if let Err(e) = child.kill().await {
                tracing::warn!(command = %command, error = %e, "Failed to kill timed out command");
            }
            let timeout_ms = options.timeout_ms.unwrap_or_default();
            tracing::warn!(command = %command, timeout_ms, "Command timed out");
            return Err(Error::Timeout {
                command: command.to_string(),
                timeout_ms,
            });
        };

        let status = status.map_err(|e| Error::spawn(command, e))?;
        let output = ExecOutput::new(status.code(), combined_output);
        if output.success {
            tracing::debug!(command = %command, exit_code = ?output.exit_code, "Command finished");
        } else {
            tracing::warn!(command = %command, exit_code = ?output.exit_code, "Command failed");
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_follows_exit_code() {
        assert!(ExecOutput::new(Some(0), String::new()).success);
        assert!(ExecOutput::new(None, String::new()).success);
        assert!(!ExecOutput::new(Some(1), String::new()).success);
        assert!(!ExecOutput::new(Some(-1), String::new()).success);
    }

    #[test]
    fn test_exec_output_serializes_camel_case() {
        let output = ExecOutput::new(Some(2), "boom\n".to_string());
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["exitCode"], 2);
        assert_eq!(value["combinedOutput"], "boom\n");
        assert_eq!(value["success"], false);
    }

    #[test]
    fn test_exec_options_in_dir() {
        let options = ExecOptions::in_dir("/repo");
        assert_eq!(options.cwd, Some(PathBuf::from("/repo")));
        assert!(options.env.is_empty());
        assert_eq!(options.timeout_ms, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_executor_captures_output() {
        let output = ShellExecutor::new()
            .execute("echo hello", &ExecOptions::default())
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.exit_code, Some(0));
        assert_eq!(output.combined_output, "hello\n");
    }
}
