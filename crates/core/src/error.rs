//! Error types for the capkit core.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading a project or running a synthesized command.
///
/// A command that runs and exits non-zero is not an error; it is reported
/// through [`crate::ExecOutput::success`].
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Loading or classifying the project failed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Workspace(#[from] capkit_workspaces::Error),

    /// The shell could not be started or awaited.
    #[error("Failed to run command '{command}': {source}")]
    #[diagnostic(
        code(capkit::core::spawn),
        help("Check that the package manager is installed and on PATH")
    )]
    Spawn {
        /// The command line handed to the shell.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The command ran past its deadline and was killed.
    #[error("Command '{command}' timed out after {timeout_ms} ms")]
    #[diagnostic(
        code(capkit::core::timeout),
        help("Raise --timeout-ms or run the command without a timeout")
    )]
    Timeout {
        /// The command line handed to the shell.
        command: String,
        /// The deadline that elapsed.
        timeout_ms: u64,
    },

    /// A blocking load task panicked or was cancelled.
    #[error("Background task failed: {source}")]
    #[diagnostic(code(capkit::core::join))]
    Join {
        /// The underlying join error.
        #[source]
        source: tokio::task::JoinError,
    },
}

impl Error {
    /// Create a spawn error for `command`.
    #[must_use]
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(source: tokio::task::JoinError) -> Self {
        Self::Join { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_workspace_error_is_transparent() {
        let inner = capkit_workspaces::Error::ManifestNotFound {
            path: PathBuf::from("/tmp/app/package.json"),
        };
        let expected = inner.to_string();
        let err: Error = inner.into();
        assert_eq!(err.to_string(), expected);
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("capkit::workspaces::manifest_not_found".to_string())
        );
    }

    #[test]
    fn test_timeout_message() {
        let err = Error::Timeout {
            command: "npm install".to_string(),
            timeout_ms: 500,
        };
        assert_eq!(err.to_string(), "Command 'npm install' timed out after 500 ms");
    }

    #[test]
    fn test_spawn_helper() {
        let err = Error::spawn(
            "pnpm install",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(matches!(err, Error::Spawn { ref command, .. } if command == "pnpm install"));
    }
}
