//! Error types for manifest loading and project classification.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for workspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or classifying a project.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No `package.json` at the expected location.
    #[error("Manifest file not found at path: {path}")]
    #[diagnostic(
        code(capkit::workspaces::manifest_not_found),
        help("Point capkit at a folder that contains a package.json (or at a folder of projects)")
    )]
    ManifestNotFound {
        /// The path where the manifest was expected.
        path: PathBuf,
    },

    /// The manifest exists but is not a valid `package.json` document.
    #[error("Failed to parse manifest at {path}: {source}")]
    #[diagnostic(
        code(capkit::workspaces::manifest_malformed),
        help("Fix the JSON syntax of package.json; dependency versions must be strings")
    )]
    ManifestMalformed {
        /// Path to the manifest.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Monorepo member not found.
    #[error("Project '{name}' not found in workspace at {workspace_root}")]
    #[diagnostic(
        code(capkit::workspaces::member_not_found),
        help("Run 'capkit info' to list the projects capkit discovered")
    )]
    MemberNotFound {
        /// Name of the missing member.
        name: String,
        /// Root of the workspace where the member was expected.
        workspace_root: PathBuf,
    },

    /// A package manager name that is not one of npm, yarn, pnpm or bun.
    #[error("Unsupported package manager: {value}")]
    #[diagnostic(
        code(capkit::workspaces::unsupported_manager),
        help("Supported package managers: npm, yarn, pnpm, bun")
    )]
    UnsupportedPackageManager {
        /// The rejected value.
        value: String,
    },

    /// A monorepo kind name that capkit does not know.
    #[error("Unsupported monorepo type: {value}")]
    #[diagnostic(
        code(capkit::workspaces::unsupported_monorepo),
        help("Supported values: none, nx, turborepo, pnpm, lerna, npm, yarn, bun, folder")
    )]
    UnsupportedMonoRepo {
        /// The rejected value.
        value: String,
    },

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(capkit::workspaces::io_error),
        help("Check that the referenced paths exist and that you have permission to read them")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// JSON parsing error in a secondary config file (`lerna.json`, `project.json`, ...).
    #[error("JSON parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(capkit::workspaces::json_error),
        help("Ensure the JSON has valid syntax")
    )]
    Json {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },

    /// YAML parsing error (`pnpm-workspace.yaml`).
    #[error("YAML parsing error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(capkit::workspaces::yaml_error),
        help("Ensure pnpm-workspace.yaml has valid syntax and a 'packages' list")
    )]
    Yaml {
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
        /// Optional path to the file being parsed.
        path: Option<PathBuf>,
    },
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "file operation".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source, path: None }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Yaml { source, path: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;
    use std::path::PathBuf;

    #[test]
    fn test_manifest_not_found_error() {
        let error = Error::ManifestNotFound {
            path: PathBuf::from("/app/package.json"),
        };

        let message = error.to_string();
        assert!(message.contains("Manifest file not found"));
        assert!(message.contains("/app/package.json"));
    }

    #[test]
    fn test_manifest_malformed_error() {
        let source = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let error = Error::ManifestMalformed {
            path: PathBuf::from("/app/package.json"),
            source,
        };

        let message = error.to_string();
        assert!(message.contains("Failed to parse manifest"));
        assert!(message.contains("/app/package.json"));
    }

    #[test]
    fn test_member_not_found_error() {
        let error = Error::MemberNotFound {
            name: "my-app".to_string(),
            workspace_root: PathBuf::from("/repo"),
        };

        let message = error.to_string();
        assert!(message.contains("my-app"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn test_io_error_no_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = Error::Io {
            source: io_error,
            path: None,
            operation: "listing projects".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("I/O error during listing projects"));
        assert!(!message.contains(" at "));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let error: Error = io_error.into();

        match error {
            Error::Io {
                path, operation, ..
            } => {
                assert_eq!(path, None);
                assert_eq!(operation, "file operation");
            }
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_yaml_error_diagnostics() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: Error = yaml_error.into();

        assert_eq!(
            error.code().map(|c| c.to_string()),
            Some("capkit::workspaces::yaml_error".to_string())
        );
        assert!(error.help().is_some());
    }

    #[test]
    fn test_diagnostic_codes() {
        let errors = [
            Error::ManifestNotFound {
                path: PathBuf::from("/test"),
            },
            Error::MemberNotFound {
                name: "test".to_string(),
                workspace_root: PathBuf::from("/test"),
            },
            Error::UnsupportedPackageManager {
                value: "poetry".to_string(),
            },
            Error::UnsupportedMonoRepo {
                value: "rush".to_string(),
            },
        ];

        for error in &errors {
            assert!(error.code().is_some());
            assert!(error.help().is_some());
        }
    }
}
