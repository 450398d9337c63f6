//! Member patterns declared in `pnpm-workspace.yaml`.

use crate::discovery::read_yaml_file;
use serde::Deserialize;
use std::path::Path;

/// Marker file of a pnpm workspace.
pub const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

#[derive(Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

/// The `packages` list of `pnpm-workspace.yaml`, or nothing if it cannot be read.
#[must_use]
pub fn workspace_patterns(root: &Path) -> Vec<String> {
    let path = root.join(PNPM_WORKSPACE_FILE);
    match read_yaml_file::<PnpmWorkspace>(&path) {
        Ok(config) => config.packages,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unreadable pnpm-workspace.yaml");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reads_packages_list() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(PNPM_WORKSPACE_FILE),
            "packages:\n  - 'apps/*'\n  - 'packages/*'\n  - '!**/test/**'\n",
        )
        .unwrap();

        assert_eq!(
            workspace_patterns(temp_dir.path()),
            vec!["apps/*", "packages/*", "!**/test/**"]
        );
    }

    #[test]
    fn test_empty_file_yields_no_patterns() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(PNPM_WORKSPACE_FILE), "").unwrap();
        assert!(workspace_patterns(temp_dir.path()).is_empty());
    }
}
