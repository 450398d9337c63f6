//! Monorepo member discovery.
//!
//! Every topology resolves to a list of [`MonoRepoProject`]s:
//! - plain folders: immediate sub-directories holding a named `package.json`
//! - npm / Yarn / Bun: the manifest `workspaces` field
//! - pnpm: `pnpm-workspace.yaml`
//! - Lerna: `lerna.json`
//! - Nx: `project.json` files under `apps/`, `libs/` and `packages/`
//!
//! Discovery is best effort. A member whose manifest is missing, unreadable or
//! unnamed is skipped and never aborts the scan.

use crate::error::{Error, Result};
use crate::manifest::{MANIFEST_FILE, Manifest};
use crate::types::{MonoRepoKind, MonoRepoProject};
use glob::{MatchOptions, Pattern};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub mod lerna;
pub mod nx;
pub mod pnpm_workspace;

/// Name of the folder package managers install into.
pub const NODE_MODULES: &str = "node_modules";

const PRUNED_DIRS: [&str; 4] = [NODE_MODULES, ".git", "target", "dist"];

/// Resolves glob patterns to find directories, handling exclusions.
///
/// Literal relative paths (`apps/web`) are patterns too and match exactly.
/// Patterns starting with `!` exclude. `*` does not cross a path separator;
/// use `**` for that.
///
/// # Returns
///
/// A sorted list of unique, absolute paths (rooted under `root`) that match the patterns and are not excluded.
/// Patterns that are not valid globs are skipped.
#[must_use]
pub fn resolve_glob_patterns(root: &Path, patterns: &[String]) -> Vec<PathBuf> {
    let mut matched_paths = HashSet::new();
    let mut inclusion_patterns = Vec::new();
    let mut exclusion_patterns = Vec::new();

    for p in patterns {
        let p = p.trim_start_matches("./").trim_end_matches('/');
        let (excluded, glob) = match p.strip_prefix('!') {
            Some(stripped) => (true, stripped.trim_start_matches("./")),
            None => (false, p),
        };
        match Pattern::new(glob) {
            Ok(pat) if excluded => exclusion_patterns.push(pat),
            Ok(pat) => inclusion_patterns.push(pat),
            Err(e) => {
                tracing::debug!(pattern = %p, error = %e, "Skipping invalid workspace pattern");
            }
        }
    }

    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::default()
    };

    let walker = WalkDir::new(root).follow_links(false);

    for entry in walker
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            e.depth() == 0 || !PRUNED_DIRS.contains(&name)
        })
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if path == root {
            continue;
        }

        let Ok(rel_path) = path.strip_prefix(root) else {
            continue;
        };

        if exclusion_patterns
            .iter()
            .any(|p| p.matches_path_with(rel_path, options))
        {
            continue;
        }

        if inclusion_patterns
            .iter()
            .any(|p| p.matches_path_with(rel_path, options))
        {
            matched_paths.insert(path.to_path_buf());
        }
    }

    let mut result: Vec<PathBuf> = matched_paths.into_iter().collect();
    result.sort();
    result
}

/// Reads and parses a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as valid JSON.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::Io {
        source: e,
        path: Some(path.to_path_buf()),
        operation: "reading json file".to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| Error::Json {
        source: e,
        path: Some(path.to_path_buf()),
    })
}

/// Reads and parses a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed as valid YAML.
pub fn read_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::Io {
        source: e,
        path: Some(path.to_path_buf()),
        operation: "reading yaml file".to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| Error::Yaml {
        source: e,
        path: Some(path.to_path_buf()),
    })
}

/// Builds a member from a folder holding a named `package.json`.
///
/// Returns `None`, and logs at debug level, when the manifest is missing,
/// malformed or has no `name`.
#[must_use]
pub fn member_from_folder(root: &Path, folder: &Path) -> Option<MonoRepoProject> {
    let manifest = match Manifest::load(folder) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::debug!(folder = %folder.display(), error = %e, "Skipping folder without a usable manifest");
            return None;
        }
    };

    let Some(name) = manifest.name() else {
        tracing::debug!(folder = %folder.display(), "Skipping manifest without a name");
        return None;
    };

    let mut member = MonoRepoProject::new(name, folder);
    member.has_local_manifest = true;
    member.is_ionic_project = is_ionic_manifest(&manifest);
    member.node_modules_hoisted_to_root = is_hoisted(root, folder);
    Some(member)
}

/// Immediate sub-directories of `folder` that are projects in their own right.
#[must_use]
pub fn get_folder_based_projects(folder: &Path) -> Vec<MonoRepoProject> {
    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(folder = %folder.display(), error = %e, "Cannot list folder");
            return Vec::new();
        }
    };

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| !n.starts_with('.') && !PRUNED_DIRS.contains(&n))
        })
        .collect();
    dirs.sort();

    dirs.iter()
        .filter_map(|dir| member_from_folder(folder, dir))
        .collect()
}

/// Members named by workspace paths or patterns relative to `folder`.
#[must_use]
pub fn get_workspace_projects(folder: &Path, workspace_patterns: &[String]) -> Vec<MonoRepoProject> {
    resolve_glob_patterns(folder, workspace_patterns)
        .iter()
        .filter(|path| path.join(MANIFEST_FILE).is_file())
        .filter_map(|path| member_from_folder(folder, path))
        .collect()
}

/// Discovers the members of a repository already classified as `kind`.
#[must_use]
pub fn discover_projects(
    folder: &Path,
    kind: MonoRepoKind,
    manifest: &Manifest,
) -> Vec<MonoRepoProject> {
    let projects = match kind {
        MonoRepoKind::None | MonoRepoKind::Turborepo => Vec::new(),
        MonoRepoKind::Folder => get_folder_based_projects(folder),
        MonoRepoKind::Nx => nx::get_nx_projects(folder),
        MonoRepoKind::Pnpm => {
            get_workspace_projects(folder, &pnpm_workspace::workspace_patterns(folder))
        }
        MonoRepoKind::Lerna => get_workspace_projects(folder, &lerna::workspace_patterns(folder)),
        MonoRepoKind::Npm | MonoRepoKind::Yarn | MonoRepoKind::Bun => {
            get_workspace_projects(folder, manifest.workspaces())
        }
    };

    tracing::debug!(kind = %kind, count = projects.len(), "Discovered monorepo projects");
    projects
}

pub(crate) fn is_ionic_manifest(manifest: &Manifest) -> bool {
    let dependencies = manifest.dependencies();
    dependencies.exists("@capacitor/core") || !dependencies.matching_prefix("@ionic/").is_empty()
}

pub(crate) fn is_hoisted(root: &Path, folder: &Path) -> bool {
    folder != root && !folder.join(NODE_MODULES).is_dir() && root.join(NODE_MODULES).is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_package(dir: &Path, body: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), body).unwrap();
    }

    #[test]
    fn test_resolve_glob_patterns_basic() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("packages/a/src")).unwrap();
        fs::create_dir_all(root.join("packages/b")).unwrap();
        fs::create_dir_all(root.join("apps/app1")).unwrap();

        let patterns = vec!["packages/*".to_string()];
        let result = resolve_glob_patterns(root, &patterns);

        assert_eq!(result.len(), 2);
        assert!(result.iter().any(|p| p.ends_with("packages/a")));
        assert!(result.iter().any(|p| p.ends_with("packages/b")));
    }

    #[test]
    fn test_resolve_glob_patterns_negation_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("packages/a")).unwrap();
        fs::create_dir_all(root.join("packages/ignored")).unwrap();

        let patterns = vec!["packages/*".to_string(), "!packages/ignored".to_string()];
        let result = resolve_glob_patterns(root, &patterns);

        assert_eq!(result.len(), 1);
        assert!(result[0].ends_with("packages/a"));
    }

    #[test]
    fn test_resolve_glob_patterns_literal_path() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("apps/web")).unwrap();
        fs::create_dir_all(root.join("apps/mobile")).unwrap();

        let patterns = vec!["./apps/web/".to_string()];
        let result = resolve_glob_patterns(root, &patterns);

        assert_eq!(result, vec![root.join("apps/web")]);
    }

    #[test]
    fn test_resolve_glob_patterns_skips_node_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("packages/a")).unwrap();
        fs::create_dir_all(root.join("node_modules/package")).unwrap();

        let patterns = vec!["**/*".to_string()];
        let result = resolve_glob_patterns(root, &patterns);

        assert!(!result.iter().any(|p| p.to_string_lossy().contains(NODE_MODULES)));
    }

    #[test]
    fn test_resolve_glob_patterns_skips_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("packages/a")).unwrap();

        let patterns = vec!["packages/*".to_string(), "[bad".to_string(), "![worse".to_string()];
        let result = resolve_glob_patterns(root, &patterns);

        assert_eq!(result, vec![root.join("packages/a")]);
    }

    #[test]
    fn test_workspace_projects_survive_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write_package(&root.join("packages/ui"), r#"{"name": "@acme/ui"}"#);

        let good = get_workspace_projects(root, &["packages/*".to_string()]);
        let mixed = get_workspace_projects(root, &["packages/*".to_string(), "[bad".to_string()]);

        assert_eq!(good.len(), 1);
        assert_eq!(mixed, good);
    }

    #[test]
    fn test_folder_projects_skip_invalid_members() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write_package(&root.join("alpha"), r#"{"name": "alpha"}"#);
        write_package(&root.join("broken"), "{ not json");
        write_package(&root.join("unnamed"), r#"{"version": "1.0.0"}"#);
        fs::create_dir_all(root.join("empty")).unwrap();
        write_package(
            &root.join("mobile"),
            r#"{"name": "mobile", "dependencies": {"@capacitor/core": "5.0.0"}}"#,
        );

        let projects = get_folder_based_projects(root);
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "mobile"]);
        assert!(projects.iter().all(|p| p.has_local_manifest));
        assert!(!projects[0].is_ionic_project);
        assert!(projects[1].is_ionic_project);
    }

    #[test]
    fn test_folder_projects_missing_folder() {
        assert!(get_folder_based_projects(Path::new("/nonexistent/capkit")).is_empty());
    }

    #[test]
    fn test_workspace_projects_hoisting() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join(NODE_MODULES)).unwrap();
        write_package(&root.join("packages/ui"), r#"{"name": "@acme/ui"}"#);
        write_package(&root.join("packages/app"), r#"{"name": "app", "dependencies": {"@ionic/angular": "7.0.0"}}"#);
        fs::create_dir_all(root.join("packages/app").join(NODE_MODULES)).unwrap();

        let projects = get_workspace_projects(root, &["packages/*".to_string()]);
        assert_eq!(projects.len(), 2);

        let app = projects.iter().find(|p| p.name == "app").unwrap();
        assert!(!app.node_modules_hoisted_to_root);
        assert!(app.is_ionic_project);

        let ui = projects.iter().find(|p| p.name == "@acme/ui").unwrap();
        assert!(ui.node_modules_hoisted_to_root);
    }

    #[test]
    fn test_read_json_file_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("test.json");
        fs::write(&file, r#"{"invalid json"#).unwrap();

        let result: Result<serde_json::Value> = read_json_file(&file);
        assert!(matches!(result, Err(Error::Json { .. })));
    }

    #[test]
    fn test_read_yaml_file_valid() {
        #[derive(serde::Deserialize)]
        struct TestData {
            name: String,
        }

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("test.yaml");
        fs::write(&file, "name: test").unwrap();

        let data: TestData = read_yaml_file(&file).unwrap();
        assert_eq!(data.name, "test");
    }
}
