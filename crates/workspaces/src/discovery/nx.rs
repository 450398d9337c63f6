//! Nx project discovery from `project.json` files.

use crate::discovery::{is_hoisted, is_ionic_manifest, read_json_file};
use crate::manifest::{MANIFEST_FILE, Manifest};
use crate::types::MonoRepoProject;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Marker file of an Nx workspace.
pub const NX_FILE: &str = "nx.json";

/// Per-project Nx configuration file.
pub const PROJECT_FILE: &str = "project.json";

const PROJECT_ROOTS: [&str; 3] = ["apps", "libs", "packages"];

#[derive(Deserialize)]
struct ProjectJson {
    name: Option<String>,
}

/// Projects under `apps/`, `libs/` and `packages/` that carry a `project.json`.
///
/// A workspace whose root holds `project.json` and nothing else is a
/// standalone Nx project and yields a single root member.
#[must_use]
pub fn get_nx_projects(root: &Path) -> Vec<MonoRepoProject> {
    let mut projects = Vec::new();

    for parent in PROJECT_ROOTS {
        let Ok(entries) = fs::read_dir(root.join(parent)) else {
            continue;
        };

        let mut dirs: Vec<_> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.join(PROJECT_FILE).is_file())
            .collect();
        dirs.sort();

        projects.extend(dirs.iter().filter_map(|dir| nx_member(root, dir)));
    }

    if projects.is_empty() && root.join(PROJECT_FILE).is_file() {
        if let Some(mut member) = nx_member(root, root) {
            member.is_standalone_nx_project = true;
            projects.push(member);
        }
    }

    projects
}

fn nx_member(root: &Path, folder: &Path) -> Option<MonoRepoProject> {
    let project: ProjectJson = match read_json_file(&folder.join(PROJECT_FILE)) {
        Ok(project) => project,
        Err(e) => {
            tracing::debug!(folder = %folder.display(), error = %e, "Skipping unreadable project.json");
            return None;
        }
    };

    let name = project.name.or_else(|| {
        folder
            .file_name()
            .and_then(|n| n.to_str())
            .map(ToString::to_string)
    })?;

    let mut member = MonoRepoProject::new(name, folder);
    member.has_local_manifest = folder.join(MANIFEST_FILE).is_file();
    member.node_modules_hoisted_to_root = is_hoisted(root, folder);

    // Nx members usually share the root manifest
    let manifest = if member.has_local_manifest {
        Manifest::load(folder).ok()
    } else {
        Manifest::load(root).ok()
    };
    member.is_ionic_project = manifest.as_ref().is_some_and(is_ionic_manifest);

    Some(member)
}
