//! Package manager, monorepo and framework detection.
//!
//! Detection never fails. When nothing matches, the most common answer is
//! returned (npm, [`MonoRepoKind::None`], [`FrameworkType::Unknown`]) and the
//! fallback is logged at debug level.
//!
//! # Examples
//!
//! ```no_run
//! use capkit_workspaces::detection::{detect_monorepo_type, detect_package_manager};
//! use capkit_workspaces::Manifest;
//! use std::path::Path;
//!
//! let root = Path::new("/path/to/project");
//! let manifest = Manifest::load(root)?;
//! let manager = detect_package_manager(root, &manifest);
//! let kind = detect_monorepo_type(root, &manifest, manager);
//! println!("{manager} / {kind}");
//! # Ok::<(), capkit_workspaces::Error>(())
//! ```

use crate::discovery::lerna::LERNA_FILE;
use crate::discovery::nx::NX_FILE;
use crate::discovery::pnpm_workspace::PNPM_WORKSPACE_FILE;
use crate::discovery::read_json_file;
use crate::error::Result;
use crate::manifest::Manifest;
use crate::types::{FrameworkType, MonoRepoKind, PackageManager};
use std::fs;
use std::path::Path;

/// Lockfiles in the order they are checked.
const LOCKFILE_PRECEDENCE: [PackageManager; 4] = [
    PackageManager::Bun,
    PackageManager::Pnpm,
    PackageManager::Yarn,
    PackageManager::Npm,
];

/// Everything a detection rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct DetectionInput<'a> {
    /// Project root.
    pub folder: &'a Path,
    /// Root manifest.
    pub manifest: &'a Manifest,
    /// Package manager, already classified.
    pub manager: PackageManager,
}

/// One step of the monorepo classification.
pub struct MonoRepoRule {
    /// Short label for logs.
    pub name: &'static str,
    /// Returns the kind when the rule's marker is present.
    pub check: fn(&DetectionInput<'_>) -> Option<MonoRepoKind>,
}

/// Monorepo classification rules. The first match wins, so the order of this
/// list is the precedence between coexisting markers.
pub const MONOREPO_RULES: &[MonoRepoRule] = &[
    MonoRepoRule {
        name: "nx",
        check: nx_marker,
    },
    MonoRepoRule {
        name: "pnpm-workspace",
        check: pnpm_workspace_marker,
    },
    MonoRepoRule {
        name: "lerna",
        check: lerna_marker,
    },
    MonoRepoRule {
        name: "workspaces",
        check: workspaces_field,
    },
];

fn nx_marker(input: &DetectionInput<'_>) -> Option<MonoRepoKind> {
    let marked = input.manifest.dependencies().exists("@nrwl/cli")
        || input.folder.join(NX_FILE).exists();
    marked.then_some(MonoRepoKind::Nx)
}

fn pnpm_workspace_marker(input: &DetectionInput<'_>) -> Option<MonoRepoKind> {
    input
        .folder
        .join(PNPM_WORKSPACE_FILE)
        .exists()
        .then_some(MonoRepoKind::Pnpm)
}

fn lerna_marker(input: &DetectionInput<'_>) -> Option<MonoRepoKind> {
    input
        .folder
        .join(LERNA_FILE)
        .exists()
        .then_some(MonoRepoKind::Lerna)
}

fn workspaces_field(input: &DetectionInput<'_>) -> Option<MonoRepoKind> {
    (!input.manifest.workspaces().is_empty()).then(|| MonoRepoKind::for_workspaces(input.manager))
}

/// Detects the package manager driving the project in `folder`.
///
/// Checked in order: the manifest `packageManager` field, then lockfiles
/// (`bun.lockb`/`bun.lock`, `pnpm-lock.yaml`, `yarn.lock`,
/// `package-lock.json`). Falls back to npm.
#[must_use]
pub fn detect_package_manager(folder: &Path, manifest: &Manifest) -> PackageManager {
    if let Some(manager) = manifest
        .package_manager_field()
        .and_then(parse_package_manager_hint)
    {
        tracing::debug!(manager = %manager, "Package manager from packageManager field");
        return manager;
    }

    if let Some(manager) = detect_from_lockfiles(folder) {
        tracing::debug!(manager = %manager, "Package manager from lockfile");
        return manager;
    }

    tracing::debug!(folder = %folder.display(), "No package manager markers, defaulting to npm");
    PackageManager::Npm
}

/// The first manager whose lockfile exists in `folder`.
#[must_use]
pub fn detect_from_lockfiles(folder: &Path) -> Option<PackageManager> {
    LOCKFILE_PRECEDENCE.into_iter().find(|manager| {
        manager
            .lockfile_names()
            .iter()
            .any(|name| folder.join(name).exists())
    })
}

/// Parses a `packageManager` value such as `yarn@3.6.1` or `pnpm`.
///
/// ```
/// use capkit_workspaces::detection::parse_package_manager_hint;
/// use capkit_workspaces::PackageManager;
///
/// assert_eq!(parse_package_manager_hint("yarn@3.6.1"), Some(PackageManager::Yarn));
/// assert_eq!(parse_package_manager_hint("PNPM"), Some(PackageManager::Pnpm));
/// assert_eq!(parse_package_manager_hint("deno@1.0.0"), None);
/// ```
#[must_use]
pub fn parse_package_manager_hint(hint: &str) -> Option<PackageManager> {
    let trimmed = hint.trim();
    if trimmed.is_empty() {
        return None;
    }

    let manager_name = match trimmed.split_once('@') {
        Some((name, _)) if !name.is_empty() => name,
        _ => trimmed,
    };

    manager_name.parse().ok()
}

/// Classifies the monorepo layout of `folder` with [`MONOREPO_RULES`].
///
/// `manager` must already be known: a `workspaces` array alone does not say
/// whose workspace it is.
#[must_use]
pub fn detect_monorepo_type(
    folder: &Path,
    manifest: &Manifest,
    manager: PackageManager,
) -> MonoRepoKind {
    let input = DetectionInput {
        folder,
        manifest,
        manager,
    };

    for rule in MONOREPO_RULES {
        if let Some(kind) = (rule.check)(&input) {
            tracing::debug!(rule = rule.name, kind = %kind, "Monorepo rule matched");
            return kind;
        }
    }

    MonoRepoKind::None
}

/// Detects the UI framework of the project in `folder`.
///
/// Any read or parse failure yields [`FrameworkType::Unknown`].
#[must_use]
pub fn detect_framework_type(folder: &Path) -> FrameworkType {
    match Manifest::load(folder) {
        Ok(manifest) => framework_from_manifest(folder, &manifest),
        Err(e) => {
            tracing::debug!(folder = %folder.display(), error = %e, "Framework unknown");
            FrameworkType::Unknown
        }
    }
}

/// Detects the UI framework from an already loaded manifest.
#[must_use]
pub fn framework_from_manifest(folder: &Path, manifest: &Manifest) -> FrameworkType {
    let dependencies = manifest.dependencies();

    if dependencies.exists("@angular/core") {
        return match is_angular_standalone(folder) {
            Ok(true) => FrameworkType::AngularStandalone,
            Ok(false) => FrameworkType::Angular,
            Err(e) => {
                tracing::debug!(error = %e, "Cannot inspect Angular workspace");
                FrameworkType::Unknown
            }
        };
    }

    let uses_vite = |plugin: &str| dependencies.exists("vite") || dependencies.exists(plugin);

    if dependencies.exists("react") {
        return if uses_vite("@vitejs/plugin-react") {
            FrameworkType::ReactVite
        } else {
            FrameworkType::React
        };
    }

    if dependencies.exists("vue") {
        return if uses_vite("@vitejs/plugin-vue") {
            FrameworkType::VueVite
        } else {
            FrameworkType::Vue
        };
    }

    FrameworkType::Unknown
}

const STANDALONE_BUILDERS: [&str; 2] = [
    "@angular-devkit/build-angular:application",
    "@angular/build:application",
];

/// An Angular app is standalone when its build uses the application builder
/// or its `main.ts` bootstraps a component directly.
fn is_angular_standalone(folder: &Path) -> Result<bool> {
    let angular_json = folder.join("angular.json");
    if angular_json.exists() {
        let config: serde_json::Value = read_json_file(&angular_json)?;
        let uses_application_builder = config
            .get("projects")
            .and_then(serde_json::Value::as_object)
            .is_some_and(|projects| {
                projects.values().any(|project| {
                    project
                        .pointer("/architect/build/builder")
                        .and_then(serde_json::Value::as_str)
                        .is_some_and(|builder| STANDALONE_BUILDERS.contains(&builder))
                })
            });
        if uses_application_builder {
            return Ok(true);
        }
    }

    let main_ts = folder.join("src").join("main.ts");
    if main_ts.exists() {
        let source = fs::read_to_string(&main_ts).map_err(|e| crate::Error::Io {
            source: e,
            path: Some(main_ts.clone()),
            operation: "reading main.ts".to_string(),
        })?;
        return Ok(source.contains("bootstrapApplication"));
    }

    Ok(false)
}
