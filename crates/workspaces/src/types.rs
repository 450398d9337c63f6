//! Core types for describing package managers, monorepo topologies and their members.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Identifies the package manager a project is driven with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm package manager
    #[default]
    Npm,
    /// Yarn (any major version)
    Yarn,
    /// pnpm package manager
    Pnpm,
    /// Bun package manager
    Bun,
}

impl PackageManager {
    /// Every supported manager.
    pub const ALL: [Self; 4] = [Self::Npm, Self::Yarn, Self::Pnpm, Self::Bun];

    /// Returns the lockfile names this manager writes, most current format first.
    ///
    /// # Example
    ///
    /// ```
    /// use capkit_workspaces::PackageManager;
    ///
    /// assert_eq!(PackageManager::Npm.lockfile_names(), &["package-lock.json"]);
    /// assert_eq!(PackageManager::Bun.lockfile_names(), &["bun.lockb", "bun.lock"]);
    /// ```
    #[must_use]
    pub const fn lockfile_names(&self) -> &'static [&'static str] {
        match self {
            Self::Npm => &["package-lock.json"],
            Self::Yarn => &["yarn.lock"],
            Self::Pnpm => &["pnpm-lock.yaml"],
            Self::Bun => &["bun.lockb", "bun.lock"],
        }
    }

    /// The executable name, as typed on a command line.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManager {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "npm" => Ok(Self::Npm),
            "yarn" => Ok(Self::Yarn),
            "pnpm" => Ok(Self::Pnpm),
            "bun" => Ok(Self::Bun),
            _ => Err(Error::UnsupportedPackageManager {
                value: s.to_string(),
            }),
        }
    }
}

/// The scheme by which a repository hosts several installable projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonoRepoKind {
    /// A single project.
    #[default]
    None,
    /// Nx workspace.
    Nx,
    /// Turborepo.
    Turborepo,
    /// pnpm workspace (`pnpm-workspace.yaml`).
    Pnpm,
    /// Lerna (`lerna.json`).
    Lerna,
    /// npm workspaces.
    Npm,
    /// Yarn workspaces.
    Yarn,
    /// Bun workspaces.
    Bun,
    /// A plain folder whose sub-folders are independent projects.
    Folder,
}

impl MonoRepoKind {
    /// Topologies where every member is installed from inside its own folder.
    #[must_use]
    pub const fn installs_per_project(&self) -> bool {
        matches!(self, Self::Folder | Self::Lerna | Self::Pnpm)
    }

    /// Workspace-array topologies, keyed by the manager that owns them.
    #[must_use]
    pub const fn for_workspaces(manager: PackageManager) -> Self {
        match manager {
            PackageManager::Npm | PackageManager::Pnpm => Self::Npm,
            PackageManager::Yarn => Self::Yarn,
            PackageManager::Bun => Self::Bun,
        }
    }

    /// Lowercase name used in config and JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Nx => "nx",
            Self::Turborepo => "turborepo",
            Self::Pnpm => "pnpm",
            Self::Lerna => "lerna",
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Bun => "bun",
            Self::Folder => "folder",
        }
    }
}

impl fmt::Display for MonoRepoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonoRepoKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "nx" => Ok(Self::Nx),
            "turbo" | "turborepo" => Ok(Self::Turborepo),
            "pnpm" => Ok(Self::Pnpm),
            "lerna" => Ok(Self::Lerna),
            "npm" => Ok(Self::Npm),
            "yarn" => Ok(Self::Yarn),
            "bun" => Ok(Self::Bun),
            "folder" | "plain-folder" => Ok(Self::Folder),
            _ => Err(Error::UnsupportedMonoRepo {
                value: s.to_string(),
            }),
        }
    }
}

/// UI framework a project is built with, refined by its build tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrameworkType {
    /// Angular bootstrapped without NgModules.
    AngularStandalone,
    /// Angular with NgModules.
    Angular,
    /// React built with Vite.
    ReactVite,
    /// React with another bundler.
    React,
    /// Vue built with Vite.
    VueVite,
    /// Vue with another bundler.
    Vue,
    /// Not recognised.
    #[default]
    Unknown,
}

impl fmt::Display for FrameworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AngularStandalone => "angular-standalone",
            Self::Angular => "angular",
            Self::ReactVite => "react-vite",
            Self::React => "react",
            Self::VueVite => "vue-vite",
            Self::Vue => "vue",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One installable project inside a monorepo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonoRepoProject {
    /// Declared name (`package.json` or `project.json` name).
    pub name: String,

    /// Absolute folder of the project.
    pub folder: PathBuf,

    /// Depends on an `@ionic/*` package or `@capacitor/core`.
    pub is_ionic_project: bool,

    /// The Nx workspace root is itself the only project.
    pub is_standalone_nx_project: bool,

    /// The folder carries its own `package.json`.
    pub has_local_manifest: bool,

    /// Dependencies resolve from the repository root's `node_modules`.
    pub node_modules_hoisted_to_root: bool,
}

impl MonoRepoProject {
    /// Creates a member with every flag cleared.
    #[must_use]
    pub fn new(name: impl Into<String>, folder: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            folder: folder.into(),
            is_ionic_project: false,
            is_standalone_nx_project: false,
            has_local_manifest: false,
            node_modules_hoisted_to_root: false,
        }
    }
}
