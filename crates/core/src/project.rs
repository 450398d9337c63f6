//! The loaded project: manifest, classification and the selected member.

use crate::commands::CommandTarget;
use crate::error::Result;
use capkit_workspaces::discovery::NODE_MODULES;
use capkit_workspaces::{
    Dependencies, FrameworkType, Manifest, MonoRepoKind, MonoRepoProject, PackageManager,
    detection, discover_projects, framework_from_manifest, get_folder_based_projects,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Facts that bypass detection when set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Use this package manager instead of detecting one.
    pub package_manager: Option<PackageManager>,
    /// Use this monorepo topology instead of detecting one.
    pub monorepo: Option<MonoRepoKind>,
}

/// A JavaScript project and everything capkit knows about it.
///
/// The manifest is owned by the instance; two projects loaded in the same
/// process never see each other's dependencies. The root dependency view is
/// fixed at load; selecting a member only changes the target.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    manifest: Manifest,
    package_manager: PackageManager,
    monorepo: MonoRepoKind,
    projects: Vec<MonoRepoProject>,
    framework: FrameworkType,
    selection: Option<Selection>,
}

#[derive(Debug, Clone)]
struct Selection {
    index: usize,
    manifest: Option<Manifest>,
    framework: FrameworkType,
}

impl Project {
    /// Loads and classifies the project in `folder` on the blocking pool.
    ///
    /// # Errors
    ///
    /// See [`Project::load_blocking`].
    pub async fn load(folder: impl Into<PathBuf>, options: LoadOptions) -> Result<Self> {
        let folder = folder.into();
        tokio::task::spawn_blocking(move || Self::load_blocking(&folder, options)).await?
    }

    /// Loads and classifies the project in `folder`.
    ///
    /// A folder without `package.json` is accepted as a plain folder monorepo
    /// when at least one sub-directory is a project.
    ///
    /// # Errors
    ///
    /// Returns `ManifestNotFound` when there is neither a manifest nor a
    /// sub-project, and `ManifestMalformed` when the manifest cannot be
    /// parsed.
    pub fn load_blocking(folder: &Path, options: LoadOptions) -> Result<Self> {
        match Manifest::load(folder) {
            Ok(manifest) => Ok(Self::classify(folder, manifest, options)),
            Err(capkit_workspaces::Error::ManifestNotFound { path }) => {
                let projects = get_folder_based_projects(folder);
                if projects.is_empty() {
                    return Err(capkit_workspaces::Error::ManifestNotFound { path }.into());
                }

                tracing::debug!(
                    folder = %folder.display(),
                    count = projects.len(),
                    "No root manifest, treating folder as a plain folder monorepo"
                );
                let manifest = Manifest::empty(folder);
                let package_manager = options.package_manager.unwrap_or_else(|| {
                    detection::detect_from_lockfiles(folder).unwrap_or_default()
                });
                Ok(Self::assemble(
                    folder,
                    manifest,
                    package_manager,
                    MonoRepoKind::Folder,
                    projects,
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn classify(folder: &Path, manifest: Manifest, options: LoadOptions) -> Self {
        let package_manager = options
            .package_manager
            .unwrap_or_else(|| detection::detect_package_manager(folder, &manifest));
        let monorepo = options.monorepo.unwrap_or_else(|| {
            detection::detect_monorepo_type(folder, &manifest, package_manager)
        });
        let projects = discover_projects(folder, monorepo, &manifest);
        Self::assemble(folder, manifest, package_manager, monorepo, projects)
    }

    fn assemble(
        folder: &Path,
        manifest: Manifest,
        package_manager: PackageManager,
        monorepo: MonoRepoKind,
        projects: Vec<MonoRepoProject>,
    ) -> Self {
        let framework = framework_from_manifest(folder, &manifest);
        tracing::info!(
            root = %folder.display(),
            manager = %package_manager,
            monorepo = %monorepo,
            framework = %framework,
            projects = projects.len(),
            "Loaded project"
        );

        Self {
            root: folder.to_path_buf(),
            manifest,
            package_manager,
            monorepo,
            projects,
            framework,
            selection: None,
        }
    }

    /// Root folder of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root manifest as read at load time.
    #[must_use]
    pub const fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Merged root dependencies. Unchanged by member selection.
    #[must_use]
    pub const fn dependencies(&self) -> &Dependencies {
        self.manifest.dependencies()
    }

    /// Manifest of the current target: the selected member's own
    /// `package.json` if it has one, otherwise the root manifest.
    #[must_use]
    pub fn selected_manifest(&self) -> &Manifest {
        self.selection
            .as_ref()
            .and_then(|selection| selection.manifest.as_ref())
            .unwrap_or(&self.manifest)
    }

    /// Package manager driving the repository.
    #[must_use]
    pub const fn package_manager(&self) -> PackageManager {
        self.package_manager
    }

    /// Monorepo topology of the repository.
    #[must_use]
    pub const fn monorepo(&self) -> MonoRepoKind {
        self.monorepo
    }

    /// Discovered monorepo members.
    #[must_use]
    pub fn projects(&self) -> &[MonoRepoProject] {
        &self.projects
    }

    /// Framework of the current target.
    #[must_use]
    pub fn framework(&self) -> FrameworkType {
        self.selection
            .as_ref()
            .map_or(self.framework, |selection| selection.framework)
    }

    /// The selected member, if any.
    #[must_use]
    pub fn selected_project(&self) -> Option<&MonoRepoProject> {
        self.selection
            .as_ref()
            .and_then(|selection| self.projects.get(selection.index))
    }

    /// Makes the member called `name` the target of later commands.
    ///
    /// # Errors
    ///
    /// Returns `MemberNotFound` if no member has that name, or a manifest
    /// error if the member's own `package.json` cannot be read.
    pub fn select_project(&mut self, name: &str) -> Result<&MonoRepoProject> {
        let Some(index) = self.projects.iter().position(|p| p.name == name) else {
            return Err(capkit_workspaces::Error::MemberNotFound {
                name: name.to_string(),
                workspace_root: self.root.clone(),
            }
            .into());
        };

        let member = &self.projects[index];
        let selection = if member.has_local_manifest {
            let manifest = Manifest::load(&member.folder)?;
            Selection {
                index,
                framework: framework_from_manifest(&member.folder, &manifest),
                manifest: Some(manifest),
            }
        } else {
            Selection {
                index,
                manifest: None,
                framework: self.framework,
            }
        };

        tracing::debug!(project = %name, framework = %selection.framework, "Selected project");
        self.selection = Some(selection);
        Ok(&self.projects[index])
    }

    /// Goes back to targeting the repository root.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Folder where dependencies get installed: the selected member for
    /// topologies that install per project, otherwise the root.
    #[must_use]
    pub fn install_root(&self) -> &Path {
        match self.selected_project() {
            Some(member) if self.monorepo.installs_per_project() => &member.folder,
            _ => &self.root,
        }
    }

    /// The `node_modules` folder the current target resolves packages from.
    #[must_use]
    pub fn node_modules_dir(&self) -> PathBuf {
        match self.selected_project() {
            Some(member) if !member.node_modules_hoisted_to_root && member.folder != self.root => {
                member.folder.join(NODE_MODULES)
            }
            _ => self.root.join(NODE_MODULES),
        }
    }

    /// True when [`Project::node_modules_dir`] does not exist yet.
    #[must_use]
    pub fn needs_install(&self) -> bool {
        !self.node_modules_dir().is_dir()
    }

    /// Manager, topology and selected member for command synthesis.
    #[must_use]
    pub fn command_target(&self) -> CommandTarget {
        let selected = self.selected_project();
        CommandTarget {
            manager: self.package_manager,
            monorepo: self.monorepo,
            folder: selected.map(|p| p.folder.clone()),
            name: selected.map(|p| p.name.clone()),
        }
    }

    /// Serializable summary of the project.
    #[must_use]
    pub fn summary(&self) -> ProjectSummary {
        let manifest = self.selected_manifest();
        let dependencies = manifest.dependencies();
        ProjectSummary {
            root: self.root.clone(),
            name: manifest.name().map(str::to_string),
            package_manager: self.package_manager,
            monorepo: self.monorepo,
            framework: self.framework(),
            projects: self.projects.clone(),
            selected_project: self.selected_project().map(|p| p.name.clone()),
            install_root: self.install_root().to_path_buf(),
            needs_install: self.needs_install(),
            capacitor_packages: dependencies
                .capacitor_packages()
                .into_iter()
                .filter_map(|name| {
                    dependencies.version_of(name).map(|version| PackageVersion {
                        name: name.to_string(),
                        version: version.to_string(),
                    })
                })
                .collect(),
            capacitor_versions_consistent: dependencies
                .versions_consistent("@capacitor/core", "@capacitor/cli")
                && dependencies.versions_consistent("@capacitor/core", "@capacitor/ios")
                && dependencies.versions_consistent("@capacitor/core", "@capacitor/android"),
            remote_dependencies: dependencies
                .remote_specifiers()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// A declared package and its raw specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageVersion {
    /// Package name.
    pub name: String,
    /// Specifier as written in the manifest.
    pub version: String,
}

/// What `capkit info` reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Repository root.
    pub root: PathBuf,
    /// Manifest name of the current target.
    pub name: Option<String>,
    /// Package manager.
    pub package_manager: PackageManager,
    /// Monorepo topology.
    pub monorepo: MonoRepoKind,
    /// Framework of the current target.
    pub framework: FrameworkType,
    /// Discovered members.
    pub projects: Vec<MonoRepoProject>,
    /// Name of the selected member.
    pub selected_project: Option<String>,
    /// Where installs run.
    pub install_root: PathBuf,
    /// Dependencies are not installed yet.
    pub needs_install: bool,
    /// Declared `@capacitor/*` packages.
    pub capacitor_packages: Vec<PackageVersion>,
    /// Core, CLI and native platform packages agree on a version.
    pub capacitor_versions_consistent: bool,
    /// Dependencies pinned to git or tarball URLs.
    pub remote_dependencies: Vec<String>,
}
