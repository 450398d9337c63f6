//! Package manager command synthesis.
//!
//! Every abstract [`Operation`] is translated into exactly one shell command
//! line for a [`CommandTarget`]. The per-manager verbs live in a data table
//! ([`VERB_TABLE`]); monorepo handling is applied afterwards:
//!
//! - folder, lerna and pnpm monorepos install per project, so the command is
//!   prefixed with `cd <member folder> && `
//! - npm workspaces stay at the root and append `--workspace=<member>` to
//!   install and uninstall commands, but only when npm itself runs them
//! - every other topology uses the bare verb
//!
//! Synthesis never fails.

use crate::project::Project;
use capkit_workspaces::{MonoRepoKind, PackageManager};
use std::borrow::Cow;
use std::path::PathBuf;

/// Verbs and flags one package manager uses for each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerVerbs {
    /// Installs everything the manifest declares.
    pub install_all: &'static str,
    /// Adds one package.
    pub add: &'static str,
    /// Pins the added version exactly, if the manager has such a flag.
    pub exact_flag: Option<&'static str>,
    /// Records the added package as a dev dependency.
    pub dev_flag: &'static str,
    /// Removes one package.
    pub remove: &'static str,
    /// Updates all packages, or one when a name follows.
    pub update: &'static str,
    /// Prefix for running a manifest script.
    pub run: &'static str,
    /// Prefix for running a locally installed executable.
    pub exec_prefix: &'static str,
}

/// npm verbs, also the fallback for any manager missing from the table.
pub const NPM_VERBS: ManagerVerbs = ManagerVerbs {
    install_all: "npm install",
    add: "npm install",
    exact_flag: Some("--save-exact"),
    dev_flag: "--save-dev",
    remove: "npm uninstall",
    update: "npm update",
    run: "npm run",
    exec_prefix: "npx",
};

/// Verb table for every supported package manager.
pub const VERB_TABLE: [(PackageManager, ManagerVerbs); 4] = [
    (PackageManager::Npm, NPM_VERBS),
    (
        PackageManager::Yarn,
        ManagerVerbs {
            install_all: "yarn install",
            add: "yarn add",
            exact_flag: Some("--exact"),
            dev_flag: "--dev",
            remove: "yarn remove",
            update: "yarn upgrade",
            run: "yarn run",
            exec_prefix: "yarn exec",
        },
    ),
    (
        PackageManager::Pnpm,
        ManagerVerbs {
            install_all: "pnpm install",
            add: "pnpm add",
            exact_flag: Some("--save-exact"),
            dev_flag: "--save-dev",
            remove: "pnpm remove",
            update: "pnpm update",
            run: "pnpm",
            exec_prefix: "pnpm exec",
        },
    ),
    (
        PackageManager::Bun,
        ManagerVerbs {
            install_all: "bun install",
            add: "bun add",
            exact_flag: None,
            dev_flag: "--save-dev",
            remove: "bun remove",
            update: "bun update",
            run: "bun run",
            exec_prefix: "bunx",
        },
    ),
];

/// Looks up the verbs for `manager`, falling back to npm.
#[must_use]
pub fn verbs_for(manager: PackageManager) -> &'static ManagerVerbs {
    VERB_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == manager)
        .map_or(&NPM_VERBS, |(_, verbs)| verbs)
}

/// A package-manager-agnostic intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// Add one package, pinned exactly where the manager allows.
    InstallOne {
        /// Package name, optionally with a `@version` suffix.
        package: &'a str,
        /// Record as a dev dependency.
        dev: bool,
    },
    /// Install everything the manifest declares.
    InstallAll,
    /// Remove one package.
    UninstallOne {
        /// Package name.
        package: &'a str,
    },
    /// Update all packages, or only `package`.
    Update {
        /// Package to update, or `None` for all.
        package: Option<&'a str>,
    },
    /// Run a manifest script.
    RunScript {
        /// Script name.
        script: &'a str,
    },
    /// The prefix used to run an installed executable, e.g. `npx`.
    ExecutablePrefix,
}

/// Where and with which manager a command runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTarget {
    /// Package manager driving the project.
    pub manager: PackageManager,
    /// Monorepo topology of the repository.
    pub monorepo: MonoRepoKind,
    /// Folder of the selected member, if any.
    pub folder: Option<PathBuf>,
    /// Name of the selected member, if any.
    pub name: Option<String>,
}

impl CommandTarget {
    /// Target for a standalone project.
    #[must_use]
    pub fn standalone(manager: PackageManager) -> Self {
        Self {
            manager,
            ..Self::default()
        }
    }
}

/// Builds the command line for `operation` against `target`.
///
/// ```
/// use capkit_core::commands::{synthesize, CommandTarget, Operation};
/// use capkit_workspaces::{MonoRepoKind, PackageManager};
///
/// let target = CommandTarget {
///     manager: PackageManager::Npm,
///     monorepo: MonoRepoKind::Npm,
///     folder: None,
///     name: Some("my-app".to_string()),
/// };
/// let command = synthesize(&target, Operation::InstallOne { package: "lodash", dev: false });
/// assert_eq!(command, "npm install lodash --save-exact --workspace=my-app");
/// ```
#[must_use]
pub fn synthesize(target: &CommandTarget, operation: Operation<'_>) -> String {
    let verbs = verbs_for(target.manager);

    let mut parts: Vec<Cow<'_, str>> = match operation {
        Operation::InstallOne { package, dev } => {
            let mut parts = vec![Cow::Borrowed(verbs.add), Cow::Borrowed(package)];
            if let Some(flag) = verbs.exact_flag {
                parts.push(Cow::Borrowed(flag));
            }
            if dev {
                parts.push(Cow::Borrowed(verbs.dev_flag));
            }
            parts
        }
        Operation::InstallAll => vec![Cow::Borrowed(verbs.install_all)],
        Operation::UninstallOne { package } => {
            vec![Cow::Borrowed(verbs.remove), Cow::Borrowed(package)]
        }
        Operation::Update { package } => {
            let mut parts = vec![Cow::Borrowed(verbs.update)];
            parts.extend(package.map(Cow::Borrowed));
            parts
        }
        Operation::RunScript { script } => vec![Cow::Borrowed(verbs.run), Cow::Borrowed(script)],
        Operation::ExecutablePrefix => vec![Cow::Borrowed(verbs.exec_prefix)],
    };

    let takes_workspace_flag = matches!(
        operation,
        Operation::InstallOne { .. } | Operation::UninstallOne { .. }
    );
    if target.monorepo == MonoRepoKind::Npm
        && target.manager == PackageManager::Npm
        && takes_workspace_flag
    {
        let workspace = target.name.as_deref().unwrap_or(".");
        parts.push(Cow::Owned(format!("--workspace={workspace}")));
    }

    let command = parts.join(" ");
    match (&target.folder, target.monorepo.installs_per_project()) {
        (Some(folder), true) => {
            let folder = folder.to_string_lossy();
            let quoted = shlex::try_quote(&folder).unwrap_or(Cow::Borrowed(folder.as_ref()));
            format!("cd {quoted} && {command}")
        }
        _ => command,
    }
}

/// Adds `package` as a dependency of the project's current target.
#[must_use]
pub fn install_package(project: &Project, package: &str) -> String {
    synthesize(
        &project.command_target(),
        Operation::InstallOne {
            package,
            dev: false,
        },
    )
}

/// Adds `package` as a dev dependency of the project's current target.
#[must_use]
pub fn install_dev_package(project: &Project, package: &str) -> String {
    synthesize(
        &project.command_target(),
        Operation::InstallOne { package, dev: true },
    )
}

/// Removes `package` from the project's current target.
#[must_use]
pub fn uninstall_package(project: &Project, package: &str) -> String {
    synthesize(
        &project.command_target(),
        Operation::UninstallOne { package },
    )
}

/// Installs every declared dependency.
#[must_use]
pub fn install_all(project: &Project) -> String {
    synthesize(&project.command_target(), Operation::InstallAll)
}

/// Updates all dependencies, or just `package`.
#[must_use]
pub fn update(project: &Project, package: Option<&str>) -> String {
    synthesize(&project.command_target(), Operation::Update { package })
}

/// Runs a manifest script.
#[must_use]
pub fn run_script(project: &Project, script: &str) -> String {
    synthesize(&project.command_target(), Operation::RunScript { script })
}

/// The prefix for running an installed executable, e.g. `npx` or `cd app && pnpm exec`.
#[must_use]
pub fn executable_prefix(project: &Project) -> String {
    synthesize(&project.command_target(), Operation::ExecutablePrefix)
}

/// Prepends `<install-all> && ` to `command` when dependencies are missing.
#[must_use]
pub fn with_install_preflight(project: &Project, command: &str) -> String {
    if project.needs_install() {
        format!("{} && {command}", install_all(project))
    } else {
        command.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(manager: PackageManager, monorepo: MonoRepoKind) -> CommandTarget {
        CommandTarget {
            manager,
            monorepo,
            folder: Some(PathBuf::from("/repo/packages/app")),
            name: Some("app".to_string()),
        }
    }

    #[test]
    fn test_verb_table_covers_every_manager() {
        for manager in PackageManager::ALL {
            assert!(
                VERB_TABLE.iter().any(|(m, _)| *m == manager),
                "missing verbs for {manager}"
            );
        }
    }

    #[test]
    fn test_every_operation_for_every_manager() {
        use PackageManager::{Bun, Npm, Pnpm, Yarn};

        let install = Operation::InstallOne {
            package: "lodash",
            dev: false,
        };
        let install_dev = Operation::InstallOne {
            package: "jest",
            dev: true,
        };
        let uninstall = Operation::UninstallOne { package: "lodash" };
        let update_all = Operation::Update { package: None };
        let update_one = Operation::Update {
            package: Some("react"),
        };
        let run = Operation::RunScript { script: "build" };

        let cases = [
            (Npm, install, "npm install lodash --save-exact"),
            (Yarn, install, "yarn add lodash --exact"),
            (Pnpm, install, "pnpm add lodash --save-exact"),
            (Bun, install, "bun add lodash"),
            (Npm, install_dev, "npm install jest --save-exact --save-dev"),
            (Yarn, install_dev, "yarn add jest --exact --dev"),
            (Pnpm, install_dev, "pnpm add jest --save-exact --save-dev"),
            (Bun, install_dev, "bun add jest --save-dev"),
            (Npm, Operation::InstallAll, "npm install"),
            (Yarn, Operation::InstallAll, "yarn install"),
            (Pnpm, Operation::InstallAll, "pnpm install"),
            (Bun, Operation::InstallAll, "bun install"),
            (Npm, uninstall, "npm uninstall lodash"),
            (Yarn, uninstall, "yarn remove lodash"),
            (Pnpm, uninstall, "pnpm remove lodash"),
            (Bun, uninstall, "bun remove lodash"),
            (Npm, update_all, "npm update"),
            (Yarn, update_all, "yarn upgrade"),
            (Pnpm, update_all, "pnpm update"),
            (Bun, update_all, "bun update"),
            (Npm, update_one, "npm update react"),
            (Yarn, update_one, "yarn upgrade react"),
            (Pnpm, update_one, "pnpm update react"),
            (Bun, update_one, "bun update react"),
            (Npm, run, "npm run build"),
            (Yarn, run, "yarn run build"),
            (Pnpm, run, "pnpm build"),
            (Bun, run, "bun run build"),
            (Npm, Operation::ExecutablePrefix, "npx"),
            (Yarn, Operation::ExecutablePrefix, "yarn exec"),
            (Pnpm, Operation::ExecutablePrefix, "pnpm exec"),
            (Bun, Operation::ExecutablePrefix, "bunx"),
        ];

        for (manager, operation, expected) in cases {
            assert_eq!(
                synthesize(&CommandTarget::standalone(manager), operation),
                expected,
                "{manager} {operation:?}"
            );
        }
    }

    #[test]
    fn test_workspace_flag_is_npm_only() {
        let pnpm = target(PackageManager::Pnpm, MonoRepoKind::Npm);
        assert_eq!(
            synthesize(
                &pnpm,
                Operation::InstallOne {
                    package: "lodash",
                    dev: false
                }
            ),
            "pnpm add lodash --save-exact"
        );
        assert_eq!(
            synthesize(&pnpm, Operation::UninstallOne { package: "lodash" }),
            "pnpm remove lodash"
        );
    }

    #[test]
    fn test_cd_wrap_for_per_project_installs() {
        for kind in [MonoRepoKind::Folder, MonoRepoKind::Lerna, MonoRepoKind::Pnpm] {
            let command = synthesize(&target(PackageManager::Npm, kind), Operation::InstallAll);
            assert_eq!(command, "cd /repo/packages/app && npm install");
        }
    }

    #[test]
    fn test_no_wrap_for_shared_installs() {
        for kind in [
            MonoRepoKind::None,
            MonoRepoKind::Nx,
            MonoRepoKind::Turborepo,
            MonoRepoKind::Yarn,
            MonoRepoKind::Bun,
        ] {
            let command = synthesize(
                &target(PackageManager::Yarn, kind),
                Operation::UninstallOne { package: "lodash" },
            );
            assert_eq!(command, "yarn remove lodash");
        }
    }

    #[test]
    fn test_npm_workspace_flag_only_on_install_and_uninstall() {
        let npm = target(PackageManager::Npm, MonoRepoKind::Npm);
        assert_eq!(
            synthesize(&npm, Operation::UninstallOne { package: "lodash" }),
            "npm uninstall lodash --workspace=app"
        );
        assert_eq!(synthesize(&npm, Operation::InstallAll), "npm install");
        assert_eq!(
            synthesize(&npm, Operation::RunScript { script: "build" }),
            "npm run build"
        );
    }

    #[test]
    fn test_npm_workspace_root_target() {
        let root = CommandTarget {
            manager: PackageManager::Npm,
            monorepo: MonoRepoKind::Npm,
            folder: None,
            name: None,
        };
        assert_eq!(
            synthesize(
                &root,
                Operation::InstallOne {
                    package: "lodash",
                    dev: false
                }
            ),
            "npm install lodash --save-exact --workspace=."
        );
    }

    #[test]
    fn test_folder_with_spaces_is_quoted() {
        let spaced = CommandTarget {
            manager: PackageManager::Pnpm,
            monorepo: MonoRepoKind::Pnpm,
            folder: Some(PathBuf::from("/repo/my apps/app")),
            name: Some("app".to_string()),
        };
        let command = synthesize(&spaced, Operation::InstallAll);
        assert_eq!(
            shlex::split(&command).unwrap(),
            vec!["cd", "/repo/my apps/app", "&&", "pnpm", "install"]
        );
    }
}
