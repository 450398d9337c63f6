//! Command line surface: global flags, their `CAPKIT_*` environment
//! fallbacks, and the tool subcommands.

use crate::tracing::{LogLevel, TracingConfig, TracingFormat};
use capkit_core::LoadOptions;
use capkit_workspaces::{MonoRepoKind, PackageManager};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "capkit")]
#[command(about = "Inspect Capacitor and Ionic projects and run the right package manager commands")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'l',
        long,
        global = true,
        env = "CAPKIT_LOG_LEVEL",
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Log line format on stderr.
    #[arg(
        long,
        global = true,
        env = "CAPKIT_LOG_FORMAT",
        help = "Log format on stderr",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    /// Shorthand for `--log-format json`.
    #[arg(long, global = true, env = "CAPKIT_LOG_JSON", help = "Emit logs as JSON")]
    pub json: bool,

    /// Project or repository folder.
    #[arg(
        short = 'p',
        long,
        global = true,
        env = "CAPKIT_PROJECT",
        default_value = ".",
        help = "Project or repository folder"
    )]
    pub path: PathBuf,

    /// Monorepo member that commands target.
    #[arg(long, global = true, env = "CAPKIT_SELECT", help = "Monorepo member to target")]
    pub project: Option<String>,

    /// Skip package manager detection.
    #[arg(
        long,
        global = true,
        env = "CAPKIT_PACKAGE_MANAGER",
        help = "Package manager to use (npm, yarn, pnpm, bun)"
    )]
    pub package_manager: Option<PackageManager>,

    /// Skip monorepo detection.
    #[arg(
        long,
        global = true,
        env = "CAPKIT_MONOREPO",
        help = "Monorepo type (none, nx, turborepo, pnpm, lerna, npm, yarn, bun, folder)"
    )]
    pub monorepo: Option<MonoRepoKind>,

    /// Kill commands that run longer than this.
    #[arg(long, global = true, env = "CAPKIT_TIMEOUT_MS", help = "Command timeout in milliseconds")]
    pub timeout_ms: Option<u64>,
}

impl Cli {
    /// Detection overrides from the global flags.
    #[must_use]
    pub const fn load_options(&self) -> LoadOptions {
        LoadOptions {
            package_manager: self.package_manager,
            monorepo: self.monorepo,
        }
    }

    /// Tracing setup from the global flags.
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: if self.json {
                TracingFormat::Json
            } else {
                self.log_format
            },
            level: self.level.into(),
            ..TracingConfig::default()
        }
    }
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show what capkit detected about the project.
    #[command(about = "Show package manager, monorepo, framework and members")]
    Info,
    /// Add a package.
    #[command(about = "Add a package, pinned to an exact version")]
    Install {
        /// Package name, optionally with `@version`.
        package: String,
        /// Save as a dev dependency.
        #[arg(short = 'D', long)]
        dev: bool,
        /// Print the command instead of running it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Install every declared dependency.
    #[command(about = "Install every declared dependency")]
    InstallAll {
        /// Print the command instead of running it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove a package.
    #[command(about = "Remove a package")]
    Uninstall {
        /// Package name.
        package: String,
        /// Print the command instead of running it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Update dependencies.
    #[command(about = "Update all dependencies, or one package")]
    Update {
        /// Only update this package.
        package: Option<String>,
        /// Print the command instead of running it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a manifest script.
    #[command(about = "Run a package.json script")]
    Run {
        /// Script name.
        script: String,
        /// Install dependencies first if they are missing.
        #[arg(long)]
        preflight: bool,
        /// Print the command instead of running it.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the prefix for running installed executables.
    #[command(about = "Print the prefix for running installed executables (npx, pnpm exec, ...)")]
    ExecPrefix,
    /// Show version information.
    #[command(about = "Show version information")]
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["capkit", "version"]).unwrap();

        assert_eq!(cli.command, Commands::Version);
        assert_eq!(cli.level, LogLevel::Warn);
        assert_eq!(cli.log_format, TracingFormat::Compact);
        assert!(!cli.json);
        assert_eq!(cli.path, PathBuf::from("."));
        assert!(cli.project.is_none());
        assert_eq!(cli.load_options(), LoadOptions::default());
    }

    #[test]
    fn test_cli_log_level_parsing() {
        let cli = Cli::try_parse_from(["capkit", "--level", "debug", "info"]).unwrap();
        assert_eq!(cli.level, LogLevel::Debug);

        let cli = Cli::try_parse_from(["capkit", "-l", "error", "info"]).unwrap();
        assert_eq!(cli.level, LogLevel::Error);

        assert!(Cli::try_parse_from(["capkit", "--level", "loud", "info"]).is_err());
    }

    #[test]
    fn test_json_flag_selects_json_logs() {
        let cli = Cli::try_parse_from(["capkit", "--json", "info"]).unwrap();
        assert_eq!(cli.tracing_config().format, TracingFormat::Json);

        let cli = Cli::try_parse_from(["capkit", "--log-format", "pretty", "info"]).unwrap();
        assert_eq!(cli.tracing_config().format, TracingFormat::Pretty);
    }

    #[test]
    fn test_overrides_parse_from_names() {
        let cli = Cli::try_parse_from([
            "capkit",
            "--package-manager",
            "pnpm",
            "--monorepo",
            "turbo",
            "info",
        ])
        .unwrap();
        assert_eq!(
            cli.load_options(),
            LoadOptions {
                package_manager: Some(PackageManager::Pnpm),
                monorepo: Some(MonoRepoKind::Turborepo),
            }
        );

        assert!(Cli::try_parse_from(["capkit", "--package-manager", "cargo", "info"]).is_err());
    }

    #[test]
    fn test_install_arguments() {
        let cli = Cli::try_parse_from([
            "capkit",
            "install",
            "@capacitor/camera",
            "-D",
            "--dry-run",
            "--project",
            "mobile",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Install {
                package: "@capacitor/camera".to_string(),
                dev: true,
                dry_run: true,
            }
        );
        assert_eq!(cli.project.as_deref(), Some("mobile"));
    }

    #[test]
    fn test_kebab_case_subcommands() {
        let cli = Cli::try_parse_from(["capkit", "install-all"]).unwrap();
        assert_eq!(cli.command, Commands::InstallAll { dry_run: false });

        let cli = Cli::try_parse_from(["capkit", "exec-prefix", "-p", "/repo"]).unwrap();
        assert_eq!(cli.command, Commands::ExecPrefix);
        assert_eq!(cli.path, PathBuf::from("/repo"));

        let cli = Cli::try_parse_from(["capkit", "update"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Update {
                package: None,
                dry_run: false
            }
        );
    }

    #[test]
    fn test_timeout_flag() {
        let cli =
            Cli::try_parse_from(["capkit", "--timeout-ms", "30000", "run", "build"]).unwrap();
        assert_eq!(cli.timeout_ms, Some(30_000));
        assert!(matches!(cli.command, Commands::Run { ref script, .. } if script == "build"));
    }
}
