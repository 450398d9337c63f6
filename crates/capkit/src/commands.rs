//! Tool handlers: each subcommand produces exactly one [`ToolResponse`].

use crate::cli::{Cli, Commands};
use capkit_core::{CommandExecutor, ExecOptions, Project, ToolResponse, commands};
use miette::IntoDiagnostic;
use serde_json::json;
use std::io::Write;

/// Runs the parsed subcommand.
///
/// Errors that stop the command are returned as reports; the caller turns
/// them into a failed envelope.
pub async fn execute(cli: &Cli, executor: &dyn CommandExecutor) -> miette::Result<ToolResponse> {
    tracing::debug!(command = ?cli.command, path = %cli.path.display(), "Handling command");

    match &cli.command {
        Commands::Version => Ok(version()),
        Commands::Info => info(&load_project(cli).await?),
        Commands::ExecPrefix => {
            let project = load_project(cli).await?;
            let prefix = commands::executable_prefix(&project);
            Ok(ToolResponse::ok(prefix.clone()).with_data(json!({ "prefix": prefix })))
        }
        Commands::Install {
            package,
            dev,
            dry_run,
        } => {
            let project = load_project(cli).await?;
            let command = if *dev {
                commands::install_dev_package(&project, package)
            } else {
                commands::install_package(&project, package)
            };
            run_command(executor, &project, command, *dry_run, cli.timeout_ms).await
        }
        Commands::InstallAll { dry_run } => {
            let project = load_project(cli).await?;
            let command = commands::install_all(&project);
            run_command(executor, &project, command, *dry_run, cli.timeout_ms).await
        }
        Commands::Uninstall { package, dry_run } => {
            let project = load_project(cli).await?;
            let command = commands::uninstall_package(&project, package);
            run_command(executor, &project, command, *dry_run, cli.timeout_ms).await
        }
        Commands::Update { package, dry_run } => {
            let project = load_project(cli).await?;
            let command = commands::update(&project, package.as_deref());
            run_command(executor, &project, command, *dry_run, cli.timeout_ms).await
        }
        Commands::Run {
            script,
            preflight,
            dry_run,
        } => {
            let project = load_project(cli).await?;
            let mut command = commands::run_script(&project, script);
            if *preflight {
                command = commands::with_install_preflight(&project, &command);
            }
            run_command(executor, &project, command, *dry_run, cli.timeout_ms).await
        }
    }
}

async fn load_project(cli: &Cli) -> miette::Result<Project> {
    let mut project = Project::load(cli.path.clone(), cli.load_options()).await?;
    if let Some(name) = &cli.project {
        project.select_project(name)?;
    }
    Ok(project)
}

fn version() -> ToolResponse {
    let version = env!("CARGO_PKG_VERSION");
    ToolResponse::ok(format!("capkit {version}")).with_data(json!({ "version": version }))
}

fn info(project: &Project) -> miette::Result<ToolResponse> {
    let summary = project.summary();
    let mut message = format!(
        "{} project, {} monorepo, {} framework",
        summary.package_manager, summary.monorepo, summary.framework
    );
    if !summary.capacitor_versions_consistent {
        message.push_str("; Capacitor package versions differ");
    }

    let data = serde_json::to_value(&summary).into_diagnostic()?;
    Ok(ToolResponse::ok(message).with_data(data))
}

async fn run_command(
    executor: &dyn CommandExecutor,
    project: &Project,
    command: String,
    dry_run: bool,
    timeout_ms: Option<u64>,
) -> miette::Result<ToolResponse> {
    let cwd = project.root().to_path_buf();
    if dry_run {
        tracing::info!(command = %command, "Dry run");
        return Ok(ToolResponse::ok(format!("Would run `{command}`"))
            .with_data(json!({ "command": command, "cwd": cwd })));
    }

    let options = ExecOptions {
        cwd: Some(cwd),
        timeout_ms,
        ..ExecOptions::default()
    };
    let echo = |line: &str| {
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    };
    let output = executor.execute_streaming(&command, &options, &echo).await?;
    Ok(ToolResponse::from_exec(&command, &output))
}
