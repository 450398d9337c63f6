//! capkit core: the loaded project, package manager command synthesis and
//! command execution.
//!
//! # Overview
//!
//! - [`Project`] loads a folder once and owns its manifest, package manager,
//!   monorepo topology, members and the selected member
//! - [`commands`] turns abstract operations into one shell command line per
//!   package manager and topology
//! - [`CommandExecutor`] runs those lines; [`ShellExecutor`] does so with tokio
//! - [`ToolResponse`] is the JSON envelope returned to tool callers
//!
//! # Example
//!
//! ```no_run
//! use capkit_core::{commands, LoadOptions, Project};
//!
//! # async fn example() -> capkit_core::Result<()> {
//! let mut project = Project::load("/path/to/repo", LoadOptions::default()).await?;
//! project.select_project("mobile")?;
//!
//! let install = commands::install_package(&project, "@capacitor/camera");
//! println!("{}", commands::with_install_preflight(&project, &install));
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod error;
pub mod executor;
pub mod project;
pub mod tool;

pub use commands::{CommandTarget, ManagerVerbs, Operation, synthesize};
pub use error::{Error, Result};
pub use executor::{CommandExecutor, ExecOptions, ExecOutput, ShellExecutor};
pub use project::{LoadOptions, PackageVersion, Project, ProjectSummary};
pub use tool::ToolResponse;
