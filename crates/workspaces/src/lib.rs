//! Project facts for capkit: manifests, dependency versions, package managers
//! and monorepo layouts.
//!
//! This crate reads a JavaScript project from disk and classifies it. It
//! never spawns processes and never writes files.
//!
//! # Architecture
//!
//! - [`Manifest`] - immutable snapshot of a `package.json`
//! - [`Dependencies`] - merged `dependencies`/`devDependencies` view that
//!   answers version-gating questions (`is_at_least`, `versions_consistent`, ...)
//! - [`detection`] - package manager, monorepo and framework classification
//! - [`discovery`] - monorepo member enumeration for each topology
//!
//! # Fail-closed version gating
//!
//! Specifiers such as `latest`, `workspace:*` or git URLs cannot be coerced
//! to a version. Ordering predicates then answer `false`, so a feature is
//! never enabled on an unknown version, and `versions_consistent` answers
//! `true`, so drift is only reported between two known versions.
//!
//! # Example
//!
//! ```no_run
//! use capkit_workspaces::{Manifest, detection};
//! use std::path::Path;
//!
//! let root = Path::new("/path/to/app");
//! let manifest = Manifest::load(root)?;
//!
//! if manifest.dependencies().is_at_least("@angular/core", "15.0.0") {
//!     println!("standalone components available");
//! }
//!
//! let manager = detection::detect_package_manager(root, &manifest);
//! let kind = detection::detect_monorepo_type(root, &manifest, manager);
//! println!("{manager} / {kind}");
//! # Ok::<(), capkit_workspaces::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod detection;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod types;
pub mod version;

pub use error::{Error, Result};
pub use manifest::Manifest;
pub use types::{FrameworkType, MonoRepoKind, MonoRepoProject, PackageManager};
pub use version::Dependencies;

pub use detection::{
    detect_framework_type, detect_monorepo_type, detect_package_manager, framework_from_manifest,
};
pub use discovery::{discover_projects, get_folder_based_projects, get_workspace_projects};
