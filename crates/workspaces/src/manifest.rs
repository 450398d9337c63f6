//! Loading `package.json` manifests.

use crate::error::{Error, Result};
use crate::version::Dependencies;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the dependency manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Immutable snapshot of a `package.json` taken at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    path: PathBuf,
    name: Option<String>,
    package_manager: Option<String>,
    workspaces: Vec<String>,
    dependencies: Dependencies,
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    name: Option<String>,
    package_manager: Option<String>,
    workspaces: Option<WorkspacesField>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default)]
    dev_dependencies: IndexMap<String, String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WorkspacesField {
    Array(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl Manifest {
    /// Reads `<folder>/package.json`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestNotFound`] when the file is absent and
    /// [`Error::ManifestMalformed`] when it is not a valid manifest.
    pub fn load(folder: &Path) -> Result<Self> {
        let path = folder.join(MANIFEST_FILE);
        tracing::debug!(path = %path.display(), "Loading manifest");

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ManifestNotFound { path });
            }
            Err(e) => {
                return Err(Error::Io {
                    source: e,
                    path: Some(path),
                    operation: "reading manifest".to_string(),
                });
            }
        };

        Self::parse(path, &content)
    }

    /// Parses manifest text that was read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestMalformed`] if `content` is not a JSON object
    /// with string-valued dependency maps.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let path = path.into();
        let raw: PackageJson =
            serde_json::from_str(content).map_err(|source| Error::ManifestMalformed {
                path: path.clone(),
                source,
            })?;

        let workspaces = match raw.workspaces {
            Some(WorkspacesField::Array(patterns) | WorkspacesField::Object { packages: patterns }) => {
                patterns
            }
            None => Vec::new(),
        };

        Ok(Self {
            path,
            name: raw.name,
            package_manager: raw.package_manager,
            workspaces,
            dependencies: Dependencies::merge(raw.dependencies, raw.dev_dependencies),
            extra: raw.extra,
        })
    }

    /// An empty manifest standing in for a folder without `package.json`.
    #[must_use]
    pub fn empty(folder: &Path) -> Self {
        Self {
            path: folder.join(MANIFEST_FILE),
            ..Self::default()
        }
    }

    /// Where the manifest was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The `name` field.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The `packageManager` field, e.g. `pnpm@8.6.0`.
    #[must_use]
    pub fn package_manager_field(&self) -> Option<&str> {
        self.package_manager.as_deref()
    }

    /// Declared workspace paths or patterns, from either `workspaces` form.
    #[must_use]
    pub fn workspaces(&self) -> &[String] {
        &self.workspaces
    }

    /// Merged dependency view.
    #[must_use]
    pub const fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    /// Any other top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    /// Script names declared under `scripts`.
    #[must_use]
    pub fn scripts(&self) -> Vec<&str> {
        self.get("scripts")
            .and_then(serde_json::Value::as_object)
            .map(|scripts| scripts.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
