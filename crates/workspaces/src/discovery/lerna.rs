//! Member patterns declared in `lerna.json`.

use crate::discovery::read_json_file;
use serde::Deserialize;
use std::path::Path;

/// Marker file of a Lerna repository.
pub const LERNA_FILE: &str = "lerna.json";

const DEFAULT_PACKAGES: &str = "packages/*";

#[derive(Deserialize)]
struct LernaConfig {
    packages: Option<Vec<String>>,
}

/// The `packages` list of `lerna.json`; Lerna's own default when absent.
#[must_use]
pub fn workspace_patterns(root: &Path) -> Vec<String> {
    match read_json_file::<LernaConfig>(&root.join(LERNA_FILE)) {
        Ok(LernaConfig {
            packages: Some(packages),
        }) => packages,
        Ok(_) => vec![DEFAULT_PACKAGES.to_string()],
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unreadable lerna.json");
            vec![DEFAULT_PACKAGES.to_string()]
        }
    }
}
