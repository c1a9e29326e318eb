//! Read-only access to the project's dependency manifest (`composer.json`).
//!
//! The manifest is parsed fresh on every check so that changes made by an
//! earlier step in the same batch are observed.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// File name of the manifest inside the project root
pub const MANIFEST_FILE: &str = "composer.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse manifest {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    require: Map<String, Value>,
    #[serde(default, rename = "require-dev")]
    require_dev: Map<String, Value>,
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ManifestError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(content)
    }

    /// True when `name` is listed under `require` or `require-dev`
    pub fn contains(&self, name: &str) -> bool {
        self.require.contains_key(name) || self.require_dev.contains_key(name)
    }
}

/// Check whether a dependency is already declared in the manifest at `path`.
/// An unreadable or malformed manifest counts as "nothing installed".
pub fn is_installed(path: &Path, name: &str) -> bool {
    match Manifest::from_file(path) {
        Ok(manifest) => manifest.contains(name),
        Err(e) => {
            debug!("Treating {} as not installed: {}", name, e);
            false
        }
    }
}
