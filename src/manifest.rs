//! Local-package discovery from a manifest
//!
//! Packages are the manifest's dependency entries whose value carries the
//! local-path marker (`file:` prefix). The package name is the basename of
//! the referenced path; name collisions across distinct source paths are
//! undefined behavior and resolve last-one-wins downstream.

use crate::error::SyncError;
use crate::ignore::{load_ignore_rules, IgnoreRules};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Marker prefix identifying a path-referenced dependency.
pub const LOCAL_PATH_MARKER: &str = "file:";

/// One local package to mirror.
#[derive(Debug, Clone)]
pub struct Package {
    /// Unique name, derived from the source path basename
    pub name: String,
    /// Absolute or manifest-relative source directory
    pub source_path: PathBuf,
    /// Exclusion patterns passed through to the hasher
    pub ignore: IgnoreRules,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

/// Discover local packages referenced by the manifest at `manifest_path`.
///
/// Dependency values without the local-path marker are skipped. Relative
/// paths resolve against the manifest's directory. Zero local dependencies is
/// a valid, empty result.
pub fn discover(manifest_path: &Path) -> Result<Vec<Package>, SyncError> {
    let contents =
        std::fs::read_to_string(manifest_path).map_err(|e| SyncError::InvalidManifest {
            path: manifest_path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let manifest: Manifest =
        serde_json::from_str(&contents).map_err(|e| SyncError::InvalidManifest {
            path: manifest_path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let mut packages = Vec::new();

    for (dep_name, value) in &manifest.dependencies {
        let Some(raw_path) = value.strip_prefix(LOCAL_PATH_MARKER) else {
            continue;
        };

        let source_path = {
            let p = PathBuf::from(raw_path);
            if p.is_absolute() {
                p
            } else {
                base.join(p)
            }
        };

        let name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| SyncError::InvalidManifest {
                path: manifest_path.to_path_buf(),
                reason: format!("dependency '{}' has an empty local path", dep_name),
            })?;

        let ignore = load_ignore_rules(&source_path)?;
        debug!(package = %name, source = %source_path.display(), "Discovered local package");
        packages.push(Package {
            name,
            source_path,
            ignore,
        });
    }

    info!(count = packages.len(), "Scanned manifest for local packages");
    Ok(packages)
}
