//! Per-package ignore rules.
//!
//! Each package may carry a `.syncignore` file at its root, a JSON document
//! with `files` and `folders` pattern lists. The patterns are passed through
//! unmodified to the hasher, which excludes matching entries from the hash
//! tree (and therefore from copying). The ignore file itself is always
//! excluded.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Well-known ignore file name at a package root.
pub const IGNORE_FILE: &str = ".syncignore";

/// File and folder exclusion patterns for one package.
///
/// A pattern is an exact entry name, or a glob-lite form with a single `*`
/// prefix or suffix (`*.log`, `tmp*`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRules {
    /// Patterns matched against file names
    #[serde(default)]
    pub files: Vec<String>,
    /// Patterns matched against directory names
    #[serde(default)]
    pub folders: Vec<String>,
}

impl IgnoreRules {
    /// Whether a file with this name is excluded.
    pub fn matches_file(&self, name: &str) -> bool {
        name == IGNORE_FILE || self.files.iter().any(|p| pattern_matches(p, name))
    }

    /// Whether a directory with this name is excluded.
    pub fn matches_folder(&self, name: &str) -> bool {
        self.folders.iter().any(|p| pattern_matches(p, name))
    }
}

/// Load ignore rules for the package rooted at `package_root`.
///
/// A missing ignore file yields empty rules; a malformed one is an error so
/// that a typo does not silently widen the hashed tree.
pub fn load_ignore_rules(package_root: &Path) -> Result<IgnoreRules, SyncError> {
    let path = package_root.join(IGNORE_FILE);
    if !path.is_file() {
        return Ok(IgnoreRules::default());
    }

    let contents = std::fs::read_to_string(&path)?;
    let rules: IgnoreRules = serde_json::from_str(&contents).map_err(|e| {
        SyncError::Config(format!("Malformed ignore file {}: {}", path.display(), e))
    })?;

    debug!(
        package = %package_root.display(),
        files = rules.files.len(),
        folders = rules.folders.len(),
        "Loaded ignore rules"
    );
    Ok(rules)
}

/// Match an entry name against a single pattern.
///
/// Supports exact names, `*suffix`, and `prefix*`. A bare `*` matches
/// everything.
fn pattern_matches(pattern: &str, name: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return name.ends_with(suffix);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return name.starts_with(prefix);
    }
    pattern == name
}
