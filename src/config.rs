//! Configuration
//!
//! Optional `pkgmirror.toml` next to the manifest, with serde defaults for
//! every field. CLI flags override file values; the file overrides defaults.

use crate::diff::DEFAULT_MAX_DEPTH;
use crate::error::SyncError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Well-known configuration file name.
pub const CONFIG_FILE: &str = "pkgmirror.toml";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Manifest listing the dependencies to scan
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Mirror directory packages are synchronized into
    #[serde(default = "default_mirror_root")]
    pub mirror_root: PathBuf,

    /// Recursion depth budget for the tree differ
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_mirror_root() -> PathBuf {
    PathBuf::from("local_modules")
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            mirror_root: default_mirror_root(),
            max_depth: default_max_depth(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from an explicit file path.
    pub fn load_from_file(path: &Path) -> Result<Self, SyncError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&contents).map_err(|e| {
            SyncError::Config(format!("Malformed {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Load `pkgmirror.toml` from `dir` when present, defaults otherwise.
    pub fn load(dir: &Path) -> Result<Self, SyncError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}
