//! Persisted hash-tree cache
//!
//! The cache is a single JSON document mapping package name to its last
//! persisted [`HashNode`] tree. It is read once at run start, never touched
//! mid-run, and overwritten wholesale after a successful reconciliation. A
//! missing or malformed cache degrades to a full resync; it is never fatal.

use crate::error::SyncError;
use crate::tree::node::HashNode;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default cache file name beneath the mirror root.
pub const CACHE_FILE: &str = ".pkgmirror-cache.json";

/// Mapping from package name to its last-persisted hash tree.
pub type BundleCache = BTreeMap<String, HashNode>;

/// Loads and saves the bundle cache as one unit.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the well-known location beneath a mirror root.
    pub fn for_mirror(mirror_root: &Path) -> Self {
        Self::new(mirror_root.join(CACHE_FILE))
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache. Missing or unreadable content yields `None`, which
    /// callers treat identically to a first run.
    pub fn load(&self) -> Option<BundleCache> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No readable cache");
                return None;
            }
        };

        match serde_json::from_str::<BundleCache>(&contents) {
            Ok(cache) => {
                debug!(packages = cache.len(), "Loaded bundle cache");
                Some(cache)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Malformed cache, forcing full resync");
                None
            }
        }
    }

    /// Write the whole cache, replacing any previous content. There is no
    /// partial or merge write.
    pub fn save(&self, cache: &BundleCache) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::CacheWriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        }

        let json = serde_json::to_string(cache).map_err(|e| SyncError::CacheWriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|e| SyncError::CacheWriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        debug!(path = %self.path.display(), packages = cache.len(), "Saved bundle cache");
        Ok(())
    }
}
