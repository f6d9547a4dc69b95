//! Structural hashing of package directory trees using BLAKE3
//!
//! The hasher produces a [`HashNode`] tree for a package root: file hashes
//! cover content, directory hashes cover the sorted `name:hash` lines of
//! their children. Hashing is deterministic for identical content and ignore
//! rules regardless of traversal order, because children are sorted by name
//! before the directory digest is computed.

use crate::error::SyncError;
use crate::ignore::IgnoreRules;
use crate::tree::node::HashNode;
use blake3::Hasher;
use std::path::Path;
use tracing::{instrument, trace};

/// Hashes a package directory into a [`HashNode`] tree, honoring ignore rules.
#[derive(Debug, Default, Clone)]
pub struct TreeHasher {
    ignore: IgnoreRules,
}

impl TreeHasher {
    /// Create a hasher with no ignore rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ignore rules applied during traversal.
    pub fn with_ignore(mut self, ignore: IgnoreRules) -> Self {
        self.ignore = ignore;
        self
    }

    /// Hash the entry at `path` (file or directory) into a tree.
    ///
    /// The root node is named after the final path component.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn hash(&self, path: &Path) -> Result<HashNode, SyncError> {
        let name = entry_name(path)?;
        self.hash_entry(path, name)
    }

    fn hash_entry(&self, path: &Path, name: String) -> Result<HashNode, SyncError> {
        let metadata = std::fs::metadata(path).map_err(|e| SyncError::hash(path, e))?;

        if metadata.is_file() {
            let content = std::fs::read(path).map_err(|e| SyncError::hash(path, e))?;
            let digest = hex::encode(blake3::hash(&content).as_bytes());
            trace!(file = %path.display(), hash = %digest, "Hashed file");
            return Ok(HashNode::leaf(name, digest));
        }

        let mut entries = Vec::new();
        let dir = std::fs::read_dir(path).map_err(|e| SyncError::hash(path, e))?;
        for entry in dir {
            let entry = entry.map_err(|e| SyncError::hash(path, e))?;
            let child_path = entry.path();
            let child_name = entry.file_name().to_string_lossy().to_string();

            let file_type = entry.file_type().map_err(|e| SyncError::hash(&child_path, e))?;
            // Symlinks are skipped for determinism
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                if self.ignore.matches_folder(&child_name) {
                    continue;
                }
            } else if self.ignore.matches_file(&child_name) {
                continue;
            }

            entries.push((child_path, child_name));
        }

        // Sort by name so the digest is independent of listing order
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        let mut children = Vec::with_capacity(entries.len());
        for (child_path, child_name) in entries {
            children.push(self.hash_entry(&child_path, child_name)?);
        }

        let digest = directory_digest(&children);
        Ok(HashNode::directory(name, digest, children))
    }
}

/// Compute a directory digest from its (sorted) children.
fn directory_digest(children: &[HashNode]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(b"dir");
    hasher.update(&(children.len() as u64).to_be_bytes());
    for child in children {
        hasher.update(child.name.as_bytes());
        hasher.update(b":");
        hasher.update(child.hash.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize().as_bytes())
}

fn entry_name(path: &Path) -> Result<String, SyncError> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| SyncError::hash(path, "path has no final component"))
}
