//! Error types for the incremental package mirroring system.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning, diffing, or reconciling packages.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Cache write failed at {}: {reason}", .path.display())]
    CacheWriteFailed { path: PathBuf, reason: String },

    #[error("Hash computation failed for {}: {reason}", .path.display())]
    HashFailed { path: PathBuf, reason: String },

    #[error("Copy failed for {}: {reason}", .path.display())]
    CopyFailed { path: PathBuf, reason: String },

    #[error("Delete failed for {}: {reason}", .path.display())]
    DeleteFailed { path: PathBuf, reason: String },

    #[error("Invalid manifest {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Build a hash failure for `path` from any displayable cause.
    pub fn hash(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        SyncError::HashFailed {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Build a copy failure for `path` from any displayable cause.
    pub fn copy(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        SyncError::CopyFailed {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Build a delete failure for `path` from any displayable cause.
    pub fn delete(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        SyncError::DeleteFailed {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}
