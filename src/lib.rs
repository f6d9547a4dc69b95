//! pkgmirror: incremental mirroring of local path-referenced packages
//!
//! Synchronizes packages referenced by a manifest's `file:` dependencies into
//! a mirror directory, using structural hash trees to copy only what changed
//! between runs.

pub mod cache;
pub mod config;
pub mod diff;
pub mod error;
pub mod ignore;
pub mod logging;
pub mod manifest;
pub mod reconcile;
pub mod sync;
pub mod tree;

pub use cache::{BundleCache, CacheStore};
pub use diff::{Delta, Differ};
pub use error::SyncError;
pub use manifest::Package;
pub use reconcile::{PackageOutcome, Reconciler, SyncReport};
pub use sync::SyncRunner;
pub use tree::{HashNode, TreeHasher};
