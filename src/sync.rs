//! One reconciliation run, end to end
//!
//! Discover local packages from the manifest, load the previous cache, hash
//! and reconcile every package against the mirror, then persist the new hash
//! trees as one unit. The cache is written only at run end, so a mid-run
//! abort leaves the mirror ahead of the cache and the next run re-derives
//! correctness by re-hashing rather than trusting stale state.

use crate::cache::CacheStore;
use crate::config::SyncConfig;
use crate::diff::Differ;
use crate::error::SyncError;
use crate::manifest;
use crate::reconcile::{Reconciler, SyncReport};
use std::time::Instant;
use tracing::{info, instrument};

/// Runs full reconciliation passes from a [`SyncConfig`].
#[derive(Debug, Clone)]
pub struct SyncRunner {
    config: SyncConfig,
}

impl SyncRunner {
    /// Create a runner for the given configuration.
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// Execute one reconciliation run.
    ///
    /// Zero local dependencies is a valid no-op. The cache is persisted even
    /// when individual packages failed: failed packages keep their stale
    /// entry (or none), so the next run retries them.
    #[instrument(skip(self), fields(manifest = %self.config.manifest.display()))]
    pub fn run(&self) -> Result<SyncReport, SyncError> {
        let start = Instant::now();

        let packages = manifest::discover(&self.config.manifest)?;
        if packages.is_empty() {
            info!("No local packages referenced by the manifest");
            return Ok(SyncReport::default());
        }

        let store = CacheStore::for_mirror(&self.config.mirror_root);
        let previous = store.load();

        let reconciler = Reconciler::new(&self.config.mirror_root)
            .with_differ(Differ::new().with_max_depth(self.config.max_depth));
        let report = reconciler.reconcile(&packages, previous.as_ref());

        store.save(&report.cache)?;

        info!(
            changed = report.changed_count(),
            failed = report.failures().len(),
            duration_ms = start.elapsed().as_millis(),
            "Sync run complete"
        );
        Ok(report)
    }
}
