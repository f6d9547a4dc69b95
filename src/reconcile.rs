//! Per-package reconciliation against the mirror directory
//!
//! For each discovered package the reconciler either performs a full copy
//! (first run, unreadable cache, or a package new since the last run) or
//! diffs the freshly computed hash tree against the cached one and applies
//! the resulting delta. Copies are applied before deletes within a package so
//! content moving between subtrees never transits through a missing state.
//! Packages are processed strictly sequentially; a failure in one package is
//! isolated and the remaining packages still run.

use crate::cache::BundleCache;
use crate::diff::Differ;
use crate::error::SyncError;
use crate::manifest::Package;
use crate::tree::{HashNode, TreeHasher};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Computes the fresh hash tree for a package. The reconciler never decides
/// how a hash is computed; it only compares opaque digests.
pub trait PackageHasher {
    /// Hash the package's source tree, honoring its ignore rules.
    fn hash(&self, package: &Package) -> Result<HashNode, SyncError>;
}

/// Filesystem-backed hasher, the production collaborator.
#[derive(Debug, Default)]
pub struct FsPackageHasher;

impl PackageHasher for FsPackageHasher {
    fn hash(&self, package: &Package) -> Result<HashNode, SyncError> {
        TreeHasher::new()
            .with_ignore(package.ignore.clone())
            .hash(&package.source_path)
    }
}

/// Result of reconciling one package.
#[derive(Debug)]
pub enum PackageOutcome {
    /// Delta was non-empty, or the package was newly added / fully copied
    Changed,
    /// Mirror already matched the source
    Unchanged,
    /// Hashing or delta application failed; other packages still ran
    Failed(SyncError),
}

/// Outcome of a whole reconciliation run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Per-package outcomes in discovery order
    pub outcomes: Vec<(String, PackageOutcome)>,
    /// Trees to persist as the next run's previous cache. Failed packages
    /// carry their prior cached tree forward so the next run retries the
    /// same delta; failed new packages are absent and retry as full copies.
    pub cache: BundleCache,
}

impl SyncReport {
    /// Number of packages with a non-empty delta or newly added.
    pub fn changed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, PackageOutcome::Changed))
            .count()
    }

    /// Names of packages that failed, with their errors.
    pub fn failures(&self) -> Vec<(&str, &SyncError)> {
        self.outcomes
            .iter()
            .filter_map(|(name, o)| match o {
                PackageOutcome::Failed(e) => Some((name.as_str(), e)),
                _ => None,
            })
            .collect()
    }

    /// True when no package failed.
    pub fn is_clean(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Applies package deltas to the mirror directory.
pub struct Reconciler {
    mirror_root: PathBuf,
    differ: Differ,
    hasher: Box<dyn PackageHasher>,
}

impl Reconciler {
    /// Create a reconciler writing beneath `mirror_root`.
    pub fn new(mirror_root: impl Into<PathBuf>) -> Self {
        Self {
            mirror_root: mirror_root.into(),
            differ: Differ::new(),
            hasher: Box::new(FsPackageHasher),
        }
    }

    /// Override the differ (e.g. a different depth budget).
    pub fn with_differ(mut self, differ: Differ) -> Self {
        self.differ = differ;
        self
    }

    /// Override the hasher collaborator.
    pub fn with_hasher(mut self, hasher: Box<dyn PackageHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Reconcile all packages against the mirror.
    ///
    /// `previous` is the cache from the last successful run, or `None` when
    /// incremental state cannot be trusted (first run, unreadable cache), in
    /// which case every package is removed from the mirror and fully
    /// re-copied. The returned report carries the cache to persist.
    #[instrument(skip_all, fields(packages = packages.len(), incremental = previous.is_some()))]
    pub fn reconcile(&self, packages: &[Package], previous: Option<&BundleCache>) -> SyncReport {
        let mut report = SyncReport::default();

        if let Err(e) = std::fs::create_dir_all(&self.mirror_root) {
            warn!(mirror = %self.mirror_root.display(), error = %e, "Cannot create mirror root");
            for package in packages {
                report.outcomes.push((
                    package.name.clone(),
                    PackageOutcome::Failed(SyncError::copy(&self.mirror_root, &e)),
                ));
            }
            return report;
        }

        for package in packages {
            let outcome = self.reconcile_package(package, previous, &mut report.cache);
            if let PackageOutcome::Failed(ref e) = outcome {
                warn!(package = %package.name, error = %e, "Package reconciliation failed");
                // Carry the stale tree forward so the next run retries
                if let Some(old_tree) = previous.and_then(|c| c.get(&package.name)) {
                    report.cache.insert(package.name.clone(), old_tree.clone());
                }
            }
            report.outcomes.push((package.name.clone(), outcome));
        }

        info!(
            changed = report.changed_count(),
            failed = report.failures().len(),
            "Reconciliation complete"
        );
        report
    }

    fn reconcile_package(
        &self,
        package: &Package,
        previous: Option<&BundleCache>,
        cache_out: &mut BundleCache,
    ) -> PackageOutcome {
        let fresh = match self.hasher.hash(package) {
            Ok(tree) => tree,
            Err(e) => return PackageOutcome::Failed(e),
        };

        let cached = previous.and_then(|c| c.get(&package.name));
        let outcome = match cached {
            // New package, or no trustworthy incremental state at all
            None => {
                debug!(package = %package.name, "Full copy");
                match self.full_copy(package) {
                    Ok(()) => PackageOutcome::Changed,
                    Err(e) => return PackageOutcome::Failed(e),
                }
            }
            Some(old_tree) => {
                let delta = self.differ.diff(&fresh, old_tree);
                if delta.is_empty() {
                    debug!(package = %package.name, "Unchanged");
                    PackageOutcome::Unchanged
                } else {
                    debug!(
                        package = %package.name,
                        copies = delta.to_copy.len(),
                        deletes = delta.to_delete.len(),
                        "Applying delta"
                    );
                    // Copy before delete, always
                    for rel in &delta.to_copy {
                        if let Err(e) = self.copy_into_mirror(package, rel) {
                            return PackageOutcome::Failed(e);
                        }
                    }
                    for rel in &delta.to_delete {
                        if let Err(e) = self.delete_from_mirror(rel) {
                            return PackageOutcome::Failed(e);
                        }
                    }
                    PackageOutcome::Changed
                }
            }
        };

        cache_out.insert(package.name.clone(), fresh);
        outcome
    }

    /// Remove the package's mirror subtree and re-copy it from source.
    fn full_copy(&self, package: &Package) -> Result<(), SyncError> {
        let target = self.mirror_root.join(&package.name);
        remove_path(&target)?;
        copy_recursively(&package.source_path, &target)
    }

    /// Copy one delta path from the package source into the mirror.
    ///
    /// `rel` begins with the package name; the remainder addresses the entry
    /// beneath the package root. The destination is removed first: a delta
    /// copy replaces the mirror entry rather than merging into it, so stale
    /// descendants below the differ's depth budget disappear and a
    /// file-to-directory type change lands cleanly.
    fn copy_into_mirror(&self, package: &Package, rel: &Path) -> Result<(), SyncError> {
        if !is_safe_relative(rel) {
            return Err(SyncError::copy(rel, "path escapes the mirror root"));
        }
        let source = package.source_path.join(below_package_root(rel));
        let dest = self.mirror_root.join(rel);
        remove_path(&dest)?;
        copy_recursively(&source, &dest)
    }

    /// Remove one delta path from the mirror. Missing targets are fine: the
    /// operation is idempotent across retries.
    fn delete_from_mirror(&self, rel: &Path) -> Result<(), SyncError> {
        if !is_safe_relative(rel) {
            return Err(SyncError::delete(rel, "path escapes the mirror root"));
        }
        remove_path(&self.mirror_root.join(rel))
    }
}

/// Strip the leading package-name component from a delta path.
fn below_package_root(rel: &Path) -> PathBuf {
    let mut components = rel.components();
    components.next();
    components.as_path().to_path_buf()
}

/// Copy a file or directory tree, overwriting existing destination entries.
fn copy_recursively(source: &Path, dest: &Path) -> Result<(), SyncError> {
    let metadata = std::fs::metadata(source).map_err(|e| SyncError::copy(source, e))?;

    if metadata.is_file() {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::copy(dest, e))?;
        }
        std::fs::copy(source, dest).map_err(|e| SyncError::copy(dest, e))?;
        return Ok(());
    }

    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| SyncError::copy(source, e))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| SyncError::copy(entry.path(), e))?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| SyncError::copy(&target, e))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| SyncError::copy(&target, e))?;
            }
            std::fs::copy(entry.path(), &target).map_err(|e| SyncError::copy(&target, e))?;
        }
        // Symlinks are skipped, matching the hasher's traversal
    }
    Ok(())
}

/// Remove a file or directory tree; absent paths are not an error.
fn remove_path(path: &Path) -> Result<(), SyncError> {
    match std::fs::metadata(path) {
        Ok(m) if m.is_dir() => {
            std::fs::remove_dir_all(path).map_err(|e| SyncError::delete(path, e))
        }
        Ok(_) => std::fs::remove_file(path).map_err(|e| SyncError::delete(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SyncError::delete(path, e)),
    }
}

// Delta paths are built from HashNode names, but those names come from a
// cache file anyone can edit; reject anything that escapes the mirror root.
fn is_safe_relative(rel: &Path) -> bool {
    rel.components()
        .all(|c| matches!(c, Component::Normal(_)))
}
