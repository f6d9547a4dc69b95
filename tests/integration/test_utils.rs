//! Shared fixtures for integration tests

use pkgmirror::config::SyncConfig;
use pkgmirror::reconcile::SyncReport;
use pkgmirror::sync::SyncRunner;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A throwaway project directory with a manifest, package sources, and a
/// mirror target.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Create a package directory with the given relative files.
    pub fn add_package(&self, name: &str, files: &[(&str, &str)]) {
        let root = self.dir.path().join(name);
        fs::create_dir_all(&root).unwrap();
        for (rel, content) in files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    /// Write a manifest referencing the given packages as `file:` deps.
    pub fn write_manifest(&self, names: &[&str]) {
        let deps = names
            .iter()
            .map(|n| format!(r#""{}": "file:{}""#, n, n))
            .collect::<Vec<_>>()
            .join(", ");
        fs::write(
            self.dir.path().join("package.json"),
            format!(r#"{{"dependencies": {{{}}}}}"#, deps),
        )
        .unwrap();
    }

    pub fn mirror(&self) -> PathBuf {
        self.dir.path().join("mirror")
    }

    pub fn config(&self) -> SyncConfig {
        SyncConfig {
            manifest: self.dir.path().join("package.json"),
            mirror_root: self.mirror(),
            ..Default::default()
        }
    }

    /// Execute one sync run.
    pub fn run(&self) -> SyncReport {
        SyncRunner::new(self.config()).run().unwrap()
    }
}
