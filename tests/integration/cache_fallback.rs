//! Cache-miss and cache-corruption recovery behavior

use super::test_utils::Workspace;
use pkgmirror::cache::{CacheStore, CACHE_FILE};
use std::fs;

/// Deleting the cache file forces a full resync of every package, even ones
/// whose mirror copy is already current.
#[test]
fn test_missing_cache_forces_full_resync() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "alpha")]);
    ws.add_package("libb", &[("b.txt", "beta")]);
    ws.write_manifest(&["liba", "libb"]);
    ws.run();

    fs::remove_file(ws.mirror().join(CACHE_FILE)).unwrap();
    let report = ws.run();

    // Everything counts as changed when incremental state cannot be trusted
    assert_eq!(report.changed_count(), 2);
    assert!(ws.mirror().join("liba/a.txt").exists());
}

/// A corrupt cache file degrades to the same full resync, never an error.
#[test]
fn test_malformed_cache_forces_full_resync() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "alpha")]);
    ws.write_manifest(&["liba"]);
    ws.run();

    fs::write(ws.mirror().join(CACHE_FILE), "{{ definitely not json").unwrap();
    let report = ws.run();

    assert_eq!(report.changed_count(), 1);
    // The cache is rewritten and the next run is incremental again
    assert_eq!(ws.run().changed_count(), 0);
}

/// The full resync path removes stale mirror content that the lost cache can
/// no longer account for.
#[test]
fn test_full_resync_removes_stale_mirror_content() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "alpha")]);
    ws.write_manifest(&["liba"]);
    ws.run();

    // Stale file in the mirror, source removed, cache lost
    fs::write(ws.mirror().join("liba").join("stale.txt"), "stale").unwrap();
    fs::remove_file(ws.mirror().join(CACHE_FILE)).unwrap();
    ws.run();

    assert!(!ws.mirror().join("liba/stale.txt").exists());
    assert!(ws.mirror().join("liba/a.txt").exists());
}

/// The cache written after a run reflects the freshly computed trees.
#[test]
fn test_cache_tracks_fresh_trees() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "one")]);
    ws.write_manifest(&["liba"]);
    ws.run();

    let store = CacheStore::for_mirror(&ws.mirror());
    let before = store.load().unwrap().get("liba").unwrap().hash.clone();

    ws.add_package("liba", &[("a.txt", "two")]);
    ws.run();

    let after = store.load().unwrap().get("liba").unwrap().hash.clone();
    assert_ne!(before, after);
}
