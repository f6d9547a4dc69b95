//! End-to-end reconciliation flows against real filesystems

use super::test_utils::Workspace;
use pkgmirror::ignore::IgnoreRules;
use pkgmirror::tree::TreeHasher;
use std::fs;

/// First run with no cache fully copies every package into the mirror.
#[test]
fn test_first_run_copies_all_packages() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "alpha"), ("sub/b.txt", "beta")]);
    ws.add_package("libb", &[("main.rs", "fn main() {}")]);
    ws.write_manifest(&["liba", "libb"]);

    let report = ws.run();

    assert_eq!(report.changed_count(), 2);
    assert_eq!(
        fs::read_to_string(ws.mirror().join("liba/sub/b.txt")).unwrap(),
        "beta"
    );
    assert!(ws.mirror().join("libb/main.rs").exists());
}

/// Running twice with no filesystem changes reports zero changed packages
/// and leaves the mirror untouched.
#[test]
fn test_idempotence() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "alpha")]);
    ws.write_manifest(&["liba"]);

    assert_eq!(ws.run().changed_count(), 1);
    assert_eq!(ws.run().changed_count(), 0);
    assert_eq!(
        fs::read_to_string(ws.mirror().join("liba/a.txt")).unwrap(),
        "alpha"
    );
}

/// After reconciliation, re-hashing the mirror copy of each package yields
/// the same digest as the source.
#[test]
fn test_completeness_mirror_hash_matches_source() {
    let ws = Workspace::new();
    ws.add_package(
        "liba",
        &[
            ("a.txt", "alpha"),
            ("sub/b.txt", "beta"),
            ("sub/deep/nest/c.txt", "gamma"),
        ],
    );
    ws.write_manifest(&["liba"]);

    ws.run();
    // Incremental pass after a deep change must also converge
    ws.add_package("liba", &[("sub/deep/nest/c.txt", "delta")]);
    ws.run();

    let hasher = TreeHasher::new();
    let source = hasher.hash(&ws.dir.path().join("liba")).unwrap();
    let mirrored = hasher.hash(&ws.mirror().join("liba")).unwrap();
    assert_eq!(source.hash, mirrored.hash);
}

/// Only the changed file is rewritten when the change is within the depth
/// budget; a sibling file's mirror timestamp is preserved.
#[test]
fn test_minimality_at_shallow_depth() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "alpha"), ("b/c.txt", "old")]);
    ws.write_manifest(&["liba"]);
    ws.run();

    let untouched = ws.mirror().join("liba/a.txt");
    let before = fs::metadata(&untouched).unwrap().modified().unwrap();

    ws.add_package("liba", &[("b/c.txt", "new")]);
    let report = ws.run();

    assert_eq!(report.changed_count(), 1);
    assert_eq!(
        fs::read_to_string(ws.mirror().join("liba/b/c.txt")).unwrap(),
        "new"
    );
    let after = fs::metadata(&untouched).unwrap().modified().unwrap();
    assert_eq!(before, after);
}

/// A subtree removed from the source disappears from the mirror.
#[test]
fn test_deleted_subtree_removed_from_mirror() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("x/f.txt", "x"), ("y/g.txt", "y")]);
    ws.write_manifest(&["liba"]);
    ws.run();

    fs::remove_dir_all(ws.dir.path().join("liba/x")).unwrap();
    let report = ws.run();

    assert_eq!(report.changed_count(), 1);
    assert!(!ws.mirror().join("liba/x").exists());
    assert!(ws.mirror().join("liba/y/g.txt").exists());
}

/// A package added to the manifest between runs is copied in full and
/// counted as changed.
#[test]
fn test_package_added_between_runs() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "alpha")]);
    ws.write_manifest(&["liba"]);
    ws.run();

    ws.add_package("libb", &[("b.txt", "beta")]);
    ws.write_manifest(&["liba", "libb"]);
    let report = ws.run();

    assert_eq!(report.changed_count(), 1);
    assert!(ws.mirror().join("libb/b.txt").exists());
}

/// Ignored entries are invisible to the hash tree, so changing them does not
/// trigger a sync.
#[test]
fn test_ignored_files_do_not_trigger_changes() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "alpha"), ("debug.log", "one")]);
    fs::write(
        ws.dir.path().join("liba/.syncignore"),
        r#"{"files": ["*.log"], "folders": []}"#,
    )
    .unwrap();
    ws.write_manifest(&["liba"]);
    ws.run();

    fs::write(ws.dir.path().join("liba/debug.log"), "two").unwrap();
    assert_eq!(ws.run().changed_count(), 0);
}

/// Ignore rules shape the tree the same way on both sides of the
/// completeness check.
#[test]
fn test_completeness_with_ignore_rules() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("a.txt", "alpha"), ("tmp/scratch.txt", "junk")]);
    fs::write(
        ws.dir.path().join("liba/.syncignore"),
        r#"{"files": [], "folders": ["tmp"]}"#,
    )
    .unwrap();
    ws.write_manifest(&["liba"]);
    ws.run();

    let rules = IgnoreRules {
        files: vec![],
        folders: vec!["tmp".to_string()],
    };
    let hasher = TreeHasher::new().with_ignore(rules);
    let source = hasher.hash(&ws.dir.path().join("liba")).unwrap();
    let mirrored = hasher.hash(&ws.mirror().join("liba")).unwrap();
    assert_eq!(source.hash, mirrored.hash);
}

/// An entry that changes from file to directory between runs converges: the
/// mirror file is replaced by the directory, not merged under it.
#[test]
fn test_file_to_directory_change_converges() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("x", "i was a file")]);
    ws.write_manifest(&["liba"]);
    ws.run();

    fs::remove_file(ws.dir.path().join("liba/x")).unwrap();
    ws.add_package("liba", &[("x/inner.txt", "now a dir")]);
    let report = ws.run();

    assert!(report.is_clean());
    assert_eq!(report.changed_count(), 1);
    assert_eq!(
        fs::read_to_string(ws.mirror().join("liba/x/inner.txt")).unwrap(),
        "now a dir"
    );
    assert_eq!(ws.run().changed_count(), 0);
}

/// The symmetric case: a directory collapsing into a file converges too.
#[test]
fn test_directory_to_file_change_converges() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("x/inner.txt", "i was a dir")]);
    ws.write_manifest(&["liba"]);
    ws.run();

    fs::remove_dir_all(ws.dir.path().join("liba/x")).unwrap();
    ws.add_package("liba", &[("x", "now a file")]);
    let report = ws.run();

    assert!(report.is_clean());
    assert_eq!(report.changed_count(), 1);
    assert_eq!(
        fs::read_to_string(ws.mirror().join("liba/x")).unwrap(),
        "now a file"
    );
    assert_eq!(ws.run().changed_count(), 0);
}

/// A file moved between subtrees survives the copy-before-delete ordering.
#[test]
fn test_moved_file_present_after_sync() {
    let ws = Workspace::new();
    ws.add_package("liba", &[("from/f.txt", "payload"), ("to/keep.txt", "k")]);
    ws.write_manifest(&["liba"]);
    ws.run();

    fs::remove_dir_all(ws.dir.path().join("liba/from")).unwrap();
    ws.add_package("liba", &[("to/f.txt", "payload")]);
    ws.run();

    assert!(!ws.mirror().join("liba/from").exists());
    assert_eq!(
        fs::read_to_string(ws.mirror().join("liba/to/f.txt")).unwrap(),
        "payload"
    );
}
