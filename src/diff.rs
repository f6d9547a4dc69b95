//! Bounded-depth structural tree differencing
//!
//! Compares two [`HashNode`] trees describing the same package and produces
//! the minimal copy/delete set needed to bring a mirror in line with the new
//! tree. Subtrees with equal hashes are skipped entirely, which makes the
//! comparison sub-linear in unchanged trees. Below a fixed recursion depth the
//! differ stops analyzing and schedules whole subtrees for copy: "too deep to
//! analyze cheaply" is treated as "changed, copy wholesale".

use crate::tree::node::HashNode;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Default recursion depth budget. Tunable: a lower value trades diff
/// precision for cheaper recursion on deep trees.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Copy/delete operation set for one package, paths relative to the
/// package root's parent (they begin with the package name).
///
/// Invariant: a path never appears in both lists; `to_delete` only holds
/// entries present in the old tree and absent by name from the new tree at
/// the level they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    /// Paths to copy from source into the mirror, whole files or subtrees
    pub to_copy: Vec<PathBuf>,
    /// Paths to remove from the mirror
    pub to_delete: Vec<PathBuf>,
}

impl Delta {
    /// An empty delta: nothing to do.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the delta carries no operations.
    pub fn is_empty(&self) -> bool {
        self.to_copy.is_empty() && self.to_delete.is_empty()
    }

    /// Fold another delta into this one.
    fn merge(&mut self, other: Delta) {
        self.to_copy.extend(other.to_copy);
        self.to_delete.extend(other.to_delete);
    }
}

/// Recursive tree differ with a bounded depth budget.
#[derive(Debug, Clone)]
pub struct Differ {
    max_depth: usize,
}

impl Default for Differ {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Differ {
    /// Create a differ with the default depth budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the depth budget.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Compare two trees rooted at the same named entity.
    ///
    /// Both trees must describe the same package; callers with no old tree
    /// must take the full-copy path instead of invoking the differ.
    pub fn diff(&self, new_tree: &HashNode, old_tree: &HashNode) -> Delta {
        self.diff_at(new_tree, old_tree, Path::new(""), 0)
    }

    fn diff_at(&self, new: &HashNode, old: &HashNode, prefix: &Path, depth: usize) -> Delta {
        // Fast path: identical subtree
        if new.hash == old.hash {
            return Delta::empty();
        }

        let root = prefix.join(&new.name);

        // A changed file is always copied in full. A file that became a
        // directory is copied wholesale too: descending would emit child
        // paths beneath what the mirror still holds as a file.
        if new.is_leaf || old.is_leaf {
            trace!(path = %root.display(), "Leaf or type change");
            return Delta {
                to_copy: vec![root],
                to_delete: Vec::new(),
            };
        }

        let mut delta = Delta::empty();
        let old_children = old.children_by_name();
        let new_names: std::collections::HashSet<&str> =
            new.children.iter().map(|c| c.name.as_str()).collect();

        // Old entries gone from the new tree are removed at this level
        for old_child in &old.children {
            if !new_names.contains(old_child.name.as_str()) {
                delta.to_delete.push(root.join(&old_child.name));
            }
        }

        for new_child in &new.children {
            match old_children.get(new_child.name.as_str()) {
                Some(old_child) if depth < self.max_depth => {
                    delta.merge(self.diff_at(new_child, old_child, &root, depth + 1));
                }
                // New entry, or depth budget exhausted: copy the whole subtree
                _ => {
                    trace!(path = %root.join(&new_child.name).display(), depth, "Wholesale copy");
                    delta.to_copy.push(root.join(&new_child.name));
                }
            }
        }

        delta
    }
}
