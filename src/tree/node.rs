//! Structural hash tree node for a filesystem entry

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One filesystem entry (file or directory) and, transitively, its entire
/// subtree's content identity.
///
/// Invariant: two trees are structurally and content-identical iff their root
/// hashes are equal. Children reflect directory listing order at hash time and
/// are matched across trees by name, never by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashNode {
    /// Entry name (final path component)
    pub name: String,
    /// Opaque hex digest of the subtree rooted here
    pub hash: String,
    /// True for files; files have no children
    pub is_leaf: bool,
    /// Child nodes, empty for leaves
    #[serde(default)]
    pub children: Vec<HashNode>,
}

impl HashNode {
    /// Create a leaf (file) node.
    pub fn leaf(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            is_leaf: true,
            children: Vec::new(),
        }
    }

    /// Create a directory node with the given children.
    pub fn directory(
        name: impl Into<String>,
        hash: impl Into<String>,
        children: Vec<HashNode>,
    ) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
            is_leaf: false,
            children,
        }
    }

    /// Build a name → node map of the children, one pass per comparison level.
    pub fn children_by_name(&self) -> HashMap<&str, &HashNode> {
        self.children
            .iter()
            .map(|child| (child.name.as_str(), child))
            .collect()
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&HashNode> {
        self.children.iter().find(|c| c.name == name)
    }
}
