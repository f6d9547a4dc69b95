//! Structural hash trees
//!
//! Represents each package directory as a hash tree, where every node (file
//! or directory) carries a deterministic digest of its content and structure.

pub mod hasher;
pub mod node;

pub use hasher::TreeHasher;
pub use node::HashNode;
