//! Display utilities for Rankle.

mod tree;

pub use tree::{render_tree, TreeNode};
