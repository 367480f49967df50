//! Spatial partitioning tools.

pub use self::dynamic_tree::{DynamicTree, ProxyId, TreeNode};

mod dynamic_tree;
