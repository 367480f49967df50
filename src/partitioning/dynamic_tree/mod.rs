//! A dynamic AABB tree, kept balanced with AVL rotations.

pub use self::dynamic_tree::{DynamicTree, ProxyId, TreeNode};

mod dynamic_tree;
mod dynamic_tree_queries;
mod dynamic_tree_validation;

#[cfg(test)]
mod dynamic_tree_tests;
