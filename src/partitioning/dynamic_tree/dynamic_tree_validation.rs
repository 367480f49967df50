use super::dynamic_tree::{DynamicTree, NULL_NODE};
use crate::bounding_volume::BoundingVolume;
use crate::math::Real;
use hashbrown::HashSet;

impl<T: Copy> DynamicTree<T> {
    /// Panics if the tree isn’t well-formed.
    ///
    /// The tree is well-formed if it is topologically correct (parent and child links
    /// agree, every allocated node is reachable exactly once) and its metadata is correct
    /// (stored heights match the actual heights and every internal node AABB encloses the
    /// AABBs of its children).
    pub fn assert_well_formed(&self) {
        if self.root == NULL_NODE {
            assert_eq!(self.proxy_count, 0);
            return;
        }

        assert_eq!(self.nodes[self.root as usize].parent, NULL_NODE);

        let mut loop_detection = HashSet::new();
        let leaf_count = self.assert_well_formed_recurse(self.root, &mut loop_detection);
        assert_eq!(leaf_count, self.proxy_count);

        let free_count = self.nodes.iter().filter(|node| node.height < 0).count();
        assert_eq!(free_count, self.free_list.len());
        assert_eq!(loop_detection.len() + free_count, self.nodes.len());
    }

    fn assert_well_formed_recurse(&self, node_id: u32, loop_detection: &mut HashSet<u32>) -> usize {
        assert!(loop_detection.insert(node_id), "loop detected in the tree");

        let node = &self.nodes[node_id as usize];
        assert!(node.height >= 0);

        if node.is_leaf() {
            assert_eq!(node.child2, NULL_NODE);
            assert_eq!(node.height, 0);
            assert!(node.user_data.is_some());
            return 1;
        }

        let child1 = &self.nodes[node.child1 as usize];
        let child2 = &self.nodes[node.child2 as usize];

        assert_eq!(child1.parent, node_id);
        assert_eq!(child2.parent, node_id);
        assert_eq!(node.height, 1 + child1.height.max(child2.height));
        assert!(node.aabb.contains(&child1.aabb));
        assert!(node.aabb.contains(&child2.aabb));

        self.assert_well_formed_recurse(node.child1, loop_detection)
            + self.assert_well_formed_recurse(node.child2, loop_detection)
    }

    /// Computes the height of the tree by traversal, ignoring the stored heights.
    pub fn compute_height(&self) -> usize {
        if self.root == NULL_NODE {
            0
        } else {
            self.compute_height_recurse(self.root)
        }
    }

    fn compute_height_recurse(&self, node_id: u32) -> usize {
        let node = &self.nodes[node_id as usize];

        if node.is_leaf() {
            0
        } else {
            1 + self
                .compute_height_recurse(node.child1)
                .max(self.compute_height_recurse(node.child2))
        }
    }

    /// The maximum height difference between the two children of any internal node.
    pub fn max_balance(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.height > 1)
            .map(|node| {
                let h1 = self.nodes[node.child1 as usize].height;
                let h2 = self.nodes[node.child2 as usize].height;
                (h2 - h1).unsigned_abs() as usize
            })
            .max()
            .unwrap_or(0)
    }

    /// The ratio of the sum of the node perimeters to the root perimeter.
    ///
    /// This measures the quality of the tree: lower is better. Returns 0 for an
    /// empty tree.
    pub fn area_ratio(&self) -> Real {
        let root = match self.root() {
            Some(root) => root,
            None => return 0.0,
        };

        let root_area = root.aabb.perimeter();
        let total_area: Real = self
            .nodes
            .iter()
            .filter(|node| node.height >= 0)
            .map(|node| node.aabb.perimeter())
            .sum();

        total_area / root_area
    }

    /// Panics if the tree is malformed or if its balance invariant is violated.
    ///
    /// In addition to [`DynamicTree::assert_well_formed`], this checks that the cached
    /// tree height matches the traversal height and that no node is out of balance.
    pub fn validate(&self) {
        self.assert_well_formed();
        assert_eq!(self.height(), self.compute_height());
        assert!(self.max_balance() <= 1, "the tree is out of balance");
    }
}
