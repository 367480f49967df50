use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Real, Vector};
use crate::settings::Settings;

pub(super) const NULL_NODE: u32 = u32::MAX;

/// Handle of a leaf of a [`DynamicTree`].
///
/// A handle stays valid until its proxy is destroyed. The handles of destroyed proxies
/// are reused by subsequently created proxies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ProxyId(pub(super) u32);

impl ProxyId {
    /// The index of the tree node this handle refers to.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the dynamic tree.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TreeNode<T> {
    /// Enlarged AABB. Leaves store the fat AABB of their proxy.
    pub aabb: Aabb,
    pub(super) parent: u32,
    pub(super) child1: u32,
    pub(super) child2: u32,
    /// Leaf = 0, free node = -1.
    pub(super) height: i32,
    pub(super) user_data: Option<T>,
    pub(super) moved: bool,
}

impl<T> TreeNode<T> {
    fn free() -> Self {
        TreeNode {
            aabb: Aabb::new_invalid(),
            parent: NULL_NODE,
            child1: NULL_NODE,
            child2: NULL_NODE,
            height: -1,
            user_data: None,
            moved: false,
        }
    }

    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.child1 == NULL_NODE
    }
}

/// A dynamic AABB tree broad-phase.
///
/// Leaves are proxies with a fat AABB: the AABB of the proxy enlarged by a margin, so the
/// proxy can move by small amounts without triggering a tree update. Internal nodes have
/// exactly two children and an AABB enclosing them. The tree is kept balanced with tree
/// rotations: the heights of the two children of any node differ by at most one.
///
/// Nodes are pooled in an arena and relocatable, so node indices are used instead of
/// pointers.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DynamicTree<T> {
    pub(super) root: u32,
    pub(super) nodes: Vec<TreeNode<T>>,
    pub(super) free_list: Vec<u32>,
    pub(super) proxy_count: usize,
    aabb_extension: Real,
    aabb_multiplier: Real,
}

impl<T: Copy> Default for DynamicTree<T> {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl<T: Copy> DynamicTree<T> {
    /// Creates an empty tree, with the fat AABB margins of `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self::with_margins(settings.aabb_extension, settings.aabb_multiplier)
    }

    /// Creates an empty tree with explicit fat AABB margins.
    ///
    /// Leaf AABBs are enlarged by `aabb_extension` on every side, and by
    /// `aabb_multiplier` times the displacement when a proxy is moved.
    pub fn with_margins(aabb_extension: Real, aabb_multiplier: Real) -> Self {
        DynamicTree {
            root: NULL_NODE,
            nodes: Vec::new(),
            free_list: Vec::new(),
            proxy_count: 0,
            aabb_extension,
            aabb_multiplier,
        }
    }

    /// Is this tree empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root == NULL_NODE
    }

    /// The number of proxies in this tree.
    #[inline]
    pub fn proxy_count(&self) -> usize {
        self.proxy_count
    }

    /// The root node of this tree, if it is not empty.
    #[inline]
    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.nodes.get(self.root as usize)
    }

    /// Creates a proxy. Provide a tight fitting AABB and some user data.
    ///
    /// The new proxy is flagged as moved.
    pub fn create_proxy(&mut self, aabb: Aabb, user_data: T) -> ProxyId {
        let proxy_id = self.allocate_node();

        let node = &mut self.nodes[proxy_id as usize];
        node.aabb = aabb.loosened(self.aabb_extension);
        node.user_data = Some(user_data);
        node.height = 0;
        node.moved = true;

        self.insert_leaf(proxy_id);
        self.proxy_count += 1;

        ProxyId(proxy_id)
    }

    /// Destroys a proxy.
    ///
    /// Panics if `proxy_id` does not name a live proxy.
    pub fn destroy_proxy(&mut self, proxy_id: ProxyId) {
        self.assert_leaf(proxy_id);

        self.remove_leaf(proxy_id.0);
        self.free_node(proxy_id.0);
        self.proxy_count -= 1;
    }

    /// Moves a proxy to the tight AABB `aabb`, swept by `displacement`.
    ///
    /// If the new AABB is still contained in the fat AABB of the proxy, nothing happens
    /// and `false` is returned. Otherwise the proxy is reinserted with a new fat AABB,
    /// extended along the predicted displacement, and is flagged as moved.
    pub fn move_proxy(
        &mut self,
        proxy_id: ProxyId,
        aabb: Aabb,
        displacement: &Vector<Real>,
    ) -> bool {
        self.assert_leaf(proxy_id);

        if self.nodes[proxy_id.index()].aabb.contains(&aabb) {
            return false;
        }

        self.remove_leaf(proxy_id.0);

        let node = &mut self.nodes[proxy_id.index()];
        node.aabb = aabb
            .loosened(self.aabb_extension)
            .extended_along(&(displacement * self.aabb_multiplier));
        node.moved = true;

        self.insert_leaf(proxy_id.0);
        true
    }

    /// The user data of a proxy.
    #[inline]
    pub fn user_data(&self, proxy_id: ProxyId) -> T {
        self.assert_leaf(proxy_id);
        // The assertion above guarantees a leaf, and leaves always carry user data.
        self.nodes[proxy_id.index()]
            .user_data
            .unwrap_or_else(|| unreachable!())
    }

    /// The fat AABB of a proxy.
    #[inline]
    pub fn fat_aabb(&self, proxy_id: ProxyId) -> &Aabb {
        self.assert_leaf(proxy_id);
        &self.nodes[proxy_id.index()].aabb
    }

    /// Was this proxy created or reinserted since its moved flag was last cleared?
    #[inline]
    pub fn was_moved(&self, proxy_id: ProxyId) -> bool {
        self.assert_leaf(proxy_id);
        self.nodes[proxy_id.index()].moved
    }

    /// Clears the moved flag of a proxy.
    #[inline]
    pub fn clear_moved(&mut self, proxy_id: ProxyId) {
        self.assert_leaf(proxy_id);
        self.nodes[proxy_id.index()].moved = false;
    }

    /// The height of the tree: 0 for an empty or single-leaf tree.
    pub fn height(&self) -> usize {
        self.root().map(|root| root.height as usize).unwrap_or(0)
    }

    /// Shifts the world origin. Useful for large worlds.
    ///
    /// The shift is subtracted from every AABB: `new_origin` becomes the origin.
    pub fn shift_origin(&mut self, new_origin: &Vector<Real>) {
        for node in &mut self.nodes {
            if node.height >= 0 {
                node.aabb = node.aabb.translated(&-new_origin);
            }
        }
    }

    /// Rebuilds the whole tree bottom-up, pairing the nodes with the smallest combined
    /// perimeter first.
    ///
    /// This is very expensive (cubic in the number of proxies) and the resulting tree is not
    /// necessarily balanced, but it often has a better quality.
    pub fn rebuild_bottom_up(&mut self) {
        let mut nodes = Vec::with_capacity(self.proxy_count);

        // Free the internal nodes, keep the leaves.
        for i in 0..self.nodes.len() as u32 {
            let node = &mut self.nodes[i as usize];

            if node.height < 0 {
                continue;
            }

            if node.is_leaf() {
                node.parent = NULL_NODE;
                nodes.push(i);
            } else {
                self.free_node(i);
            }
        }

        while nodes.len() > 1 {
            let mut min_cost = Real::MAX;
            let (mut i_min, mut j_min) = (usize::MAX, usize::MAX);

            for i in 0..nodes.len() {
                let aabb_i = self.nodes[nodes[i] as usize].aabb;

                for j in i + 1..nodes.len() {
                    let aabb_j = &self.nodes[nodes[j] as usize].aabb;
                    let cost = aabb_i.merged(aabb_j).perimeter();

                    if cost < min_cost {
                        i_min = i;
                        j_min = j;
                        min_cost = cost;
                    }
                }
            }

            let index1 = nodes[i_min];
            let index2 = nodes[j_min];

            let parent_index = self.allocate_node();
            let aabb = self.nodes[index1 as usize]
                .aabb
                .merged(&self.nodes[index2 as usize].aabb);
            let height = 1 + self.nodes[index1 as usize]
                .height
                .max(self.nodes[index2 as usize].height);

            let parent = &mut self.nodes[parent_index as usize];
            parent.child1 = index1;
            parent.child2 = index2;
            parent.height = height;
            parent.aabb = aabb;
            parent.parent = NULL_NODE;

            self.nodes[index1 as usize].parent = parent_index;
            self.nodes[index2 as usize].parent = parent_index;

            nodes[j_min] = nodes[nodes.len() - 1];
            nodes[i_min] = parent_index;
            let _ = nodes.pop();
        }

        self.root = nodes.first().copied().unwrap_or(NULL_NODE);
    }

    fn assert_leaf(&self, proxy_id: ProxyId) {
        assert!(
            self.nodes
                .get(proxy_id.index())
                .map(|node| node.height == 0)
                .unwrap_or(false),
            "invalid proxy handle {:?}",
            proxy_id
        );
    }

    fn allocate_node(&mut self) -> u32 {
        if let Some(id) = self.free_list.pop() {
            id
        } else {
            self.nodes.push(TreeNode::free());
            (self.nodes.len() - 1) as u32
        }
    }

    fn free_node(&mut self, node_id: u32) {
        self.nodes[node_id as usize] = TreeNode::free();
        self.free_list.push(node_id);
    }

    fn insert_leaf(&mut self, leaf: u32) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent = NULL_NODE;
            return;
        }

        // Find the best sibling for this node.
        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let mut index = self.root;

        while !self.nodes[index as usize].is_leaf() {
            let node = &self.nodes[index as usize];
            let child1 = node.child1;
            let child2 = node.child2;

            let area = node.aabb.perimeter();
            let combined_area = node.aabb.merged(&leaf_aabb).perimeter();

            // Cost of creating a new parent for this node and the new leaf.
            let cost = 2.0 * combined_area;

            // Minimum cost of pushing the leaf further down the tree.
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost1 = self.descent_cost(child1, &leaf_aabb, inheritance_cost);
            let cost2 = self.descent_cost(child2, &leaf_aabb, inheritance_cost);

            if cost < cost1 && cost < cost2 {
                break;
            }

            index = if cost1 < cost2 { child1 } else { child2 };
        }

        let sibling = index;

        // Create a new parent.
        let old_parent = self.nodes[sibling as usize].parent;
        let new_parent = self.allocate_node();
        let sibling_height = self.nodes[sibling as usize].height;
        let aabb = leaf_aabb.merged(&self.nodes[sibling as usize].aabb);

        let node = &mut self.nodes[new_parent as usize];
        node.parent = old_parent;
        node.aabb = aabb;
        node.height = sibling_height + 1;
        node.child1 = sibling;
        node.child2 = leaf;

        if old_parent != NULL_NODE {
            let parent = &mut self.nodes[old_parent as usize];
            if parent.child1 == sibling {
                parent.child1 = new_parent;
            } else {
                parent.child2 = new_parent;
            }
        } else {
            self.root = new_parent;
        }

        self.nodes[sibling as usize].parent = new_parent;
        self.nodes[leaf as usize].parent = new_parent;

        self.fix_upwards(new_parent);
    }

    fn descent_cost(&self, child: u32, leaf_aabb: &Aabb, inheritance_cost: Real) -> Real {
        let child = &self.nodes[child as usize];
        let combined = leaf_aabb.merged(&child.aabb).perimeter();

        if child.is_leaf() {
            combined + inheritance_cost
        } else {
            combined - child.aabb.perimeter() + inheritance_cost
        }
    }

    fn remove_leaf(&mut self, leaf: u32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf as usize].parent;
        let grand_parent = self.nodes[parent as usize].parent;
        let sibling = if self.nodes[parent as usize].child1 == leaf {
            self.nodes[parent as usize].child2
        } else {
            self.nodes[parent as usize].child1
        };

        if grand_parent != NULL_NODE {
            // Destroy the parent and connect the sibling to the grand parent.
            let gp = &mut self.nodes[grand_parent as usize];
            if gp.child1 == parent {
                gp.child1 = sibling;
            } else {
                gp.child2 = sibling;
            }
            self.nodes[sibling as usize].parent = grand_parent;
            self.free_node(parent);

            self.fix_upwards(grand_parent);
        } else {
            self.root = sibling;
            self.nodes[sibling as usize].parent = NULL_NODE;
            self.free_node(parent);
        }
    }

    /// Walks back up the tree from `start`, rebalancing and refitting every ancestor.
    fn fix_upwards(&mut self, start: u32) {
        let mut index = start;

        while index != NULL_NODE {
            index = self.balance(index);

            let child1 = self.nodes[index as usize].child1;
            let child2 = self.nodes[index as usize].child2;
            self.refit(index, child1, child2);

            index = self.nodes[index as usize].parent;
        }
    }

    fn refit(&mut self, index: u32, child1: u32, child2: u32) {
        let c1 = &self.nodes[child1 as usize];
        let c2 = &self.nodes[child2 as usize];
        let height = 1 + c1.height.max(c2.height);
        let aabb = c1.aabb.merged(&c2.aabb);

        let node = &mut self.nodes[index as usize];
        node.height = height;
        node.aabb = aabb;
    }

    /// Performs a left or right rotation if node `ia` is imbalanced.
    ///
    /// Returns the new root of the subtree.
    fn balance(&mut self, ia: u32) -> u32 {
        let a = &self.nodes[ia as usize];
        if a.is_leaf() || a.height < 2 {
            return ia;
        }

        let ib = a.child1;
        let ic = a.child2;

        let balance = self.nodes[ic as usize].height - self.nodes[ib as usize].height;

        if balance > 1 {
            // Rotate C up.
            self.rotate_up(ia, ic, ib, false)
        } else if balance < -1 {
            // Rotate B up.
            self.rotate_up(ia, ib, ic, true)
        } else {
            ia
        }
    }

    /// Rotates the child `iup` of `ia` up, `ia` keeping its other child `ikeep`.
    ///
    /// The taller child of `iup` stays with `iup`, the shorter one moves under `ia`.
    /// `up_is_child1` tells which slot of `ia` holds `iup`.
    fn rotate_up(&mut self, ia: u32, iup: u32, ikeep: u32, up_is_child1: bool) -> u32 {
        let i1 = self.nodes[iup as usize].child1;
        let i2 = self.nodes[iup as usize].child2;

        // Swap A and its child.
        let a_parent = self.nodes[ia as usize].parent;
        self.nodes[iup as usize].child1 = ia;
        self.nodes[iup as usize].parent = a_parent;
        self.nodes[ia as usize].parent = iup;

        // A's old parent should point to the rotated node.
        if a_parent != NULL_NODE {
            let parent = &mut self.nodes[a_parent as usize];
            if parent.child1 == ia {
                parent.child1 = iup;
            } else {
                debug_assert_eq!(parent.child2, ia);
                parent.child2 = iup;
            }
        } else {
            self.root = iup;
        }

        let (itall, ishort) = if self.nodes[i1 as usize].height > self.nodes[i2 as usize].height {
            (i1, i2)
        } else {
            (i2, i1)
        };

        self.nodes[iup as usize].child2 = itall;
        if up_is_child1 {
            self.nodes[ia as usize].child1 = ishort;
        } else {
            self.nodes[ia as usize].child2 = ishort;
        }
        self.nodes[ishort as usize].parent = ia;

        let (a1, a2) = if up_is_child1 {
            (ishort, ikeep)
        } else {
            (ikeep, ishort)
        };
        self.refit(ia, a1, a2);
        self.refit(iup, ia, itall);

        iup
    }
}
