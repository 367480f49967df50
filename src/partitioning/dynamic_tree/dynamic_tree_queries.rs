use super::dynamic_tree::{DynamicTree, ProxyId, NULL_NODE};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Point, Real, Vector};
use crate::query::RayCastInput;
use crate::utils::WCross;
use smallvec::SmallVec;

/// Stack of nodes awaiting traversal.
type TraversalStack = SmallVec<[u32; 256]>;

impl<T: Copy> DynamicTree<T> {
    /// Calls `callback` on each proxy whose fat AABB overlaps `aabb`.
    ///
    /// The traversal stops early if `callback` returns `false`.
    pub fn query(&self, aabb: &Aabb, mut callback: impl FnMut(ProxyId) -> bool) {
        let mut stack = TraversalStack::new();
        stack.push(self.root);

        while let Some(node_id) = stack.pop() {
            if node_id == NULL_NODE {
                continue;
            }

            let node = &self.nodes[node_id as usize];

            if node.aabb.intersects(aabb) {
                if node.is_leaf() {
                    if !callback(ProxyId(node_id)) {
                        return;
                    }
                } else {
                    stack.push(node.child1);
                    stack.push(node.child2);
                }
            }
        }
    }

    /// Casts a ray against the fat AABBs of the proxies of this tree.
    ///
    /// `callback` is invoked for each proxy whose fat AABB may be hit by the segment
    /// `input.p1` to `input.point_at(max_fraction)`, where `max_fraction` starts at
    /// `input.max_fraction`. It performs the exact ray cast against the proxy and returns:
    /// - `0.0` to terminate the traversal,
    /// - a positive value to clip the ray to that fraction,
    /// - a negative value to ignore this proxy and continue.
    ///
    /// Panics if the ray is degenerate (`input.p1 == input.p2`).
    pub fn ray_cast(
        &self,
        input: &RayCastInput,
        mut callback: impl FnMut(&RayCastInput, ProxyId) -> Real,
    ) {
        let p1 = input.p1;
        let dir = input.dir();
        let r = dir
            .try_normalize(0.0)
            .unwrap_or_else(|| panic!("cannot cast a degenerate ray"));

        // v is perpendicular to the segment.
        let v = (1.0 as Real).gcross(r);
        let abs_v = v.abs();

        let mut max_fraction = input.max_fraction;
        let mut swept_aabb = segment_aabb(&p1, &dir, max_fraction);

        let mut stack = TraversalStack::new();
        stack.push(self.root);

        while let Some(node_id) = stack.pop() {
            if node_id == NULL_NODE {
                continue;
            }

            let node = &self.nodes[node_id as usize];

            if !node.aabb.intersects(&swept_aabb) {
                continue;
            }

            // Separating axis for the segment: |dot(v, p1 - c)| > dot(|v|, h).
            let c = node.aabb.center();
            let h = node.aabb.half_extents();
            let separation = v.dot(&(p1 - c)).abs() - abs_v.dot(&h);
            if separation > 0.0 {
                continue;
            }

            if node.is_leaf() {
                let sub_input = RayCastInput::new(input.p1, input.p2, max_fraction);
                let value = callback(&sub_input, ProxyId(node_id));

                if value == 0.0 {
                    // The client has terminated the ray cast.
                    return;
                }

                if value > 0.0 {
                    max_fraction = value;
                    swept_aabb = segment_aabb(&p1, &dir, max_fraction);
                }
            } else {
                stack.push(node.child1);
                stack.push(node.child2);
            }
        }
    }
}

fn segment_aabb(p1: &Point<Real>, dir: &Vector<Real>, fraction: Real) -> Aabb {
    let mut aabb = Aabb::new(*p1, *p1);
    aabb.take_point(p1 + dir * fraction);
    aabb
}
