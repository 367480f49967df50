use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Real, Vector};
use crate::partitioning::{DynamicTree, ProxyId};
use crate::query::RayCastInput;
use crate::settings::Settings;
use crate::utils::SortedPair;
use hashbrown::HashSet;

/// The broad-phase, used to compute pairs of proxies with overlapping fat AABBs.
///
/// Proxies that moved enough to be reinserted in the tree, or that were explicitly
/// touched, are buffered until the next [`BroadPhase::update_pairs`], which reports
/// every new potential pair involving them.
#[derive(Clone, Debug)]
pub struct BroadPhase<T> {
    tree: DynamicTree<T>,
    move_buffer: Vec<ProxyId>,
    pair_buffer: Vec<SortedPair<ProxyId>>,
    seen_pairs: HashSet<SortedPair<ProxyId>>,
}

impl<T: Copy> Default for BroadPhase<T> {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl<T: Copy> BroadPhase<T> {
    /// Creates an empty broad-phase using the fat AABB margins of `settings`.
    pub fn new(settings: &Settings) -> Self {
        BroadPhase {
            tree: DynamicTree::new(settings),
            move_buffer: Vec::new(),
            pair_buffer: Vec::new(),
            seen_pairs: HashSet::new(),
        }
    }

    /// The dynamic tree of this broad-phase.
    #[inline]
    pub fn tree(&self) -> &DynamicTree<T> {
        &self.tree
    }

    /// Creates a proxy with an initial AABB.
    ///
    /// Pairs are not reported until [`BroadPhase::update_pairs`] is called.
    pub fn create_proxy(&mut self, aabb: Aabb, user_data: T) -> ProxyId {
        let proxy_id = self.tree.create_proxy(aabb, user_data);
        self.buffer_move(proxy_id);
        proxy_id
    }

    /// Destroys a proxy. It is up to the client to remove any pair.
    pub fn destroy_proxy(&mut self, proxy_id: ProxyId) {
        self.unbuffer_move(proxy_id);
        self.tree.destroy_proxy(proxy_id);
    }

    /// Moves a proxy. Any number of moves may be issued between two
    /// [`BroadPhase::update_pairs`].
    ///
    /// Returns `true` if the fat AABB of the proxy changed.
    pub fn move_proxy(
        &mut self,
        proxy_id: ProxyId,
        aabb: Aabb,
        displacement: &Vector<Real>,
    ) -> bool {
        let changed = self.tree.move_proxy(proxy_id, aabb, displacement);
        if changed {
            self.buffer_move(proxy_id);
        }
        changed
    }

    /// Forces the next [`BroadPhase::update_pairs`] to report the pairs of this proxy.
    pub fn touch_proxy(&mut self, proxy_id: ProxyId) {
        self.buffer_move(proxy_id);
    }

    /// Do the fat AABBs of these two proxies overlap?
    pub fn test_overlap(&self, proxy_a: ProxyId, proxy_b: ProxyId) -> bool {
        self.tree
            .fat_aabb(proxy_a)
            .intersects(self.tree.fat_aabb(proxy_b))
    }

    /// The user data of a proxy.
    #[inline]
    pub fn user_data(&self, proxy_id: ProxyId) -> T {
        self.tree.user_data(proxy_id)
    }

    /// The fat AABB of a proxy.
    #[inline]
    pub fn fat_aabb(&self, proxy_id: ProxyId) -> &Aabb {
        self.tree.fat_aabb(proxy_id)
    }

    /// The number of proxies.
    #[inline]
    pub fn proxy_count(&self) -> usize {
        self.tree.proxy_count()
    }

    /// The height of the embedded tree.
    pub fn tree_height(&self) -> usize {
        self.tree.height()
    }

    /// The maximum balance of the embedded tree.
    pub fn tree_balance(&self) -> usize {
        self.tree.max_balance()
    }

    /// The quality metric of the embedded tree.
    pub fn tree_quality(&self) -> Real {
        self.tree.area_ratio()
    }

    /// Shifts the world origin. Useful for large worlds.
    pub fn shift_origin(&mut self, new_origin: &Vector<Real>) {
        self.tree.shift_origin(new_origin);
    }

    /// Calls `callback` on each proxy whose fat AABB overlaps `aabb`.
    ///
    /// The query stops early if `callback` returns `false`.
    pub fn query(&self, aabb: &Aabb, callback: impl FnMut(ProxyId) -> bool) {
        self.tree.query(aabb, callback);
    }

    /// Casts a ray against the proxies.
    ///
    /// See [`DynamicTree::ray_cast`] for the semantics of the value returned by `callback`.
    pub fn ray_cast(
        &self,
        input: &RayCastInput,
        callback: impl FnMut(&RayCastInput, ProxyId) -> Real,
    ) {
        self.tree.ray_cast(input, callback);
    }

    /// Reports the new potential pairs to `callback`, then clears the move buffer.
    ///
    /// Each unordered pair is reported at most once per call, as `(user_data_a,
    /// user_data_b)` where proxy `a` has the smaller handle.
    pub fn update_pairs(&mut self, mut callback: impl FnMut(T, T)) {
        self.pair_buffer.clear();
        self.seen_pairs.clear();

        // Perform tree queries for all moving proxies.
        for &query_proxy in &self.move_buffer {
            let fat_aabb = *self.tree.fat_aabb(query_proxy);
            let tree = &self.tree;
            let pair_buffer = &mut self.pair_buffer;
            let seen_pairs = &mut self.seen_pairs;

            tree.query(&fat_aabb, |proxy_id| {
                // A proxy cannot form a pair with itself.
                if proxy_id == query_proxy {
                    return true;
                }

                // Both proxies are moving: the pair is reported when querying the other one.
                if tree.was_moved(proxy_id) && proxy_id > query_proxy {
                    return true;
                }

                let pair = SortedPair::new(proxy_id, query_proxy);
                if seen_pairs.insert(pair) {
                    pair_buffer.push(pair);
                }

                true
            });
        }

        for pair in &self.pair_buffer {
            let (a, b) = pair.into_inner();
            callback(self.tree.user_data(a), self.tree.user_data(b));
        }

        for proxy_id in self.move_buffer.drain(..) {
            self.tree.clear_moved(proxy_id);
        }
    }

    fn buffer_move(&mut self, proxy_id: ProxyId) {
        if !self.move_buffer.contains(&proxy_id) {
            self.move_buffer.push(proxy_id);
        }
    }

    fn unbuffer_move(&mut self, proxy_id: ProxyId) {
        self.move_buffer.retain(|id| *id != proxy_id);
    }
}
