use crate::math::{Isometry, Point, Real, Vector, DEFAULT_EPSILON};
use crate::query::gjk::DistanceProxy;
use crate::utils::WCross;

/// The vertex indices of the last simplex of a GJK run, used to warm-start the next run.
///
/// A cache is owned by whoever repeatedly queries the same pair of proxies (typically a
/// contact) and must only be reused with the same pair of proxies. Initialize it with
/// `SimplexCache::default()`.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SimplexCache {
    /// Length or area of the cached simplex, used to detect stale caches.
    pub metric: Real,
    /// Number of cached vertices.
    pub count: usize,
    /// Vertex indices on the first proxy.
    pub index_a: [usize; 3],
    /// Vertex indices on the second proxy.
    pub index_b: [usize; 3],
}

/// A vertex of the GJK simplex: a point of the Minkowski difference `B - A`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimplexVertex {
    /// Support point on the first proxy, in world-space.
    pub w_a: Point<Real>,
    /// Support point on the second proxy, in world-space.
    pub w_b: Point<Real>,
    /// `w_b - w_a`.
    pub w: Vector<Real>,
    /// Barycentric coordinate of the closest point.
    pub a: Real,
    /// Index of `w_a` on the first proxy.
    pub index_a: usize,
    /// Index of `w_b` on the second proxy.
    pub index_b: usize,
}

impl SimplexVertex {
    fn origin() -> Self {
        SimplexVertex {
            w_a: Point::origin(),
            w_b: Point::origin(),
            w: Vector::zeros(),
            a: 0.0,
            index_a: 0,
            index_b: 0,
        }
    }

    pub(crate) fn new(
        proxy_a: &DistanceProxy,
        pos_a: &Isometry<Real>,
        index_a: usize,
        proxy_b: &DistanceProxy,
        pos_b: &Isometry<Real>,
        index_b: usize,
    ) -> Self {
        let w_a = pos_a * proxy_a.vertex(index_a);
        let w_b = pos_b * proxy_b.vertex(index_b);

        SimplexVertex {
            w_a,
            w_b,
            w: w_b - w_a,
            a: 0.0,
            index_a,
            index_b,
        }
    }
}

/// A simplex of up to three vertices of the Minkowski difference of two proxies.
#[derive(Clone, Debug)]
pub struct Simplex {
    pub(crate) vertices: [SimplexVertex; 3],
    pub(crate) count: usize,
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new()
    }
}

impl Simplex {
    /// Creates an empty simplex.
    pub fn new() -> Self {
        Simplex {
            vertices: [SimplexVertex::origin(); 3],
            count: 0,
        }
    }

    /// The number of vertices of this simplex.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// The active vertices of this simplex.
    #[inline]
    pub fn vertices(&self) -> &[SimplexVertex] {
        &self.vertices[..self.count]
    }

    /// Initializes this simplex from `cache`.
    ///
    /// The cache is flushed if the metric of the rebuilt simplex differs from the cached
    /// one by more than a factor of two, or is too small. An empty or flushed cache
    /// yields the single vertex made of the first vertex of each proxy.
    pub fn read_cache(
        &mut self,
        cache: &SimplexCache,
        proxy_a: &DistanceProxy,
        pos_a: &Isometry<Real>,
        proxy_b: &DistanceProxy,
        pos_b: &Isometry<Real>,
    ) {
        assert!(cache.count <= 3);

        self.count = cache.count;
        for i in 0..self.count {
            self.vertices[i] = SimplexVertex::new(
                proxy_a,
                pos_a,
                cache.index_a[i],
                proxy_b,
                pos_b,
                cache.index_b[i],
            );
        }

        if self.count > 1 {
            let metric1 = cache.metric;
            let metric2 = self.metric();
            if metric2 < 0.5 * metric1 || 2.0 * metric1 < metric2 || metric2 < DEFAULT_EPSILON {
                self.count = 0;
            }
        }

        if self.count == 0 {
            self.vertices[0] = SimplexVertex::new(proxy_a, pos_a, 0, proxy_b, pos_b, 0);
            self.vertices[0].a = 1.0;
            self.count = 1;
        }
    }

    /// Stores the vertex indices and metric of this simplex into `cache`.
    pub fn write_cache(&self, cache: &mut SimplexCache) {
        cache.metric = self.metric();
        cache.count = self.count;

        for (i, v) in self.vertices().iter().enumerate() {
            cache.index_a[i] = v.index_a;
            cache.index_b[i] = v.index_b;
        }
    }

    /// The direction, from the simplex, toward the origin.
    pub fn search_direction(&self) -> Vector<Real> {
        match self.count {
            1 => -self.vertices[0].w,
            2 => {
                let e12 = self.vertices[1].w - self.vertices[0].w;
                let sgn = e12.gcross(-self.vertices[0].w);

                // Perpendicular to e12, on the side of the origin.
                if sgn > 0.0 {
                    (1.0 as Real).gcross(e12)
                } else {
                    Vector::new(e12.y, -e12.x)
                }
            }
            _ => unreachable!(),
        }
    }

    /// The point of the simplex closest to the origin.
    pub fn closest_point(&self) -> Vector<Real> {
        match self.count {
            1 => self.vertices[0].w,
            2 => self.vertices[0].w * self.vertices[0].a + self.vertices[1].w * self.vertices[1].a,
            3 => Vector::zeros(),
            _ => unreachable!(),
        }
    }

    /// The pair of closest points on both proxies, in world-space.
    pub fn witness_points(&self) -> (Point<Real>, Point<Real>) {
        let [v1, v2, v3] = &self.vertices;

        match self.count {
            1 => (v1.w_a, v1.w_b),
            2 => (
                Point::from(v1.w_a.coords * v1.a + v2.w_a.coords * v2.a),
                Point::from(v1.w_b.coords * v1.a + v2.w_b.coords * v2.a),
            ),
            3 => {
                let p = Point::from(
                    v1.w_a.coords * v1.a + v2.w_a.coords * v2.a + v3.w_a.coords * v3.a,
                );
                (p, p)
            }
            _ => unreachable!(),
        }
    }

    /// The length (two vertices) or signed doubled area (three vertices) of this simplex.
    pub fn metric(&self) -> Real {
        let [v1, v2, v3] = &self.vertices;

        match self.count {
            1 => 0.0,
            2 => (v2.w - v1.w).norm(),
            3 => (v2.w - v1.w).gcross(v3.w - v1.w),
            _ => unreachable!(),
        }
    }

    /// Reduces this simplex to the sub-simplex whose Voronoi region contains the origin,
    /// and computes the barycentric coordinates of the closest point.
    pub fn solve(&mut self) {
        match self.count {
            1 => {}
            2 => self.solve2(),
            3 => self.solve3(),
            _ => unreachable!(),
        }
    }

    // Closest point of the segment [w1, w2]: p = a1 * w1 + a2 * w2 with a1 + a2 = 1
    // and p orthogonal to w2 - w1, clamped to the endpoint regions.
    fn solve2(&mut self) {
        let w1 = self.vertices[0].w;
        let w2 = self.vertices[1].w;
        let e12 = w2 - w1;

        // w1 region
        let d12_2 = -w1.dot(&e12);
        if d12_2 <= 0.0 {
            self.vertices[0].a = 1.0;
            self.count = 1;
            return;
        }

        // w2 region
        let d12_1 = w2.dot(&e12);
        if d12_1 <= 0.0 {
            self.vertices[1].a = 1.0;
            self.count = 1;
            self.vertices[0] = self.vertices[1];
            return;
        }

        let inv_d12 = 1.0 / (d12_1 + d12_2);
        self.vertices[0].a = d12_1 * inv_d12;
        self.vertices[1].a = d12_2 * inv_d12;
        self.count = 2;
    }

    // Voronoi regions of the triangle [w1, w2, w3], tested vertices and edges first.
    fn solve3(&mut self) {
        let w1 = self.vertices[0].w;
        let w2 = self.vertices[1].w;
        let w3 = self.vertices[2].w;

        // Edge12
        let e12 = w2 - w1;
        let d12_1 = w2.dot(&e12);
        let d12_2 = -w1.dot(&e12);

        // Edge13
        let e13 = w3 - w1;
        let d13_1 = w3.dot(&e13);
        let d13_2 = -w1.dot(&e13);

        // Edge23
        let e23 = w3 - w2;
        let d23_1 = w3.dot(&e23);
        let d23_2 = -w2.dot(&e23);

        // Triangle123
        let n123 = e12.gcross(e13);

        let d123_1 = n123 * w2.gcross(w3);
        let d123_2 = n123 * w3.gcross(w1);
        let d123_3 = n123 * w1.gcross(w2);

        // w1 region
        if d12_2 <= 0.0 && d13_2 <= 0.0 {
            self.vertices[0].a = 1.0;
            self.count = 1;
            return;
        }

        // e12
        if d12_1 > 0.0 && d12_2 > 0.0 && d123_3 <= 0.0 {
            let inv_d12 = 1.0 / (d12_1 + d12_2);
            self.vertices[0].a = d12_1 * inv_d12;
            self.vertices[1].a = d12_2 * inv_d12;
            self.count = 2;
            return;
        }

        // e13
        if d13_1 > 0.0 && d13_2 > 0.0 && d123_2 <= 0.0 {
            let inv_d13 = 1.0 / (d13_1 + d13_2);
            self.vertices[0].a = d13_1 * inv_d13;
            self.vertices[2].a = d13_2 * inv_d13;
            self.count = 2;
            self.vertices[1] = self.vertices[2];
            return;
        }

        // w2 region
        if d12_1 <= 0.0 && d23_2 <= 0.0 {
            self.vertices[1].a = 1.0;
            self.count = 1;
            self.vertices[0] = self.vertices[1];
            return;
        }

        // w3 region
        if d13_1 <= 0.0 && d23_1 <= 0.0 {
            self.vertices[2].a = 1.0;
            self.count = 1;
            self.vertices[0] = self.vertices[2];
            return;
        }

        // e23
        if d23_1 > 0.0 && d23_2 > 0.0 && d123_1 <= 0.0 {
            let inv_d23 = 1.0 / (d23_1 + d23_2);
            self.vertices[1].a = d23_1 * inv_d23;
            self.vertices[2].a = d23_2 * inv_d23;
            self.count = 2;
            self.vertices[0] = self.vertices[2];
            return;
        }

        // Interior of the triangle.
        let inv_d123 = 1.0 / (d123_1 + d123_2 + d123_3);
        self.vertices[0].a = d123_1 * inv_d123;
        self.vertices[1].a = d123_2 * inv_d123;
        self.vertices[2].a = d123_3 * inv_d123;
        self.count = 3;
    }
}

#[cfg(test)]
mod test {
    use super::{Simplex, SimplexCache};
    use crate::math::{Isometry, Point, Vector};
    use crate::query::gjk::DistanceProxy;

    #[test]
    fn segment_region_barycentric_coordinates() {
        let a = [Point::origin()];
        let b = [Point::new(-1.0, 1.0), Point::new(1.0, 1.0)];
        let proxy_a = DistanceProxy::new(&a, 0.0);
        let proxy_b = DistanceProxy::new(&b, 0.0);
        let id = Isometry::identity();

        let cache = SimplexCache {
            metric: 2.0,
            count: 2,
            index_a: [0, 0, 0],
            index_b: [0, 1, 0],
        };

        let mut simplex = Simplex::new();
        simplex.read_cache(&cache, &proxy_a, &id, &proxy_b, &id);
        assert_eq!(simplex.count(), 2);
        simplex.solve();
        assert_eq!(simplex.count(), 2);
        assert_relative_eq!(simplex.vertices()[0].a, 0.5);
        assert_relative_eq!(simplex.closest_point(), Vector::new(0.0, 1.0));
        let (pa, pb) = simplex.witness_points();
        assert_relative_eq!(pa, Point::origin());
        assert_relative_eq!(pb, Point::new(0.0, 1.0));
    }

    #[test]
    fn stale_cache_is_flushed() {
        let a = [Point::origin()];
        let b = [Point::new(-1.0, 1.0), Point::new(1.0, 1.0)];
        let proxy_a = DistanceProxy::new(&a, 0.0);
        let proxy_b = DistanceProxy::new(&b, 0.0);
        let id = Isometry::identity();

        // The cached metric is more than twice the actual one.
        let cache = SimplexCache {
            metric: 5.0,
            count: 2,
            index_a: [0, 0, 0],
            index_b: [0, 1, 0],
        };

        let mut simplex = Simplex::new();
        simplex.read_cache(&cache, &proxy_a, &id, &proxy_b, &id);
        assert_eq!(simplex.count(), 1);
        assert_eq!(simplex.vertices()[0].index_b, 0);
    }
}
