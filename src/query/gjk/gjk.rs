//! The Gilbert-Johnson-Keerthi distance algorithm, warm-started from a simplex cache.

use core::cell::RefCell;

use crate::math::{Isometry, Point, Real, DEFAULT_EPSILON};
use crate::query::gjk::{DistanceProxy, Simplex, SimplexCache, SimplexVertex};
use crate::settings::Settings;
use crate::shape::Shape;

/// Input of the GJK distance algorithm.
#[derive(Copy, Clone, Debug)]
pub struct DistanceInput<'a> {
    /// The first proxy.
    pub proxy_a: DistanceProxy<'a>,
    /// The second proxy.
    pub proxy_b: DistanceProxy<'a>,
    /// The world-space transform of the first proxy.
    pub transform_a: Isometry<Real>,
    /// The world-space transform of the second proxy.
    pub transform_b: Isometry<Real>,
    /// Whether the skin radii of the proxies are taken into account.
    pub use_radii: bool,
}

/// Output of the GJK distance algorithm.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceOutput {
    /// Closest point on the first proxy, in world-space.
    pub point_a: Point<Real>,
    /// Closest point on the second proxy, in world-space.
    pub point_b: Point<Real>,
    /// The distance between both proxies, never negative.
    pub distance: Real,
    /// Number of support points computed.
    pub iterations: usize,
}

/// Scratch memory of the GJK distance algorithm.
///
/// A workspace must not be shared by nested distance computations.
#[derive(Clone, Debug, Default)]
pub struct DistanceWorkspace {
    simplex: Simplex,
}

impl DistanceWorkspace {
    /// Creates a new workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// The simplex of the last distance computation run with this workspace.
    pub fn simplex(&self) -> &Simplex {
        &self.simplex
    }
}

std::thread_local! {
    static WORKSPACE: RefCell<DistanceWorkspace> = RefCell::new(DistanceWorkspace::new());
}

/// Computes the closest points between two convex proxies.
///
/// Uses a thread-local workspace. A reentrant call (e.g. from a callback invoked while
/// another distance computation holds the workspace) is reported with `log::error!` and
/// served from a temporary workspace.
///
/// `cache` is read to warm-start the algorithm, and updated with the final simplex.
pub fn distance(
    input: &DistanceInput,
    cache: &mut SimplexCache,
    settings: &Settings,
) -> DistanceOutput {
    WORKSPACE.with(|workspace| match workspace.try_borrow_mut() {
        Ok(mut workspace) => distance_with_workspace(input, cache, &mut workspace, settings),
        Err(_) => {
            log::error!("reentrant GJK distance computation, using a temporary workspace");
            distance_with_workspace(input, cache, &mut DistanceWorkspace::new(), settings)
        }
    })
}

/// Computes the closest points between two convex proxies, using the given workspace.
pub fn distance_with_workspace(
    input: &DistanceInput,
    cache: &mut SimplexCache,
    workspace: &mut DistanceWorkspace,
    settings: &Settings,
) -> DistanceOutput {
    let proxy_a = &input.proxy_a;
    let proxy_b = &input.proxy_b;
    let pos_a = &input.transform_a;
    let pos_b = &input.transform_b;

    let simplex = &mut workspace.simplex;
    simplex.read_cache(cache, proxy_a, pos_a, proxy_b, pos_b);

    // Vertex indices of the previous simplex, for duplicate support point detection.
    let mut save_a = [0; 3];
    let mut save_b = [0; 3];

    let mut iter = 0;
    while iter < settings.max_distance_iterations {
        let save_count = simplex.count;
        for i in 0..save_count {
            save_a[i] = simplex.vertices[i].index_a;
            save_b[i] = simplex.vertices[i].index_b;
        }

        simplex.solve();

        // The origin is inside of the triangle: the proxies overlap.
        if simplex.count == 3 {
            break;
        }

        let d = simplex.search_direction();

        // The origin lies on the simplex boundary.
        if d.norm_squared() < DEFAULT_EPSILON * DEFAULT_EPSILON {
            break;
        }

        let index_a = proxy_a.support(&pos_a.rotation.inverse_transform_vector(&-d));
        let index_b = proxy_b.support(&pos_b.rotation.inverse_transform_vector(&d));
        let vertex = SimplexVertex::new(proxy_a, pos_a, index_a, proxy_b, pos_b, index_b);
        iter += 1;

        // A repeated support point means no progress can be made.
        let duplicate = (0..save_count).any(|i| index_a == save_a[i] && index_b == save_b[i]);

        if duplicate {
            break;
        }

        simplex.vertices[simplex.count] = vertex;
        simplex.count += 1;
    }

    let (mut point_a, mut point_b) = simplex.witness_points();
    let mut distance = na::distance(&point_a, &point_b);
    simplex.write_cache(cache);

    if input.use_radii {
        let r_a = proxy_a.radius;
        let r_b = proxy_b.radius;

        if distance > r_a + r_b && distance > DEFAULT_EPSILON {
            // Separated skins: move the witness points onto them.
            distance -= r_a + r_b;
            let normal = (point_b - point_a).normalize();
            point_a += normal * r_a;
            point_b -= normal * r_b;
        } else {
            let mid = na::center(&point_a, &point_b);
            point_a = mid;
            point_b = mid;
            distance = 0.0;
        }
    }

    DistanceOutput {
        point_a,
        point_b,
        distance,
        iterations: iter,
    }
}

/// Tests if the `child_a`-th child of `shape_a` overlaps the `child_b`-th child of
/// `shape_b`, skin radii included.
pub fn test_overlap(
    shape_a: &Shape,
    child_a: usize,
    shape_b: &Shape,
    child_b: usize,
    pos_a: &Isometry<Real>,
    pos_b: &Isometry<Real>,
    settings: &Settings,
) -> bool {
    let mut cache = SimplexCache::default();
    test_overlap_with_cache(
        shape_a, child_a, shape_b, child_b, pos_a, pos_b, &mut cache, settings,
    )
}

/// Same as [`test_overlap`], warm-started by `cache`, which is updated with the final
/// simplex.
pub fn test_overlap_with_cache(
    shape_a: &Shape,
    child_a: usize,
    shape_b: &Shape,
    child_b: usize,
    pos_a: &Isometry<Real>,
    pos_b: &Isometry<Real>,
    cache: &mut SimplexCache,
    settings: &Settings,
) -> bool {
    let input = DistanceInput {
        proxy_a: shape_a.distance_proxy(child_a),
        proxy_b: shape_b.distance_proxy(child_b),
        transform_a: *pos_a,
        transform_b: *pos_b,
        use_radii: true,
    };

    let output = distance(&input, cache, settings);
    output.distance < 10.0 * DEFAULT_EPSILON
}

#[cfg(test)]
mod test {
    use super::{
        distance, distance_with_workspace, test_overlap, test_overlap_with_cache, DistanceInput,
        DistanceWorkspace,
    };
    use crate::math::{Isometry, Point, Real, Vector};
    use crate::query::gjk::SimplexCache;
    use crate::settings::Settings;
    use crate::shape::{Ball, ConvexPolygon, Shape};

    #[test]
    fn box_box_distance() {
        let settings = Settings::default();
        let square = Shape::from(ConvexPolygon::cuboid(Vector::new(1.0, 1.0), 0.0));
        let input = DistanceInput {
            proxy_a: square.distance_proxy(0),
            proxy_b: square.distance_proxy(0),
            transform_a: Isometry::identity(),
            transform_b: Isometry::new(Vector::new(3.0, 0.5), 0.0),
            use_radii: false,
        };

        let mut cache = SimplexCache::default();
        let mut workspace = DistanceWorkspace::new();
        let out = distance_with_workspace(&input, &mut cache, &mut workspace, &settings);
        assert_relative_eq!(out.distance, 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(out.point_a.x, 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(out.point_b.x, 2.0, epsilon = 1.0e-5);
        assert!(out.point_a.y >= -0.5 - 1.0e-5 && out.point_a.y <= 1.0 + 1.0e-5);
        assert!(cache.count >= 1);
    }

    #[test]
    fn rotated_box_distance() {
        let settings = Settings::default();
        let square = Shape::from(ConvexPolygon::cuboid(Vector::new(1.0, 1.0), 0.0));
        let angle = core::f64::consts::FRAC_PI_4 as Real;
        let input = DistanceInput {
            proxy_a: square.distance_proxy(0),
            proxy_b: square.distance_proxy(0),
            transform_a: Isometry::identity(),
            transform_b: Isometry::new(Vector::new(4.0, 0.0), angle),
            use_radii: false,
        };

        let mut cache = SimplexCache::default();
        let out = distance(&input, &mut cache, &settings);
        // The corner of the rotated box points toward the first box.
        let expected = 4.0 - 1.0 - (2.0 as Real).sqrt();
        assert_relative_eq!(out.distance, expected, epsilon = 1.0e-5);
        assert_relative_eq!(
            out.point_b,
            Point::new(4.0 - (2.0 as Real).sqrt(), 0.0),
            epsilon = 1.0e-5
        );
    }

    #[test]
    fn overlapping_balls() {
        let settings = Settings::default();
        let a = Shape::from(Ball::new(1.0));
        let b = Shape::from(Ball::new(1.0));
        let pos_a = Isometry::identity();

        let near = Isometry::translation(1.9, 0.0);
        let far = Isometry::translation(2.1, 0.0);

        assert!(test_overlap(&a, 0, &b, 0, &pos_a, &near, &settings));
        assert!(!test_overlap(&a, 0, &b, 0, &pos_a, &far, &settings));
    }

    #[test]
    fn overlap_test_warm_starts_from_the_cache() {
        let settings = Settings::default();
        let a = Shape::from(ConvexPolygon::cuboid(Vector::new(1.0, 1.0), 0.0));
        let b = Shape::from(Ball::new(0.5));
        let pos_a = Isometry::identity();
        let pos_b = Isometry::translation(3.0, 0.2);

        let mut cache = SimplexCache::default();
        assert!(!test_overlap_with_cache(
            &a, 0, &b, 0, &pos_a, &pos_b, &mut cache, &settings
        ));
        assert!(cache.count >= 1);

        // Same answer with the warm cache, and the cache is kept up to date.
        let near = Isometry::translation(1.4, 0.2);
        assert!(test_overlap_with_cache(
            &a, 0, &b, 0, &pos_a, &near, &mut cache, &settings
        ));
        assert!(!test_overlap_with_cache(
            &a, 0, &b, 0, &pos_a, &pos_b, &mut cache, &settings
        ));
    }
}
