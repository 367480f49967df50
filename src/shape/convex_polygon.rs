use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Isometry, Point, Real, UnitVector, Vector, DEFAULT_EPSILON};
use crate::utils::{self, WCross};
use na::ComplexField;

/// A 2D convex polygon with a skin radius.
///
/// Vertices are stored in counter-clockwise order, and the normal `i` is the
/// outward normal of the edge joining vertex `i` to vertex `i + 1`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexPolygon {
    points: Vec<Point<Real>>,
    normals: Vec<UnitVector<Real>>,
    /// The skin radius of this polygon.
    pub radius: Real,
}

impl ConvexPolygon {
    /// Creates a new 2D convex polygon from an arbitrary set of points.
    ///
    /// This explicitly computes the convex hull of the given set of points, using
    /// gift wrapping, after welding points closer than `weld_distance`.
    /// Returns `None` if the hull is degenerate (less than three non-collinear points).
    pub fn from_convex_hull(
        points: &[Point<Real>],
        weld_distance: Real,
        radius: Real,
    ) -> Option<Self> {
        let weld_sq = weld_distance * weld_distance;
        let mut unique: Vec<Point<Real>> = Vec::with_capacity(points.len());

        for pt in points {
            if unique
                .iter()
                .all(|other| na::distance_squared(pt, other) >= weld_sq)
            {
                unique.push(*pt);
            }
        }

        if unique.len() < 3 {
            return None;
        }

        // Start from the right-most point, lowest one on ties.
        let mut i0 = 0;
        for (i, pt) in unique.iter().enumerate().skip(1) {
            let best = unique[i0];
            if pt.x > best.x || (pt.x == best.x && pt.y < best.y) {
                i0 = i;
            }
        }

        let mut hull = Vec::with_capacity(unique.len());
        let mut ih = i0;

        loop {
            hull.push(ih);

            let mut ie = 0;
            for j in 1..unique.len() {
                if ie == ih {
                    ie = j;
                    continue;
                }

                let r = unique[ie] - unique[ih];
                let v = unique[j] - unique[ih];
                let c = r.gcross(v);

                // Keep the most clockwise point, the farthest one if collinear.
                if c < 0.0 || (c == 0.0 && v.norm_squared() > r.norm_squared()) {
                    ie = j;
                }
            }

            ih = ie;

            if ie == i0 || hull.len() > unique.len() {
                break;
            }
        }

        let vertices = hull.into_iter().map(|i| unique[i]).collect();
        Self::from_convex_polyline(vertices, radius)
    }

    /// Creates a new 2D convex polygon from a set of points assumed to describe a
    /// counter-clockwise convex polyline.
    ///
    /// Convexity of the input polyline is not checked. Vertices between collinear
    /// edges are removed. Returns `None` if all points form an almost flat line.
    pub fn from_convex_polyline(mut points: Vec<Point<Real>>, radius: Real) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }

        let eps = ComplexField::sqrt(DEFAULT_EPSILON);
        let mut normals = Vec::with_capacity(points.len());

        for i1 in 0..points.len() {
            let i2 = (i1 + 1) % points.len();
            let edge = points[i2] - points[i1];
            normals.push(UnitVector::try_new(
                Vector::new(edge.y, -edge.x),
                DEFAULT_EPSILON,
            )?);
        }

        let mut nremoved = 0;
        // See if the first vertex must be removed.
        if normals[0].dot(&*normals[normals.len() - 1]) > 1.0 - eps {
            nremoved = 1;
        }

        // Remove vertices joining collinear edges.
        for i2 in 1..points.len() {
            let i1 = i2 - 1;
            if normals[i1].dot(&*normals[i2]) > 1.0 - eps {
                nremoved += 1;
            } else {
                points[i2 - nremoved] = points[i2];
                normals[i2 - nremoved] = normals[i2];
            }
        }

        let new_length = points.len() - nremoved;
        points.truncate(new_length);
        normals.truncate(new_length);

        if points.len() >= 3 {
            Some(ConvexPolygon {
                points,
                normals,
                radius,
            })
        } else {
            None
        }
    }

    /// Creates an axis-aligned box centered at the body origin.
    pub fn cuboid(half_extents: Vector<Real>, radius: Real) -> Self {
        let (hx, hy) = (half_extents.x, half_extents.y);
        let points = vec![
            Point::new(-hx, -hy),
            Point::new(hx, -hy),
            Point::new(hx, hy),
            Point::new(-hx, hy),
        ];
        let normals = vec![
            -Vector::y_axis(),
            Vector::x_axis(),
            Vector::y_axis(),
            -Vector::x_axis(),
        ];

        ConvexPolygon {
            points,
            normals,
            radius,
        }
    }

    /// The vertices of this convex polygon.
    #[inline]
    pub fn points(&self) -> &[Point<Real>] {
        &self.points
    }

    /// The normals of the edges of this convex polygon.
    #[inline]
    pub fn normals(&self) -> &[UnitVector<Real>] {
        &self.normals
    }

    /// The index of the vertex furthest along `dir`.
    #[inline]
    pub fn support_point_id(&self, dir: &Vector<Real>) -> usize {
        utils::point_cloud_support_point_id(dir, &self.points)
    }

    /// Computes the world-space AABB of this polygon, including its skin.
    pub fn aabb(&self, pos: &Isometry<Real>) -> Aabb {
        Aabb::from_points(&self.points.iter().map(|p| pos * p).collect::<Vec<_>>())
            .loosened(self.radius)
    }
}

#[cfg(test)]
mod test {
    use super::ConvexPolygon;
    use crate::math::{Point, Vector};

    #[test]
    fn hull_drops_interior_and_collinear_points() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0001),
        ];
        let poly = ConvexPolygon::from_convex_hull(&points, 0.005, 0.0).unwrap();
        assert_eq!(poly.points().len(), 4);

        for (pt, n) in poly.points().iter().zip(poly.normals()) {
            // Every vertex lies behind every edge plane.
            for (q, m) in poly.points().iter().zip(poly.normals()) {
                assert!((pt - q).dot(&**m) <= 1.0e-5);
            }
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1.0e-5);
        }
    }

    #[test]
    fn degenerate_hull_is_rejected() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        assert!(ConvexPolygon::from_convex_hull(&points, 0.005, 0.0).is_none());
    }

    #[test]
    fn cuboid_support() {
        let poly = ConvexPolygon::cuboid(Vector::new(1.0, 2.0), 0.01);
        assert_eq!(poly.support_point_id(&Vector::new(1.0, 1.0)), 2);
        assert_eq!(poly.support_point_id(&Vector::new(-1.0, -1.0)), 0);
    }
}
