use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Isometry, Point, Real};

/// A line segment, with a skin radius.
///
/// The radius is the polygon skin radius: it keeps segments and polygons
/// slightly apart so that continuous collision never has to deal with
/// touching cores.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Segment {
    vertices: [Point<Real>; 2],
    /// The skin radius of this segment.
    pub radius: Real,
}

impl Segment {
    /// Creates a new segment from two endpoints.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, radius: Real) -> Segment {
        Segment {
            vertices: [a, b],
            radius,
        }
    }

    /// The first endpoint.
    #[inline]
    pub fn a(&self) -> Point<Real> {
        self.vertices[0]
    }

    /// The second endpoint.
    #[inline]
    pub fn b(&self) -> Point<Real> {
        self.vertices[1]
    }

    /// Both endpoints.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// Computes the world-space AABB of this segment, including its skin.
    #[inline]
    pub fn aabb(&self, pos: &Isometry<Real>) -> Aabb {
        Aabb::from_points(&[pos * self.a(), pos * self.b()]).loosened(self.radius)
    }
}
