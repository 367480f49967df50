use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Isometry, Point, Real};
use crate::shape::Segment;

/// A chain of segments.
///
/// Each segment is a child of the shape: child `i` joins vertex `i` and `i + 1`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    vertices: Vec<Point<Real>>,
    /// The skin radius of every segment.
    pub radius: Real,
}

impl Polyline {
    /// Creates a new polyline from its vertices.
    ///
    /// Panics if fewer than two vertices are given.
    pub fn new(vertices: Vec<Point<Real>>, radius: Real) -> Self {
        assert!(
            vertices.len() >= 2,
            "A polyline must have at least two vertices."
        );
        Polyline { vertices, radius }
    }

    /// The vertices of this polyline.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The number of segments of this polyline.
    #[inline]
    pub fn num_segments(&self) -> usize {
        self.vertices.len() - 1
    }

    /// The two vertices of the `i`-th segment, as a slice.
    #[inline]
    pub fn segment_vertices(&self, i: usize) -> &[Point<Real>] {
        &self.vertices[i..i + 2]
    }

    /// The `i`-th segment.
    #[inline]
    pub fn segment(&self, i: usize) -> Segment {
        Segment::new(self.vertices[i], self.vertices[i + 1], self.radius)
    }

    /// Computes the world-space AABB of the `i`-th segment.
    #[inline]
    pub fn segment_aabb(&self, pos: &Isometry<Real>, i: usize) -> Aabb {
        let pts = self.segment_vertices(i);
        Aabb::from_points(&[pos * pts[0], pos * pts[1]]).loosened(self.radius)
    }
}
