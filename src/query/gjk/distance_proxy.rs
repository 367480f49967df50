use crate::math::{Point, Real, Vector};
use crate::utils;

/// A convex point set with a skin radius, as seen by the GJK distance algorithm.
///
/// The vertices are borrowed from the shape they describe. The actual shape is the
/// convex hull of the vertices, inflated by `radius`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DistanceProxy<'a> {
    vertices: &'a [Point<Real>],
    /// The skin radius.
    pub radius: Real,
}

impl<'a> DistanceProxy<'a> {
    /// Creates a new distance proxy.
    ///
    /// Panics if `vertices` is empty.
    pub fn new(vertices: &'a [Point<Real>], radius: Real) -> Self {
        assert!(
            !vertices.is_empty(),
            "A distance proxy needs at least one vertex."
        );
        Self { vertices, radius }
    }

    /// The number of vertices of this proxy.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The vertex with the given index, in the local-space of the proxy.
    #[inline]
    pub fn vertex(&self, i: usize) -> Point<Real> {
        self.vertices[i]
    }

    /// All the vertices of this proxy.
    #[inline]
    pub fn vertices(&self) -> &'a [Point<Real>] {
        self.vertices
    }

    /// The index of the vertex furthest along the local direction `dir`.
    #[inline]
    pub fn support(&self, dir: &Vector<Real>) -> usize {
        utils::point_cloud_support_point_id(dir, self.vertices)
    }

    /// The vertex furthest along the local direction `dir`.
    #[inline]
    pub fn support_vertex(&self, dir: &Vector<Real>) -> Point<Real> {
        self.vertices[self.support(dir)]
    }
}
