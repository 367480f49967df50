//! Traits and structure needed to cast rays.

use crate::math::{Point, Real, Vector};

/// A segment `p1 -> p2` to cast, truncated at `p1 + max_fraction * (p2 - p1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RayCastInput {
    /// Starting point of the ray.
    pub p1: Point<Real>,
    /// The point reached at fraction 1.
    pub p2: Point<Real>,
    /// The largest fraction of `p2 - p1` the ray travels.
    pub max_fraction: Real,
}

impl RayCastInput {
    /// Creates a new ray-cast input.
    pub fn new(p1: Point<Real>, p2: Point<Real>, max_fraction: Real) -> Self {
        RayCastInput {
            p1,
            p2,
            max_fraction,
        }
    }

    /// The direction of the ray, not normalized.
    #[inline]
    pub fn dir(&self) -> Vector<Real> {
        self.p2 - self.p1
    }

    /// The point at the given fraction of the ray.
    #[inline]
    pub fn point_at(&self, fraction: Real) -> Point<Real> {
        self.p1 + self.dir() * fraction
    }

    /// The end point of the ray, at `max_fraction`.
    #[inline]
    pub fn end_point(&self) -> Point<Real> {
        self.point_at(self.max_fraction)
    }
}

/// The hit of a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RayCastOutput {
    /// The normal of the hit surface.
    pub normal: Vector<Real>,
    /// The hit point is `p1 + fraction * (p2 - p1)`.
    pub fraction: Real,
}
