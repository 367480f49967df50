use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Point, Real, Vector};

/// A disk, defined by its local center and its radius.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Ball {
    /// The center of the ball, in the local-space of its body.
    pub center: Point<Real>,
    /// The radius of the ball.
    pub radius: Real,
}

impl Ball {
    /// Creates a new ball with the given radius, centered at the body origin.
    #[inline]
    pub fn new(radius: Real) -> Ball {
        Self::with_center(Point::origin(), radius)
    }

    /// Creates a new ball with the given local center and radius.
    #[inline]
    pub fn with_center(center: Point<Real>, radius: Real) -> Ball {
        assert!(radius >= 0.0, "The ball radius must not be negative.");
        Ball { center, radius }
    }

    /// Computes the world-space AABB of this ball.
    #[inline]
    pub fn aabb(&self, pos: &Isometry<Real>) -> Aabb {
        let center = pos * self.center;
        Aabb::from_half_extents(center, Vector::repeat(self.radius))
    }
}
