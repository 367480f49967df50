use crate::math::{Isometry, Point, Real, Rotation, Translation, Vector};

/// The mass properties of a body, as seen by the contact solver.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SolverBody {
    /// The inverse mass. Zero for static and kinematic bodies.
    pub inv_mass: Real,
    /// The inverse rotational inertia about the center of mass.
    pub inv_inertia: Real,
    /// The center of mass, in the body frame.
    pub local_center: Point<Real>,
}

impl SolverBody {
    /// A body with the given inverse mass properties.
    pub fn new(inv_mass: Real, inv_inertia: Real, local_center: Point<Real>) -> Self {
        Self {
            inv_mass,
            inv_inertia,
            local_center,
        }
    }

    /// A body that never moves under contact impulses.
    pub fn fixed() -> Self {
        Self::new(0.0, 0.0, Point::origin())
    }

    /// Is this body unaffected by impulses?
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.inv_mass == 0.0 && self.inv_inertia == 0.0
    }
}

/// The solver copy of the position of a body.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BodyPosition {
    /// The world center of mass.
    pub c: Point<Real>,
    /// The world angle.
    pub a: Real,
}

impl BodyPosition {
    /// A new body position.
    pub fn new(c: Point<Real>, a: Real) -> Self {
        Self { c, a }
    }

    /// The body transform, for a body with the given local center of mass.
    #[inline]
    pub fn transform(&self, local_center: &Point<Real>) -> Isometry<Real> {
        let rotation = Rotation::new(self.a);
        let translation = self.c - rotation * local_center;
        Isometry::from_parts(Translation::from(translation), rotation)
    }
}

/// The solver copy of the velocity of a body.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BodyVelocity {
    /// The linear velocity of the center of mass.
    pub v: Vector<Real>,
    /// The angular velocity.
    pub w: Real,
}

impl BodyVelocity {
    /// A new body velocity.
    pub fn new(v: Vector<Real>, w: Real) -> Self {
        Self { v, w }
    }

    /// The velocity of the material point at `r` from the center of mass.
    #[inline]
    pub fn point_velocity(&self, r: &Vector<Real>) -> Vector<Real> {
        self.v + Vector::new(-self.w * r.y, self.w * r.x)
    }
}

#[cfg(test)]
mod test {
    use super::{BodyPosition, BodyVelocity};
    use crate::math::{Point, Real, Vector};

    #[test]
    fn transform_maps_local_center_to_c() {
        let local_center = Point::new(1.0, 0.0);
        let pos = BodyPosition::new(Point::new(3.0, 4.0), core::f64::consts::FRAC_PI_2 as Real);
        let xf = pos.transform(&local_center);
        assert_relative_eq!(xf * local_center, pos.c, epsilon = 1.0e-6);
        assert_relative_eq!(xf.translation.vector, Vector::new(3.0, 3.0), epsilon = 1.0e-6);
    }

    #[test]
    fn point_velocity() {
        let vel = BodyVelocity::new(Vector::new(1.0, 0.0), 2.0);
        assert_eq!(vel.point_velocity(&Vector::new(0.0, 1.0)), Vector::new(-1.0, 0.0));
    }
}
