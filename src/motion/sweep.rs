use crate::math::{Isometry, Point, Real, Rotation, Vector};

/// The motion of a body over a time step, used by continuous collision detection.
///
/// The center of mass moves linearly from `c0` to `c`, and the angle varies linearly
/// from `a0` to `a`. `alpha0` is the fraction of the time step already consumed: the
/// sweep covers `[alpha0, 1]`, mapped to `beta` in `[0, 1]` by [`Sweep::transform_at`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Sweep {
    /// Local center of mass position.
    pub local_center: Point<Real>,
    /// World center of mass position at `alpha0`.
    pub c0: Point<Real>,
    /// World center of mass position at the end of the step.
    pub c: Point<Real>,
    /// World angle at `alpha0`.
    pub a0: Real,
    /// World angle at the end of the step.
    pub a: Real,
    /// Fraction of the current time step in the range `[0, 1]`.
    pub alpha0: Real,
}

impl Sweep {
    /// A sweep of a body that does not move, at the given position.
    pub fn from_isometry(pos: &Isometry<Real>, local_center: Point<Real>) -> Self {
        let c = pos * local_center;
        let a = pos.rotation.angle();

        Sweep {
            local_center,
            c0: c,
            c,
            a0: a,
            a,
            alpha0: 0.0,
        }
    }

    /// A sweep from `start` to `end`, both given as body transforms.
    pub fn new(start: &Isometry<Real>, end: &Isometry<Real>, local_center: Point<Real>) -> Self {
        let mut result = Self::from_isometry(start, local_center);
        result.c = end * local_center;
        result.a = result.a0 + start.rotation.angle_to(&end.rotation);
        result
    }

    /// The body transform at the normalized time `beta` in `[0, 1]`.
    pub fn transform_at(&self, beta: Real) -> Isometry<Real> {
        let c = self.c0.coords * (1.0 - beta) + self.c.coords * beta;
        let a = (1.0 - beta) * self.a0 + beta * self.a;
        let rot = Rotation::new(a);

        // Shift to origin.
        let translation = c - rot * self.local_center.coords;
        Isometry::from_parts(translation.into(), rot)
    }

    /// Advances the start of this sweep forward to `alpha`, keeping the end unchanged.
    pub fn advance(&mut self, alpha: Real) {
        assert!(self.alpha0 < 1.0);
        let beta = (alpha - self.alpha0) / (1.0 - self.alpha0);
        self.c0 += (self.c - self.c0) * beta;
        self.a0 += beta * (self.a - self.a0);
        self.alpha0 = alpha;
    }

    /// Wraps `a0` into `[-pi, pi)`, shifting `a` by the same amount.
    ///
    /// Large angles make the time-of-impact root finder fail.
    pub fn normalize(&mut self) {
        let pi = core::f64::consts::PI as Real;
        let two_pi = 2.0 * pi;

        let wrapped = (self.a0 + pi) % two_pi;
        let a0 = if wrapped < 0.0 {
            wrapped + pi
        } else {
            wrapped - pi
        };

        self.a -= self.a0 - a0;
        self.a0 = a0;
    }

    /// The linear displacement of the center of mass over the whole sweep.
    pub fn translation(&self) -> Vector<Real> {
        self.c - self.c0
    }
}

#[cfg(test)]
mod test {
    use super::Sweep;
    use crate::math::{Isometry, Point, Real, Vector};

    #[test]
    fn transform_interpolation() {
        let start = Isometry::new(Vector::new(0.0, 0.0), 0.0);
        let end = Isometry::new(Vector::new(2.0, 0.0), 1.0);
        let sweep = Sweep::new(&start, &end, Point::new(1.0, 0.0));

        assert_relative_eq!(sweep.transform_at(0.0), start, epsilon = 1.0e-5);
        assert_relative_eq!(sweep.transform_at(1.0), end, epsilon = 1.0e-5);

        let mid = sweep.transform_at(0.5);
        assert_relative_eq!(mid.rotation.angle(), 0.5, epsilon = 1.0e-5);
        // The center of mass moves linearly.
        let expected = na::center(&sweep.c0, &sweep.c);
        assert_relative_eq!(mid * Point::new(1.0, 0.0), expected, epsilon = 1.0e-5);
    }

    #[test]
    fn advance_keeps_the_end() {
        let start = Isometry::new(Vector::new(0.0, 0.0), 0.0);
        let end = Isometry::new(Vector::new(4.0, 0.0), 0.0);
        let mut sweep = Sweep::new(&start, &end, Point::origin());
        sweep.advance(0.5);

        assert_relative_eq!(sweep.c0, Point::new(2.0, 0.0));
        assert_relative_eq!(sweep.alpha0, 0.5);
        assert_relative_eq!(sweep.transform_at(1.0), end, epsilon = 1.0e-5);
    }

    #[test]
    fn normalize_wraps_start_angle() {
        let pi = core::f64::consts::PI as Real;
        let mut sweep = Sweep::from_isometry(&Isometry::identity(), Point::origin());
        sweep.a0 = 7.0;
        sweep.a = 7.5;
        sweep.normalize();

        assert_relative_eq!(sweep.a0, 7.0 - 2.0 * pi, epsilon = 1.0e-5);
        assert_relative_eq!(sweep.a - sweep.a0, 0.5, epsilon = 1.0e-5);

        sweep.a0 = -4.0;
        sweep.a = -4.0;
        sweep.normalize();
        assert_relative_eq!(sweep.a0, -4.0 + 2.0 * pi, epsilon = 1.0e-5);
        assert!(sweep.a0 >= -pi && sweep.a0 < pi);
    }
}
