//! Miscellaneous 2D vector operators.

use crate::math::Real;
use na::Vector2;

/// An orthonormal basis completing a unit vector.
pub(crate) trait WBasis: Sized {
    type Basis;
    fn orthonormal_basis(self) -> Self::Basis;
}

impl WBasis for Vector2<Real> {
    type Basis = [Vector2<Real>; 1];
    /// The tangent `(n.y, -n.x)`, i.e., the normal rotated clockwise.
    fn orthonormal_basis(self) -> [Vector2<Real>; 1] {
        [Vector2::new(self.y, -self.x)]
    }
}

/// Generalized cross product: scalar-valued for two 2D vectors, vector-valued
/// when an angular scalar crosses a vector.
pub(crate) trait WCross<Rhs>: Sized {
    type Result;
    fn gcross(&self, rhs: Rhs) -> Self::Result;
}

impl WCross<Vector2<Real>> for Vector2<Real> {
    type Result = Real;

    fn gcross(&self, rhs: Vector2<Real>) -> Self::Result {
        self.x * rhs.y - self.y * rhs.x
    }
}

impl WCross<Vector2<Real>> for Real {
    type Result = Vector2<Real>;

    fn gcross(&self, rhs: Vector2<Real>) -> Self::Result {
        Vector2::new(-rhs.y * *self, rhs.x * *self)
    }
}

#[cfg(test)]
mod test {
    use super::{WBasis, WCross};
    use crate::math::Real;
    use na::Vector2;

    #[test]
    fn cross_products() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(0.0, 1.0);
        assert_eq!(a.gcross(b), 1.0);
        assert_eq!(b.gcross(a), -1.0);
        assert_eq!((2.0 as Real).gcross(a), Vector2::new(0.0, 2.0));
        assert_eq!(b.orthonormal_basis()[0], Vector2::new(1.0, 0.0));
    }
}
