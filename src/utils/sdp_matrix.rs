use crate::math::Real;
use na::{Matrix2, Vector2};
use core::ops::{Add, Mul};

/// A 2x2 symmetric-definite-positive matrix.
///
/// This is the shape of the effective-mass matrix coupling the two normal
/// impulses of a two-point contact manifold.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SdpMatrix2 {
    /// The component at the first row and first column of this matrix.
    pub m11: Real,
    /// The component at the first row and second column of this matrix.
    pub m12: Real,
    /// The component at the second row and second column of this matrix.
    pub m22: Real,
}

impl SdpMatrix2 {
    /// A new SDP 2x2 matrix with the given components.
    ///
    /// Because the matrix is symmetric, only the lower off-diagonal component is required.
    pub fn new(m11: Real, m12: Real, m22: Real) -> Self {
        Self { m11, m12, m22 }
    }

    /// Create a new SDP matrix filled with zeros.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// The determinant of this matrix.
    pub fn determinant(&self) -> Real {
        self.m11 * self.m22 - self.m12 * self.m12
    }

    /// Compute the inverse of this SDP matrix without performing any inversibility check.
    pub fn inverse_unchecked(&self) -> Self {
        let determinant = self.determinant();
        let m11 = self.m22 / determinant;
        let m12 = -self.m12 / determinant;
        let m22 = self.m11 / determinant;

        Self { m11, m12, m22 }
    }

    /// Compute the inverse of this SDP matrix, or the zero matrix if it is singular.
    pub fn inverse_or_zero(&self) -> Self {
        let determinant = self.determinant();

        if determinant != 0.0 {
            self.inverse_unchecked()
        } else {
            Self::zero()
        }
    }

    /// Convert this SDP matrix to a regular matrix representation.
    pub fn into_matrix(self) -> Matrix2<Real> {
        Matrix2::new(self.m11, self.m12, self.m12, self.m22)
    }
}

impl Add<SdpMatrix2> for SdpMatrix2 {
    type Output = Self;

    fn add(self, rhs: SdpMatrix2) -> Self {
        Self::new(self.m11 + rhs.m11, self.m12 + rhs.m12, self.m22 + rhs.m22)
    }
}

impl Mul<Vector2<Real>> for SdpMatrix2 {
    type Output = Vector2<Real>;

    fn mul(self, rhs: Vector2<Real>) -> Self::Output {
        Vector2::new(
            self.m11 * rhs.x + self.m12 * rhs.y,
            self.m12 * rhs.x + self.m22 * rhs.y,
        )
    }
}

impl Mul<Real> for SdpMatrix2 {
    type Output = SdpMatrix2;

    fn mul(self, rhs: Real) -> Self::Output {
        SdpMatrix2::new(self.m11 * rhs, self.m12 * rhs, self.m22 * rhs)
    }
}
