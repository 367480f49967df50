//! Axis Aligned Bounding Box.

use crate::bounding_volume::BoundingVolume;
use crate::math::{Isometry, Point, Real, Vector, DIM};
use crate::query::{RayCastInput, RayCastOutput};
use na;

/// An Axis-Aligned Bounding Box (AABB).
///
/// Defined by its minimum and maximum corners. A valid AABB satisfies
/// `mins <= maxs` componentwise; the only exception is [`Aabb::new_invalid`]
/// which is meant to be merged with valid boxes.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// The point with minimum coordinates (bottom-left corner).
    pub mins: Point<Real>,
    /// The point with maximum coordinates (top-right corner).
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB.
    ///
    /// # Arguments:
    ///   * `mins` - position of the point with the smallest coordinates.
    ///   * `maxs` - position of the point with the highest coordinates. Each component of `mins`
    ///     must be smaller than the related components of `maxs`.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with `mins` components set to `Real::max_values` and `maxs`
    /// components set to `-Real::max_values`.
    ///
    /// This is often used as the initial values of some AABB merging algorithms.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::MAX).into(),
            Vector::repeat(-Real::MAX).into(),
        )
    }

    /// Creates a new AABB from its center and its half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Creates a new AABB from a set of points.
    pub fn from_points<'a, I>(pts: I) -> Self
    where
        I: IntoIterator<Item = &'a Point<Real>>,
    {
        let mut result = Aabb::new_invalid();

        for pt in pts {
            result.take_point(*pt);
        }

        result
    }

    /// Is every component of `mins` smaller than or equal to the same component of `maxs`?
    ///
    /// Also rejects NaN bounds.
    #[inline]
    pub fn is_valid(&self) -> bool {
        let d = self.maxs - self.mins;
        d.x >= 0.0
            && d.y >= 0.0
            && self.mins.coords.iter().all(|e| e.is_finite())
            && self.maxs.coords.iter().all(|e| e.is_finite())
    }

    /// The center of this AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The half extents of this AABB.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        (self.maxs - self.mins) * 0.5
    }

    /// The extents of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// The half perimeter of this AABB.
    ///
    /// This is the cost metric minimized by the dynamic tree.
    pub fn half_perimeter(&self) -> Real {
        let extents = self.extents();
        extents.x + extents.y
    }

    /// The perimeter of this AABB.
    pub fn perimeter(&self) -> Real {
        2.0 * self.half_perimeter()
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// Computes the AABB bounding `self` transformed by `m`.
    #[inline]
    pub fn transform_by(&self, m: &Isometry<Real>) -> Self {
        let ls_center = self.center();
        let center = m * ls_center;
        let ws_half_extents = m.rotation.to_rotation_matrix().matrix().abs() * self.half_extents();

        Aabb::new(center + (-ws_half_extents), center + ws_half_extents)
    }

    /// Computes the AABB bounding `self` translated by `translation`.
    #[inline]
    pub fn translated(mut self, translation: &Vector<Real>) -> Self {
        self.mins += translation;
        self.maxs += translation;
        self
    }

    /// Extends this AABB along `displacement`: the side facing the motion is pushed by
    /// the displacement, the opposite side stays put.
    #[inline]
    pub fn extended_along(mut self, displacement: &Vector<Real>) -> Self {
        for i in 0..DIM {
            if displacement[i] < 0.0 {
                self.mins[i] += displacement[i];
            } else {
                self.maxs[i] += displacement[i];
            }
        }

        self
    }

    /// Does this AABB contain the given point?
    #[inline]
    pub fn contains_local_point(&self, point: &Point<Real>) -> bool {
        (0..DIM).all(|i| point[i] >= self.mins[i] && point[i] <= self.maxs[i])
    }

    /// Casts the segment `input.p1 -> input.p2` against this AABB.
    ///
    /// Returns the hit fraction along the segment, in `[0, input.max_fraction]`, and the
    /// outward normal of the slab that was hit. A segment starting inside of the box
    /// returns `None`.
    pub fn ray_cast(&self, input: &RayCastInput) -> Option<RayCastOutput> {
        let mut tmin = -Real::MAX;
        let mut tmax = Real::MAX;

        let p = input.p1;
        let d = input.p2 - input.p1;
        let abs_d = d.abs();

        let mut normal = Vector::zeros();

        for i in 0..DIM {
            if abs_d[i] < Real::EPSILON {
                // Parallel.
                if p[i] < self.mins[i] || self.maxs[i] < p[i] {
                    return None;
                }
            } else {
                let inv_d = 1.0 / d[i];
                let mut t1 = (self.mins[i] - p[i]) * inv_d;
                let mut t2 = (self.maxs[i] - p[i]) * inv_d;

                // Sign of the normal vector.
                let mut s = -1.0;

                if t1 > t2 {
                    core::mem::swap(&mut t1, &mut t2);
                    s = 1.0;
                }

                if t1 > tmin {
                    normal = Vector::zeros();
                    normal[i] = s;
                    tmin = t1;
                }

                tmax = tmax.min(t2);

                if tmin > tmax {
                    return None;
                }
            }
        }

        if tmin < 0.0 || input.max_fraction < tmin {
            return None;
        }

        Some(RayCastOutput {
            normal,
            fraction: tmin,
        })
    }
}

impl BoundingVolume for Aabb {
    #[inline]
    fn center(&self) -> Point<Real> {
        self.center()
    }

    #[inline]
    fn intersects(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.maxs) && na::partial_ge(&self.maxs, &other.mins)
    }

    #[inline]
    fn contains(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.mins) && na::partial_ge(&self.maxs, &other.maxs)
    }

    #[inline]
    fn merge(&mut self, other: &Aabb) {
        self.mins = self.mins.inf(&other.mins);
        self.maxs = self.maxs.sup(&other.maxs);
    }

    #[inline]
    fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    #[inline]
    fn loosen(&mut self, amount: Real) {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        self.mins += Vector::repeat(-amount);
        self.maxs += Vector::repeat(amount);
    }

    #[inline]
    fn loosened(&self, amount: Real) -> Aabb {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        Aabb {
            mins: self.mins + Vector::repeat(-amount),
            maxs: self.maxs + Vector::repeat(amount),
        }
    }
}
