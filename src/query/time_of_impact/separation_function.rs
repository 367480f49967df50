use crate::math::{Point, Real, Vector};
use crate::motion::Sweep;
use crate::query::gjk::{DistanceProxy, SimplexCache};
use crate::utils::WBasis;

/// The kind of feature pair a [`SeparationFunction`] measures the separation of.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeparationKind {
    /// Vertex of the first proxy against vertex of the second proxy.
    Points,
    /// Edge of the first proxy against vertex of the second proxy.
    FaceA,
    /// Edge of the second proxy against vertex of the first proxy.
    FaceB,
}

/// Separation of two swept proxies along an axis derived from a GJK simplex.
///
/// The axis is built once, at the start of a conservative advancement step, and the
/// separation can then be re-evaluated at any time of the sweep.
#[derive(Clone, Debug)]
pub struct SeparationFunction<'a> {
    proxy_a: DistanceProxy<'a>,
    proxy_b: DistanceProxy<'a>,
    sweep_a: Sweep,
    sweep_b: Sweep,
    kind: SeparationKind,
    /// Midpoint of the reference edge, in the local-space of its proxy.
    local_point: Point<Real>,
    /// The separating axis: world-space for `Points`, local-space of the
    /// reference proxy otherwise.
    axis: Vector<Real>,
    /// Support index on the first proxy, set by `find_min_separation`.
    pub index_a: usize,
    /// Support index on the second proxy, set by `find_min_separation`.
    pub index_b: usize,
}

impl<'a> SeparationFunction<'a> {
    /// Builds the separation function from the simplex cache of a distance query
    /// performed at time `t1`.
    ///
    /// Returns the function and the separation at `t1`.
    pub fn new(
        cache: &SimplexCache,
        proxy_a: DistanceProxy<'a>,
        sweep_a: &Sweep,
        proxy_b: DistanceProxy<'a>,
        sweep_b: &Sweep,
        t1: Real,
    ) -> (Self, Real) {
        let count = cache.count;
        assert!(0 < count && count < 3);

        let pos_a = sweep_a.transform_at(t1);
        let pos_b = sweep_b.transform_at(t1);

        let mut result = SeparationFunction {
            proxy_a,
            proxy_b,
            sweep_a: *sweep_a,
            sweep_b: *sweep_b,
            kind: SeparationKind::Points,
            local_point: Point::origin(),
            axis: Vector::zeros(),
            index_a: 0,
            index_b: 0,
        };

        if count == 1 {
            let point_a = pos_a * proxy_a.vertex(cache.index_a[0]);
            let point_b = pos_b * proxy_b.vertex(cache.index_b[0]);
            result.axis = point_b - point_a;
            let s = result.axis.normalize_mut();
            (result, s)
        } else if cache.index_a[0] == cache.index_a[1] {
            // Two points on B and one on A.
            result.kind = SeparationKind::FaceB;
            let local_point_b1 = proxy_b.vertex(cache.index_b[0]);
            let local_point_b2 = proxy_b.vertex(cache.index_b[1]);

            result.axis = (local_point_b2 - local_point_b1)
                .orthonormal_basis()[0]
                .normalize();
            let normal = pos_b.rotation * result.axis;

            result.local_point = na::center(&local_point_b1, &local_point_b2);
            let point_b = pos_b * result.local_point;
            let point_a = pos_a * proxy_a.vertex(cache.index_a[0]);

            let mut s = (point_a - point_b).dot(&normal);
            if s < 0.0 {
                result.axis = -result.axis;
                s = -s;
            }
            (result, s)
        } else {
            // Two points on A and one or two points on B.
            result.kind = SeparationKind::FaceA;
            let local_point_a1 = proxy_a.vertex(cache.index_a[0]);
            let local_point_a2 = proxy_a.vertex(cache.index_a[1]);

            result.axis = (local_point_a2 - local_point_a1)
                .orthonormal_basis()[0]
                .normalize();
            let normal = pos_a.rotation * result.axis;

            result.local_point = na::center(&local_point_a1, &local_point_a2);
            let point_a = pos_a * result.local_point;
            let point_b = pos_b * proxy_b.vertex(cache.index_b[0]);

            let mut s = (point_b - point_a).dot(&normal);
            if s < 0.0 {
                result.axis = -result.axis;
                s = -s;
            }
            (result, s)
        }
    }

    /// The kind of feature pair this function tracks.
    pub fn kind(&self) -> SeparationKind {
        self.kind
    }

    /// Finds the deepest points at time `t`, stores their indices, and returns their
    /// separation along the axis.
    pub fn find_min_separation(&mut self, t: Real) -> Real {
        let pos_a = self.sweep_a.transform_at(t);
        let pos_b = self.sweep_b.transform_at(t);

        match self.kind {
            SeparationKind::Points => {
                let axis_a = pos_a.rotation.inverse_transform_vector(&self.axis);
                let axis_b = pos_b.rotation.inverse_transform_vector(&-self.axis);

                self.index_a = self.proxy_a.support(&axis_a);
                self.index_b = self.proxy_b.support(&axis_b);
            }
            SeparationKind::FaceA => {
                let normal = pos_a.rotation * self.axis;
                let axis_b = pos_b.rotation.inverse_transform_vector(&-normal);
                self.index_b = self.proxy_b.support(&axis_b);
            }
            SeparationKind::FaceB => {
                let normal = pos_b.rotation * self.axis;
                let axis_a = pos_a.rotation.inverse_transform_vector(&-normal);
                self.index_a = self.proxy_a.support(&axis_a);
            }
        }

        self.evaluate(t)
    }

    /// The separation, at time `t`, of the points found by the last call to
    /// `find_min_separation`.
    pub fn evaluate(&self, t: Real) -> Real {
        let pos_a = self.sweep_a.transform_at(t);
        let pos_b = self.sweep_b.transform_at(t);

        match self.kind {
            SeparationKind::Points => {
                let point_a = pos_a * self.proxy_a.vertex(self.index_a);
                let point_b = pos_b * self.proxy_b.vertex(self.index_b);
                (point_b - point_a).dot(&self.axis)
            }
            SeparationKind::FaceA => {
                let normal = pos_a.rotation * self.axis;
                let point_a = pos_a * self.local_point;
                let point_b = pos_b * self.proxy_b.vertex(self.index_b);
                (point_b - point_a).dot(&normal)
            }
            SeparationKind::FaceB => {
                let normal = pos_b.rotation * self.axis;
                let point_b = pos_b * self.local_point;
                let point_a = pos_a * self.proxy_a.vertex(self.index_a);
                (point_a - point_b).dot(&normal)
            }
        }
    }
}
