use crate::contact::{Contact, Manifold, ManifoldType, MAX_MANIFOLD_POINTS};
use crate::dynamics::{BodyPosition, BodyVelocity, SolverBody};
use crate::math::{Isometry, Point, Real, Vector, DEFAULT_EPSILON};
use crate::settings::{Settings, TimeStep};
use crate::utils::{SdpMatrix2, WBasis, WCross};
use arrayvec::ArrayVec;

/// Bound on the condition number of the block solver matrix.
const MAX_CONDITION_NUMBER: Real = 1000.0;

/// The velocity-phase state of one contact point.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct VelocityConstraintPoint {
    /// Anchor relative to the center of mass of body A.
    pub r_a: Vector<Real>,
    /// Anchor relative to the center of mass of body B.
    pub r_b: Vector<Real>,
    /// Accumulated normal impulse.
    pub normal_impulse: Real,
    /// Accumulated tangent impulse.
    pub tangent_impulse: Real,
    /// Effective mass along the normal.
    pub normal_mass: Real,
    /// Effective mass along the tangent.
    pub tangent_mass: Real,
    /// Target normal velocity, for restitution.
    pub velocity_bias: Real,
}

/// The solver state of a touching contact, for one step.
///
/// This is a snapshot of the contact manifold and of the mass properties of both bodies,
/// plus the velocity-phase data and the accumulated impulses.
#[derive(Clone, Debug)]
pub struct ContactConstraint {
    /// Index of body A in the solver arrays.
    pub body_a: usize,
    /// Index of body B in the solver arrays.
    pub body_b: usize,
    /// The velocity constraint points.
    pub points: ArrayVec<VelocityConstraintPoint, MAX_MANIFOLD_POINTS>,
    /// The number of points solved during the velocity phase. May be lower than the
    /// number of manifold points when two points are redundant.
    pub point_count: usize,
    /// The world normal, from A to B.
    pub normal: Vector<Real>,
    /// The block solver matrix.
    pub k: SdpMatrix2,
    /// The inverse of `k`.
    pub normal_mass: SdpMatrix2,
    friction: Real,
    restitution: Real,
    tangent_speed: Real,
    inv_mass_a: Real,
    inv_mass_b: Real,
    inv_inertia_a: Real,
    inv_inertia_b: Real,
    local_center_a: Point<Real>,
    local_center_b: Point<Real>,
    radius_a: Real,
    radius_b: Real,
    manifold: Manifold,
}

impl ContactConstraint {
    /// Snapshots a touching contact and the mass properties of its bodies.
    ///
    /// With warm starting, the stored impulses are scaled by `step.dt_ratio`. Otherwise
    /// they start at zero.
    pub fn init_constraint(contact: &Contact, bodies: &[SolverBody], step: &TimeStep) -> Self {
        let manifold = contact.manifold();
        assert!(
            manifold.point_count() > 0,
            "cannot build a constraint from an empty manifold"
        );

        let body_a = contact.fixture_a().body;
        let body_b = contact.fixture_b().body;
        let (radius_a, radius_b) = contact.radii();

        let points = manifold
            .points
            .iter()
            .map(|cp| {
                let (normal_impulse, tangent_impulse) = if step.warm_starting {
                    (
                        step.dt_ratio * cp.normal_impulse,
                        step.dt_ratio * cp.tangent_impulse,
                    )
                } else {
                    (0.0, 0.0)
                };

                VelocityConstraintPoint {
                    normal_impulse,
                    tangent_impulse,
                    ..Default::default()
                }
            })
            .collect();

        Self {
            body_a,
            body_b,
            points,
            point_count: manifold.point_count(),
            normal: Vector::zeros(),
            k: SdpMatrix2::zero(),
            normal_mass: SdpMatrix2::zero(),
            friction: contact.friction(),
            restitution: contact.restitution(),
            tangent_speed: contact.tangent_speed(),
            inv_mass_a: bodies[body_a].inv_mass,
            inv_mass_b: bodies[body_b].inv_mass,
            inv_inertia_a: bodies[body_a].inv_inertia,
            inv_inertia_b: bodies[body_b].inv_inertia,
            local_center_a: bodies[body_a].local_center,
            local_center_b: bodies[body_b].local_center,
            radius_a,
            radius_b,
            manifold: manifold.clone(),
        }
    }

    /// Computes the anchors, effective masses and restitution biases from the current
    /// positions and velocities, and prepares the block solver.
    pub fn init_velocity_constraint(
        &mut self,
        positions: &[BodyPosition],
        velocities: &[BodyVelocity],
        settings: &Settings,
        step: &TimeStep,
    ) {
        let (m_a, m_b) = (self.inv_mass_a, self.inv_mass_b);
        let (i_a, i_b) = (self.inv_inertia_a, self.inv_inertia_b);

        let c_a = positions[self.body_a].c;
        let c_b = positions[self.body_b].c;
        let vel_a = velocities[self.body_a];
        let vel_b = velocities[self.body_b];

        let xf_a = positions[self.body_a].transform(&self.local_center_a);
        let xf_b = positions[self.body_b].transform(&self.local_center_b);

        let world_manifold =
            self.manifold
                .world_manifold(&xf_a, self.radius_a, &xf_b, self.radius_b);

        self.normal = world_manifold.normal;
        let normal = self.normal;
        let tangent = normal.orthonormal_basis()[0];

        for (vcp, point) in self.points.iter_mut().zip(world_manifold.points.iter()) {
            vcp.r_a = point - c_a;
            vcp.r_b = point - c_b;

            let rn_a = vcp.r_a.gcross(normal);
            let rn_b = vcp.r_b.gcross(normal);
            let k_normal = m_a + m_b + i_a * rn_a * rn_a + i_b * rn_b * rn_b;
            vcp.normal_mass = if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 };

            let rt_a = vcp.r_a.gcross(tangent);
            let rt_b = vcp.r_b.gcross(tangent);
            let k_tangent = m_a + m_b + i_a * rt_a * rt_a + i_b * rt_b * rt_b;
            vcp.tangent_mass = if k_tangent > 0.0 {
                1.0 / k_tangent
            } else {
                0.0
            };

            // Setup a velocity bias for restitution.
            vcp.velocity_bias = 0.0;
            let v_rel = normal.dot(&(vel_b.point_velocity(&vcp.r_b) - vel_a.point_velocity(&vcp.r_a)));
            if v_rel < -settings.velocity_threshold {
                vcp.velocity_bias = -self.restitution * v_rel;
            }
        }

        // If we have two points, then prepare the block solver.
        if self.point_count == 2 && step.block_solve {
            let vcp1 = &self.points[0];
            let vcp2 = &self.points[1];

            let rn1_a = vcp1.r_a.gcross(normal);
            let rn1_b = vcp1.r_b.gcross(normal);
            let rn2_a = vcp2.r_a.gcross(normal);
            let rn2_b = vcp2.r_b.gcross(normal);

            let k11 = m_a + m_b + i_a * rn1_a * rn1_a + i_b * rn1_b * rn1_b;
            let k22 = m_a + m_b + i_a * rn2_a * rn2_a + i_b * rn2_b * rn2_b;
            let k12 = m_a + m_b + i_a * rn1_a * rn2_a + i_b * rn1_b * rn2_b;

            if k11 * k11 < MAX_CONDITION_NUMBER * (k11 * k22 - k12 * k12) {
                // K is safe to invert.
                self.k = SdpMatrix2::new(k11, k12, k22);
                self.normal_mass = self.k.inverse_or_zero();
            } else {
                // The constraints are redundant, just use one.
                log::trace!("redundant contact points, solving only the first one");
                self.point_count = 1;
            }
        }
    }

    /// Applies the accumulated impulses to the body velocities.
    pub fn warm_start_constraint(&self, velocities: &mut [BodyVelocity]) {
        let tangent = self.normal.orthonormal_basis()[0];
        let mut vel_a = velocities[self.body_a];
        let mut vel_b = velocities[self.body_b];

        for vcp in &self.points[..self.point_count] {
            let p = self.normal * vcp.normal_impulse + tangent * vcp.tangent_impulse;
            vel_a.w -= self.inv_inertia_a * vcp.r_a.gcross(p);
            vel_a.v -= p * self.inv_mass_a;
            vel_b.w += self.inv_inertia_b * vcp.r_b.gcross(p);
            vel_b.v += p * self.inv_mass_b;
        }

        velocities[self.body_a] = vel_a;
        velocities[self.body_b] = vel_b;
    }

    /// Runs one velocity iteration: friction first, then non-penetration.
    pub fn solve_velocity_constraint(&mut self, velocities: &mut [BodyVelocity], step: &TimeStep) {
        let (m_a, m_b) = (self.inv_mass_a, self.inv_mass_b);
        let (i_a, i_b) = (self.inv_inertia_a, self.inv_inertia_b);
        let normal = self.normal;
        let tangent = normal.orthonormal_basis()[0];

        let mut vel_a = velocities[self.body_a];
        let mut vel_b = velocities[self.body_b];

        debug_assert!(self.point_count == 1 || self.point_count == 2);

        // Non-penetration is more important than friction, so friction goes first.
        for vcp in &mut self.points[..self.point_count] {
            let dv = vel_b.point_velocity(&vcp.r_b) - vel_a.point_velocity(&vcp.r_a);

            let vt = dv.dot(&tangent) - self.tangent_speed;
            let lambda = -vt * vcp.tangent_mass;

            // Clamp the accumulated force.
            let max_friction = self.friction * vcp.normal_impulse;
            let new_impulse = (vcp.tangent_impulse + lambda).clamp(-max_friction, max_friction);
            let lambda = new_impulse - vcp.tangent_impulse;
            vcp.tangent_impulse = new_impulse;

            let p = tangent * lambda;
            vel_a.v -= p * m_a;
            vel_a.w -= i_a * vcp.r_a.gcross(p);
            vel_b.v += p * m_b;
            vel_b.w += i_b * vcp.r_b.gcross(p);
        }

        if self.point_count == 1 || !step.block_solve {
            for vcp in &mut self.points[..self.point_count] {
                let dv = vel_b.point_velocity(&vcp.r_b) - vel_a.point_velocity(&vcp.r_a);
                let vn = dv.dot(&normal);
                let lambda = -vcp.normal_mass * (vn - vcp.velocity_bias);

                // Clamp the accumulated impulse.
                let new_impulse = (vcp.normal_impulse + lambda).max(0.0);
                let lambda = new_impulse - vcp.normal_impulse;
                vcp.normal_impulse = new_impulse;

                let p = normal * lambda;
                vel_a.v -= p * m_a;
                vel_a.w -= i_a * vcp.r_a.gcross(p);
                vel_b.v += p * m_b;
                vel_b.w += i_b * vcp.r_b.gcross(p);
            }
        } else {
            self.solve_block(&mut vel_a, &mut vel_b);
        }

        velocities[self.body_a] = vel_a;
        velocities[self.body_b] = vel_b;
    }

    /// Solves the two normal constraints simultaneously, as a linear complementarity
    /// problem:
    ///
    /// `vn = K * x + b`, with `vn >= 0`, `x >= 0` and `vn_i * x_i = 0`.
    ///
    /// Working on the total impulse `x = a + d` with `a` the accumulated impulse, the
    /// problem becomes `vn = K * x + b'` with `b' = b - K * a`. The cases are tried in
    /// order: both constraints active, only the first, only the second, none. The first
    /// valid case is applied. If none is valid, no impulse is applied.
    fn solve_block(&mut self, vel_a: &mut BodyVelocity, vel_b: &mut BodyVelocity) {
        let normal = self.normal;
        let a = Vector::new(self.points[0].normal_impulse, self.points[1].normal_impulse);
        debug_assert!(a.x >= 0.0 && a.y >= 0.0);

        let vcp1 = self.points[0];
        let vcp2 = self.points[1];

        let vn1 = (vel_b.point_velocity(&vcp1.r_b) - vel_a.point_velocity(&vcp1.r_a)).dot(&normal);
        let vn2 = (vel_b.point_velocity(&vcp2.r_b) - vel_a.point_velocity(&vcp2.r_a)).dot(&normal);

        let b = Vector::new(vn1 - vcp1.velocity_bias, vn2 - vcp2.velocity_bias) - self.k * a;

        let x = if let Some(x) = self.block_case(&b, &vcp1, &vcp2) {
            x
        } else {
            log::trace!("no valid case for the block solver, skipping this iteration");
            return;
        };

        // Apply the incremental impulse.
        let d = x - a;
        let p1 = normal * d.x;
        let p2 = normal * d.y;
        vel_a.v -= (p1 + p2) * self.inv_mass_a;
        vel_a.w -= self.inv_inertia_a * (vcp1.r_a.gcross(p1) + vcp2.r_a.gcross(p2));
        vel_b.v += (p1 + p2) * self.inv_mass_b;
        vel_b.w += self.inv_inertia_b * (vcp1.r_b.gcross(p1) + vcp2.r_b.gcross(p2));

        // Accumulate.
        self.points[0].normal_impulse = x.x;
        self.points[1].normal_impulse = x.y;
    }

    fn block_case(
        &self,
        b: &Vector<Real>,
        vcp1: &VelocityConstraintPoint,
        vcp2: &VelocityConstraintPoint,
    ) -> Option<Vector<Real>> {
        // Case 1: vn = 0, so x = -inv(K) * b'.
        let x = -(self.normal_mass * *b);
        if x.x >= 0.0 && x.y >= 0.0 {
            return Some(x);
        }

        // Case 2: vn1 = 0 and x2 = 0.
        let x1 = -vcp1.normal_mass * b.x;
        let vn2 = self.k.m12 * x1 + b.y;
        if x1 >= 0.0 && vn2 >= 0.0 {
            return Some(Vector::new(x1, 0.0));
        }

        // Case 3: vn2 = 0 and x1 = 0.
        let x2 = -vcp2.normal_mass * b.y;
        let vn1 = self.k.m12 * x2 + b.x;
        if x2 >= 0.0 && vn1 >= 0.0 {
            return Some(Vector::new(0.0, x2));
        }

        // Case 4: x1 = 0 and x2 = 0.
        if b.x >= 0.0 && b.y >= 0.0 {
            return Some(Vector::zeros());
        }

        None
    }

    /// Copies the accumulated impulses back to the contact manifold, for warm starting
    /// the next step.
    pub fn store_constraint_impulses(&self, manifold: &mut Manifold) {
        for (vcp, mp) in self.points[..self.point_count]
            .iter()
            .zip(manifold.points.iter_mut())
        {
            mp.normal_impulse = vcp.normal_impulse;
            mp.tangent_impulse = vcp.tangent_impulse;
        }
    }

    /// Runs one position iteration, pushing the bodies apart with Baumgarte
    /// stabilization.
    ///
    /// Only positions are modified. Returns the minimum separation seen, which is at
    /// most zero.
    pub fn solve_position_constraint(
        &self,
        positions: &mut [BodyPosition],
        settings: &Settings,
    ) -> Real {
        self.solve_position(
            positions,
            settings,
            settings.baumgarte,
            (self.inv_mass_a, self.inv_inertia_a),
            (self.inv_mass_b, self.inv_inertia_b),
        )
    }

    /// Runs one position iteration of a time-of-impact sub-step.
    ///
    /// Only the two bodies `toi_body_a` and `toi_body_b` are moved, the others being
    /// treated as fixed. Returns the minimum separation seen.
    pub fn solve_position_constraint_toi(
        &self,
        positions: &mut [BodyPosition],
        settings: &Settings,
        toi_body_a: usize,
        toi_body_b: usize,
    ) -> Real {
        let is_toi_body = |body| body == toi_body_a || body == toi_body_b;

        let mass_a = if is_toi_body(self.body_a) {
            (self.inv_mass_a, self.inv_inertia_a)
        } else {
            (0.0, 0.0)
        };
        let mass_b = if is_toi_body(self.body_b) {
            (self.inv_mass_b, self.inv_inertia_b)
        } else {
            (0.0, 0.0)
        };

        self.solve_position(positions, settings, settings.toi_baumgarte, mass_a, mass_b)
    }

    fn solve_position(
        &self,
        positions: &mut [BodyPosition],
        settings: &Settings,
        baumgarte: Real,
        (m_a, i_a): (Real, Real),
        (m_b, i_b): (Real, Real),
    ) -> Real {
        let mut pos_a = positions[self.body_a];
        let mut pos_b = positions[self.body_b];
        let mut min_separation: Real = 0.0;

        for j in 0..self.manifold.point_count() {
            let xf_a = pos_a.transform(&self.local_center_a);
            let xf_b = pos_b.transform(&self.local_center_b);

            let (normal, point, separation) = self.position_manifold(j, &xf_a, &xf_b);

            let r_a = point - pos_a.c;
            let r_b = point - pos_b.c;

            // Track max constraint error.
            min_separation = min_separation.min(separation);

            // Prevent large corrections and allow slop.
            let c = (baumgarte * (separation + settings.linear_slop))
                .clamp(-settings.max_linear_correction, 0.0);

            // Compute the effective mass.
            let rn_a = r_a.gcross(normal);
            let rn_b = r_b.gcross(normal);
            let k = m_a + m_b + i_a * rn_a * rn_a + i_b * rn_b * rn_b;

            // Compute normal impulse.
            let impulse = if k > 0.0 { -c / k } else { 0.0 };
            let p = normal * impulse;

            pos_a.c -= p * m_a;
            pos_a.a -= i_a * r_a.gcross(p);
            pos_b.c += p * m_b;
            pos_b.a += i_b * r_b.gcross(p);
        }

        positions[self.body_a] = pos_a;
        positions[self.body_b] = pos_b;

        min_separation
    }

    /// The world normal (from A to B), contact point and separation of the `j`-th point.
    fn position_manifold(
        &self,
        j: usize,
        xf_a: &Isometry<Real>,
        xf_b: &Isometry<Real>,
    ) -> (Vector<Real>, Point<Real>, Real) {
        let manifold = &self.manifold;
        let radii = self.radius_a + self.radius_b;

        match manifold.manifold_type {
            ManifoldType::Circles => {
                let point_a = xf_a * manifold.local_point;
                let point_b = xf_b * manifold.points[0].local_point;
                let normal = (point_b - point_a)
                    .try_normalize(DEFAULT_EPSILON)
                    .unwrap_or_else(Vector::zeros);
                let point = na::center(&point_a, &point_b);
                let separation = (point_b - point_a).dot(&normal) - radii;
                (normal, point, separation)
            }
            ManifoldType::FaceA => {
                let normal = xf_a.rotation * manifold.local_normal;
                let plane_point = xf_a * manifold.local_point;
                let clip_point = xf_b * manifold.points[j].local_point;
                let separation = (clip_point - plane_point).dot(&normal) - radii;
                (normal, clip_point, separation)
            }
            ManifoldType::FaceB => {
                let normal = xf_b.rotation * manifold.local_normal;
                let plane_point = xf_b * manifold.local_point;
                let clip_point = xf_a * manifold.points[j].local_point;
                let separation = (clip_point - plane_point).dot(&normal) - radii;

                // Ensure the normal points from A to B.
                (-normal, clip_point, separation)
            }
        }
    }
}
