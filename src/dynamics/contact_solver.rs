use crate::contact::{ContactGraph, ContactHandle};
use crate::dynamics::{BodyPosition, BodyVelocity, ContactConstraint, SolverBody};
use crate::math::Real;
use crate::settings::{Settings, TimeStep};

/// Sequential impulse solver for a set of contacts.
///
/// The solver snapshots every enabled, touching, non-sensor contact it is given when
/// built. Bodies are referred to by the indices stored in the contact fixtures, which
/// index the `bodies`, `positions` and `velocities` slices.
#[derive(Clone, Debug)]
pub struct ContactSolver {
    step: TimeStep,
    constraints: Vec<ContactConstraint>,
    handles: Vec<ContactHandle>,
}

impl ContactSolver {
    /// Initializes the position-phase state of the contacts named by `handles`.
    pub fn new(
        step: &TimeStep,
        graph: &ContactGraph,
        handles: &[ContactHandle],
        bodies: &[SolverBody],
    ) -> Self {
        let mut constraints = Vec::with_capacity(handles.len());
        let mut solved_handles = Vec::with_capacity(handles.len());

        for handle in handles {
            let contact = match graph.get(*handle) {
                Some(contact) => contact,
                None => continue,
            };

            if !contact.is_enabled()
                || !contact.is_touching()
                || contact.manifold().point_count() == 0
                || contact.fixture_a().is_sensor
                || contact.fixture_b().is_sensor
            {
                continue;
            }

            constraints.push(ContactConstraint::init_constraint(contact, bodies, step));
            solved_handles.push(*handle);
        }

        Self {
            step: *step,
            constraints,
            handles: solved_handles,
        }
    }

    /// The constraints being solved.
    #[inline]
    pub fn constraints(&self) -> &[ContactConstraint] {
        &self.constraints
    }

    /// The contacts being solved, in the same order as [`ContactSolver::constraints`].
    #[inline]
    pub fn handles(&self) -> &[ContactHandle] {
        &self.handles
    }

    /// Prepares the velocity phase from the current positions and velocities.
    pub fn initialize_velocity_constraints(
        &mut self,
        positions: &[BodyPosition],
        velocities: &[BodyVelocity],
        settings: &Settings,
    ) {
        for constraint in &mut self.constraints {
            constraint.init_velocity_constraint(positions, velocities, settings, &self.step);
        }
    }

    /// Applies the accumulated impulses of the previous step.
    pub fn warm_start(&self, velocities: &mut [BodyVelocity]) {
        for constraint in &self.constraints {
            constraint.warm_start_constraint(velocities);
        }
    }

    /// Runs one velocity iteration over all the constraints.
    pub fn solve_velocity_constraints(&mut self, velocities: &mut [BodyVelocity]) {
        for constraint in &mut self.constraints {
            constraint.solve_velocity_constraint(velocities, &self.step);
        }
    }

    /// Copies the accumulated impulses back to the contact manifolds.
    pub fn store_impulses(&self, graph: &mut ContactGraph) {
        for (constraint, handle) in self.constraints.iter().zip(&self.handles) {
            if let Some(contact) = graph.get_mut(*handle) {
                constraint.store_constraint_impulses(contact.manifold_mut());
            }
        }
    }

    /// Runs one position iteration over all the constraints.
    ///
    /// Returns the minimum separation seen, which is at most zero.
    pub fn solve_position_constraints(
        &self,
        positions: &mut [BodyPosition],
        settings: &Settings,
    ) -> Real {
        self.constraints
            .iter()
            .map(|constraint| constraint.solve_position_constraint(positions, settings))
            .fold(0.0, Real::min)
    }

    /// Runs one position iteration of a time-of-impact sub-step, where only the bodies
    /// `toi_body_a` and `toi_body_b` move.
    ///
    /// Returns the minimum separation seen, which is at most zero.
    pub fn solve_toi_position_constraints(
        &self,
        positions: &mut [BodyPosition],
        settings: &Settings,
        toi_body_a: usize,
        toi_body_b: usize,
    ) -> Real {
        self.constraints
            .iter()
            .map(|constraint| {
                constraint.solve_position_constraint_toi(positions, settings, toi_body_a, toi_body_b)
            })
            .fold(0.0, Real::min)
    }
}
