use crate::contact::{ContactGraph, ContactHandle};
use crate::dynamics::{integrate_positions, BodyPosition, BodyVelocity, ContactSolver, SolverBody};
use crate::math::Real;
use crate::settings::{Settings, TimeStep};

/// Whether a position iteration reached an acceptable overlap.
///
/// The solver does not push the separation above `-linear_slop`, so a few slops of
/// overlap are tolerated.
#[inline]
pub fn position_solved(min_separation: Real, settings: &Settings) -> bool {
    min_separation >= -3.0 * settings.linear_slop
}

/// Same as [`position_solved`] for time-of-impact sub-steps, which are held to a
/// tighter tolerance.
#[inline]
pub fn toi_position_solved(min_separation: Real, settings: &Settings) -> bool {
    min_separation >= -1.5 * settings.linear_slop
}

/// Solves the contacts of an island of bodies over one step.
///
/// Runs the whole contact pipeline: velocity constraint initialization, warm starting,
/// `step.velocity_iterations` velocity iterations, impulse storage, position
/// integration, then up to `step.position_iterations` position iterations. The body
/// velocities must already include external forces.
///
/// Returns `true` if the position solver converged.
pub fn solve_island(
    step: &TimeStep,
    settings: &Settings,
    graph: &mut ContactGraph,
    contacts: &[ContactHandle],
    bodies: &[SolverBody],
    positions: &mut [BodyPosition],
    velocities: &mut [BodyVelocity],
) -> bool {
    let mut solver = ContactSolver::new(step, graph, contacts, bodies);
    solver.initialize_velocity_constraints(positions, velocities, settings);

    if step.warm_starting {
        solver.warm_start(velocities);
    }

    for _ in 0..step.velocity_iterations {
        solver.solve_velocity_constraints(velocities);
    }

    solver.store_impulses(graph);

    integrate_positions(step, settings, positions, velocities);

    for _ in 0..step.position_iterations {
        let min_separation = solver.solve_position_constraints(positions, settings);
        if position_solved(min_separation, settings) {
            return true;
        }
    }

    false
}

/// Resolves the overlap of a time-of-impact sub-step, moving only the bodies
/// `toi_body_a` and `toi_body_b`.
///
/// Runs up to `step.position_iterations` iterations and returns `true` if the position
/// solver converged.
#[allow(clippy::too_many_arguments)]
pub fn solve_toi_positions(
    step: &TimeStep,
    settings: &Settings,
    graph: &ContactGraph,
    contacts: &[ContactHandle],
    bodies: &[SolverBody],
    positions: &mut [BodyPosition],
    toi_body_a: usize,
    toi_body_b: usize,
) -> bool {
    let solver = ContactSolver::new(step, graph, contacts, bodies);

    for _ in 0..step.position_iterations {
        let min_separation =
            solver.solve_toi_position_constraints(positions, settings, toi_body_a, toi_body_b);
        if toi_position_solved(min_separation, settings) {
            return true;
        }
    }

    false
}
