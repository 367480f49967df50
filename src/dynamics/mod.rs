//! Contact constraint solving.

pub use self::contact_constraint::{ContactConstraint, VelocityConstraintPoint};
pub use self::contact_solver::ContactSolver;
pub use self::integration::integrate_positions;
pub use self::island::{position_solved, solve_island, solve_toi_positions, toi_position_solved};
pub use self::solver_body::{BodyPosition, BodyVelocity, SolverBody};

mod contact_constraint;
mod contact_solver;
mod integration;
mod island;
mod solver_body;
