//! Rigid body motions over a time step.

pub use self::sweep::Sweep;

mod sweep;
