//! Broad-phase: pair management on top of the dynamic tree.

pub use self::broad_phase::BroadPhase;

mod broad_phase;
