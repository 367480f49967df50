//! Ray-casting related definitions.

pub use self::ray::{RayCastInput, RayCastOutput};

mod ray;
