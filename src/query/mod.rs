//! Non-persistent geometric queries.
//!
//! * [`query::gjk::distance()`](gjk::distance) computes the closest points between two
//!   convex proxies, warm-started by a simplex cache.
//! * [`query::gjk::test_overlap()`](gjk::test_overlap) tests two shapes for overlap.
//! * [`query::time_of_impact()`] computes when two moving convex proxies first touch.
//!
//! Ray-casting of bounding volumes uses [`RayCastInput`] and [`RayCastOutput`].

pub use self::ray::{RayCastInput, RayCastOutput};
pub use self::stats::QueryStats;
pub use self::time_of_impact::{time_of_impact, ToiInput, ToiOutput, ToiState};

pub mod gjk;
mod ray;
mod stats;
pub mod time_of_impact;
