/*!
impact2d
========

**impact2d** is the collision-and-constraint core of a 2-dimensional rigid-body
physics engine written with the rust programming language.

It provides a dynamic AABB tree broad-phase, a warm-started GJK distance query,
a conservative-advancement time-of-impact solver, and a sequential-impulse
contact solver with block solving and Baumgarte position correction.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)] // Maybe revisit this one later.
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![deny(unused_qualifications)]

#[cfg(all(feature = "f32", feature = "f64"))]
std::compile_error!("The `f32` and `f64` features are mutually exclusive.");

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[cfg(test)]
#[macro_use]
extern crate approx;

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod broad_phase;
pub mod contact;
pub mod dynamics;
pub mod motion;
pub mod partitioning;
pub mod query;
pub mod settings;
pub mod shape;
pub mod utils;

pub use settings::{Settings, SettingsError, TimeStep};

mod real {
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub use f64 as Real;

    /// The scalar type used throughout this crate.
    #[cfg(feature = "f32")]
    pub use f32 as Real;
}

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use super::real::*;
    pub use na::{Isometry2, Matrix2, Point2, Translation2, UnitComplex, UnitVector2, Vector2};

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The dimension of the space.
    pub const DIM: usize = 2;

    /// The point type.
    pub use Point2 as Point;

    /// The vector type.
    pub use Vector2 as Vector;

    /// The unit vector type.
    pub use UnitVector2 as UnitVector;

    /// The matrix type.
    pub use Matrix2 as Matrix;

    /// The transformation matrix type.
    pub use Isometry2 as Isometry;

    /// The rotation type.
    pub type Rotation<N> = UnitComplex<N>;

    /// The translation type.
    pub use Translation2 as Translation;

    /// A 2D symmetric-definite-positive matrix.
    pub use crate::utils::SdpMatrix2 as SdpMatrix;
}
