//! Tunable constants and per-step parameters.

use crate::math::Real;

/// Indicates a configuration value outside of the range the algorithms can work with.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq)]
pub enum SettingsError {
    /// A length tolerance was zero, negative or NaN.
    #[error("the tolerance `{name}` must be strictly positive, found {value}.")]
    NonPositiveTolerance {
        /// The name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: Real,
    },
    /// An iteration cap was zero.
    #[error("the iteration cap `{0}` must be at least 1.")]
    ZeroIterationCap(&'static str),
    /// The displacement multiplier of fat AABBs was negative.
    #[error("the AABB displacement multiplier must not be negative, found {0}.")]
    NegativeAabbMultiplier(Real),
    /// A Baumgarte factor was outside of `[0, 1]`.
    #[error("the Baumgarte factor `{name}` must lie in [0, 1], found {value}.")]
    BaumgarteOutOfRange {
        /// The name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: Real,
    },
}

/// Global tuning constants shared by the broad-phase, the distance queries,
/// the time-of-impact solver and the contact solver.
///
/// The default values are tuned for objects measured in meters, with moving
/// objects between 0.1 and 10 meters wide.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Settings {
    /// Collision and constraint tolerance, in meters.
    pub linear_slop: Real,
    /// Angular collision and constraint tolerance, in radians.
    pub angular_slop: Real,
    /// Skin radius around polygons, keeping them slightly apart so that
    /// continuous collision does not have to deal with touching cores.
    pub polygon_radius: Real,
    /// Margin added around each broad-phase leaf AABB.
    pub aabb_extension: Real,
    /// Multiplier applied to a proxy's displacement when its fat AABB is extended
    /// along its motion.
    pub aabb_multiplier: Real,
    /// Maximum number of vertices of a convex polygon.
    pub max_polygon_vertices: usize,
    /// Maximum number of iterations of the GJK distance algorithm.
    pub max_distance_iterations: usize,
    /// Maximum number of iterations of the time-of-impact solver outer loop.
    pub max_toi_iterations: usize,
    /// Maximum number of contacts handled by the TOI sub-stepping of a single body.
    pub max_sub_steps: usize,
    /// Maximum linear position correction applied by one position-solver iteration.
    pub max_linear_correction: Real,
    /// Maximum angular position correction applied by one position-solver iteration.
    pub max_angular_correction: Real,
    /// Maximum translation of a body in one step.
    pub max_translation: Real,
    /// Maximum rotation of a body in one step.
    pub max_rotation: Real,
    /// Relative normal velocity below which collisions are treated as inelastic.
    pub velocity_threshold: Real,
    /// Fraction of the overlap resolved by each position-solver iteration.
    pub baumgarte: Real,
    /// Fraction of the overlap resolved during TOI sub-steps.
    pub toi_baumgarte: Real,
}

impl Default for Settings {
    fn default() -> Self {
        let linear_slop = 0.005;
        let pi = core::f64::consts::PI as Real;

        Self {
            linear_slop,
            angular_slop: 2.0 / 180.0 * pi,
            polygon_radius: 2.0 * linear_slop,
            aabb_extension: 0.1,
            aabb_multiplier: 2.0,
            max_polygon_vertices: 12,
            max_distance_iterations: 20,
            max_toi_iterations: 20,
            max_sub_steps: 8,
            max_linear_correction: 0.2,
            max_angular_correction: 8.0 / 180.0 * pi,
            max_translation: 2.0,
            max_rotation: 0.5 * pi,
            velocity_threshold: 1.0,
            baumgarte: 0.2,
            toi_baumgarte: 0.75,
        }
    }
}

impl Settings {
    /// The square of `max_translation`.
    #[inline]
    pub fn max_translation_squared(&self) -> Real {
        self.max_translation * self.max_translation
    }

    /// The square of `max_rotation`.
    #[inline]
    pub fn max_rotation_squared(&self) -> Real {
        self.max_rotation * self.max_rotation
    }

    /// Checks that every value lies in the range the algorithms rely on.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let tolerances = [
            ("linear_slop", self.linear_slop),
            ("angular_slop", self.angular_slop),
            ("polygon_radius", self.polygon_radius),
            ("aabb_extension", self.aabb_extension),
            ("max_linear_correction", self.max_linear_correction),
            ("max_angular_correction", self.max_angular_correction),
            ("max_translation", self.max_translation),
            ("max_rotation", self.max_rotation),
        ];

        for (name, value) in tolerances {
            // Negated comparison so that NaN is rejected too.
            if !(value > 0.0) {
                return Err(SettingsError::NonPositiveTolerance { name, value });
            }
        }

        let caps = [
            ("max_polygon_vertices", self.max_polygon_vertices),
            ("max_distance_iterations", self.max_distance_iterations),
            ("max_toi_iterations", self.max_toi_iterations),
            ("max_sub_steps", self.max_sub_steps),
        ];

        for (name, value) in caps {
            if value == 0 {
                return Err(SettingsError::ZeroIterationCap(name));
            }
        }

        if !(self.aabb_multiplier >= 0.0) {
            return Err(SettingsError::NegativeAabbMultiplier(self.aabb_multiplier));
        }

        for (name, value) in [
            ("baumgarte", self.baumgarte),
            ("toi_baumgarte", self.toi_baumgarte),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::BaumgarteOutOfRange { name, value });
            }
        }

        Ok(())
    }
}

/// Parameters of a single simulation step, as seen by the contact solver.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TimeStep {
    /// The time step length.
    pub dt: Real,
    /// The inverse time step (0 if `dt == 0`).
    pub inv_dt: Real,
    /// `dt * inv_dt0`: the ratio between this step and the previous one, used to
    /// rescale warm-starting impulses when the step length changes.
    pub dt_ratio: Real,
    /// Number of velocity iterations.
    pub velocity_iterations: usize,
    /// Number of position iterations.
    pub position_iterations: usize,
    /// Whether accumulated impulses from the previous step seed this step.
    pub warm_starting: bool,
    /// Whether two-point manifolds are solved with the 2x2 block solver.
    pub block_solve: bool,
}

impl Default for TimeStep {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl TimeStep {
    /// A time step of length `dt` with default iteration counts, warm starting and
    /// block solving enabled, and a `dt_ratio` of 1.
    pub fn new(dt: Real) -> Self {
        Self {
            dt,
            inv_dt: if dt > 0.0 { 1.0 / dt } else { 0.0 },
            dt_ratio: 1.0,
            velocity_iterations: 8,
            position_iterations: 3,
            warm_starting: true,
            block_solve: true,
        }
    }

    /// The step following `self`, with length `dt`.
    ///
    /// The `dt_ratio` of the result rescales impulses accumulated during `self`.
    pub fn next(&self, dt: Real) -> Self {
        let mut result = *self;
        result.dt = dt;
        result.inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };
        result.dt_ratio = self.inv_dt * dt;
        result
    }
}
