use crate::query::gjk::DistanceOutput;
use crate::query::time_of_impact::ToiOutput;

/// Counters accumulated over many distance and time of impact queries.
///
/// Queries return their own iteration counts; a `QueryStats` is an optional sink the
/// caller feeds with those outputs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct QueryStats {
    /// Number of GJK distance queries.
    pub gjk_calls: usize,
    /// Total number of GJK iterations.
    pub gjk_iterations: usize,
    /// Largest number of GJK iterations of a single query.
    pub gjk_max_iterations: usize,
    /// Number of time of impact queries.
    pub toi_calls: usize,
    /// Total number of conservative advancement steps.
    pub toi_iterations: usize,
    /// Largest number of conservative advancement steps of a single query.
    pub toi_max_iterations: usize,
    /// Total number of root finder iterations.
    pub toi_root_iterations: usize,
    /// Largest number of root finder iterations of a single root search.
    pub toi_max_root_iterations: usize,
}

impl QueryStats {
    /// Records the counters of a distance query.
    pub fn record_distance(&mut self, output: &DistanceOutput) {
        self.gjk_calls += 1;
        self.gjk_iterations += output.iterations;
        self.gjk_max_iterations = self.gjk_max_iterations.max(output.iterations);
    }

    /// Records the counters of a time of impact query.
    pub fn record_toi(&mut self, output: &ToiOutput) {
        self.toi_calls += 1;
        self.toi_iterations += output.iterations;
        self.toi_max_iterations = self.toi_max_iterations.max(output.iterations);
        self.toi_root_iterations += output.root_iterations;
        self.toi_max_root_iterations = self
            .toi_max_root_iterations
            .max(output.max_root_iterations);
    }

    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
