//! Time of impact of two moving convex proxies, by conservative advancement.

pub use self::separation_function::{SeparationFunction, SeparationKind};
pub use self::time_of_impact::{
    time_of_impact, time_of_impact_with_workspace, ToiInput, ToiOutput, ToiState,
};

mod separation_function;
mod time_of_impact;
