//! The GJK algorithm for distance computation between convex proxies.

pub use self::distance_proxy::DistanceProxy;
pub use self::gjk::{
    distance, distance_with_workspace, test_overlap, test_overlap_with_cache, DistanceInput,
    DistanceOutput, DistanceWorkspace,
};
pub use self::simplex::{Simplex, SimplexCache, SimplexVertex};

mod distance_proxy;
mod gjk;
mod simplex;
