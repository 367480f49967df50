//! Various unsorted geometrical and logical operators.

pub use self::point_cloud_support_point::{
    point_cloud_support_point, point_cloud_support_point_id,
};
pub use self::sdp_matrix::SdpMatrix2;
pub use self::sorted_pair::SortedPair;
pub(crate) use self::wops::{WBasis, WCross};

mod point_cloud_support_point;
mod sdp_matrix;
mod sorted_pair;
mod wops;
