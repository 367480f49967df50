//! Shapes supported by impact2d.

pub use self::ball::Ball;
pub use self::convex_polygon::ConvexPolygon;
pub use self::polyline::Polyline;
pub use self::segment::Segment;
pub use self::shape::{Shape, ShapeType};

mod ball;
mod convex_polygon;
mod polyline;
mod segment;
mod shape;
