use crate::bounding_volume::Aabb;
use crate::math::{Isometry, Real};
use crate::query::gjk::DistanceProxy;
use crate::shape::{Ball, ConvexPolygon, Polyline, Segment};
use core::slice;

/// Enum representing the type of a shape.
///
/// Manifold generators are registered per pair of shape types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ShapeType {
    /// A ball shape.
    Ball = 0,
    /// A segment shape.
    Segment,
    /// A convex polygon shape.
    ConvexPolygon,
    /// A chain of segments.
    Polyline,
}

/// A shape attached to a fixture.
///
/// Every variant is convex, except `Polyline` which is a collection of convex
/// children (one per segment).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Shape {
    /// A ball.
    Ball(Ball),
    /// A line segment.
    Segment(Segment),
    /// A convex polygon.
    ConvexPolygon(ConvexPolygon),
    /// A chain of segments.
    Polyline(Polyline),
}

impl Shape {
    /// The type of this shape.
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Ball(_) => ShapeType::Ball,
            Shape::Segment(_) => ShapeType::Segment,
            Shape::ConvexPolygon(_) => ShapeType::ConvexPolygon,
            Shape::Polyline(_) => ShapeType::Polyline,
        }
    }

    /// The skin radius of this shape (the radius itself for balls).
    pub fn radius(&self) -> Real {
        match self {
            Shape::Ball(s) => s.radius,
            Shape::Segment(s) => s.radius,
            Shape::ConvexPolygon(s) => s.radius,
            Shape::Polyline(s) => s.radius,
        }
    }

    /// The number of convex children of this shape.
    pub fn child_count(&self) -> usize {
        match self {
            Shape::Polyline(s) => s.num_segments(),
            _ => 1,
        }
    }

    /// The distance proxy of the `child`-th convex child of this shape.
    pub fn distance_proxy(&self, child: usize) -> DistanceProxy<'_> {
        match self {
            Shape::Ball(s) => DistanceProxy::new(slice::from_ref(&s.center), s.radius),
            Shape::Segment(s) => DistanceProxy::new(s.vertices(), s.radius),
            Shape::ConvexPolygon(s) => DistanceProxy::new(s.points(), s.radius),
            Shape::Polyline(s) => DistanceProxy::new(s.segment_vertices(child), s.radius),
        }
    }

    /// The world-space AABB of the `child`-th convex child of this shape.
    pub fn compute_aabb(&self, pos: &Isometry<Real>, child: usize) -> Aabb {
        match self {
            Shape::Ball(s) => s.aabb(pos),
            Shape::Segment(s) => s.aabb(pos),
            Shape::ConvexPolygon(s) => s.aabb(pos),
            Shape::Polyline(s) => s.segment_aabb(pos, child),
        }
    }
}

impl From<Ball> for Shape {
    fn from(s: Ball) -> Self {
        Shape::Ball(s)
    }
}

impl From<Segment> for Shape {
    fn from(s: Segment) -> Self {
        Shape::Segment(s)
    }
}

impl From<ConvexPolygon> for Shape {
    fn from(s: ConvexPolygon) -> Self {
        Shape::ConvexPolygon(s)
    }
}

impl From<Polyline> for Shape {
    fn from(s: Polyline) -> Self {
        Shape::Polyline(s)
    }
}
