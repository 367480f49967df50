#![allow(dead_code)]

use impact2d::contact::{
    ContactDispatcher, ContactFeatureType, ContactId, Manifold, ManifoldPoint, ManifoldType,
};
use impact2d::math::{Isometry, Real};
use impact2d::shape::{Shape, ShapeType};

/// Circle-circle manifold: one point, touching when the skins overlap.
pub fn collide_circles(
    manifold: &mut Manifold,
    shape_a: &Shape,
    xf_a: &Isometry<Real>,
    _child_a: usize,
    shape_b: &Shape,
    xf_b: &Isometry<Real>,
    _child_b: usize,
) {
    manifold.clear();

    let (Shape::Ball(circle_a), Shape::Ball(circle_b)) = (shape_a, shape_b) else {
        return;
    };

    let p_a = xf_a * circle_a.center;
    let p_b = xf_b * circle_b.center;
    let radius = circle_a.radius + circle_b.radius;

    if impact2d::na::distance_squared(&p_a, &p_b) > radius * radius {
        return;
    }

    manifold.manifold_type = ManifoldType::Circles;
    manifold.local_point = circle_a.center;
    manifold.points.push(ManifoldPoint::new(
        circle_b.center,
        ContactId::new(0, ContactFeatureType::Vertex, 0, ContactFeatureType::Vertex),
    ));
}

/// A dispatcher knowing only circles.
pub fn circle_dispatcher() -> ContactDispatcher {
    let mut dispatcher = ContactDispatcher::new();
    let _ = dispatcher.register(ShapeType::Ball, ShapeType::Ball, collide_circles);
    dispatcher
}

/// A generator that never produces points.
pub fn no_points(
    manifold: &mut Manifold,
    _: &Shape,
    _: &Isometry<Real>,
    _: usize,
    _: &Shape,
    _: &Isometry<Real>,
    _: usize,
) {
    manifold.clear();
}
