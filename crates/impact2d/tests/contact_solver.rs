use approx::assert_relative_eq;
use impact2d::contact::{
    Contact, ContactDispatcher, ContactFeatureType, ContactFixture, ContactGraph, ContactHandle,
    ContactId, ManifoldPoint, ManifoldType, TouchTransition,
};
use impact2d::dynamics::{
    position_solved, solve_island, solve_toi_positions, toi_position_solved, BodyPosition,
    BodyVelocity, ContactConstraint, ContactSolver, SolverBody,
};
use impact2d::math::{Point, Real, Vector};
use impact2d::shape::{Ball, ConvexPolygon, Segment, Shape, ShapeType};
use impact2d::utils::SdpMatrix2;
use impact2d::{Settings, TimeStep};

mod common;

struct TwoBalls {
    graph: ContactGraph,
    handle: ContactHandle,
    bodies: Vec<SolverBody>,
    positions: Vec<BodyPosition>,
    velocities: Vec<BodyVelocity>,
}

/// Two unit-diameter balls centered at `(-x, 0)` and `(x, 0)`.
fn two_balls(
    x: Real,
    inv_masses: [Real; 2],
    friction: Real,
    restitution: Real,
    settings: &Settings,
) -> TwoBalls {
    let ball = Shape::from(Ball::new(0.5));
    let dispatcher = common::circle_dispatcher();

    let bodies: Vec<_> = inv_masses
        .iter()
        .map(|inv_mass| SolverBody::new(*inv_mass, 8.0 * inv_mass, Point::origin()))
        .collect();
    let positions = vec![
        BodyPosition::new(Point::new(-x, 0.0), 0.0),
        BodyPosition::new(Point::new(x, 0.0), 0.0),
    ];

    let mut contact = Contact::new(
        &dispatcher,
        ContactFixture::new(0, 0, 0, friction, restitution),
        &ball,
        ContactFixture::new(1, 1, 0, friction, restitution),
        &ball,
    )
    .unwrap();

    let xf_a = positions[0].transform(&Point::origin());
    let xf_b = positions[1].transform(&Point::origin());
    assert_eq!(
        contact.update(&ball, &xf_a, &ball, &xf_b, settings),
        TouchTransition::Began
    );

    let mut graph = ContactGraph::new();
    let handle = graph.insert(contact);

    TwoBalls {
        graph,
        handle,
        bodies,
        positions,
        velocities: vec![BodyVelocity::default(); 2],
    }
}

fn separation(positions: &[BodyPosition]) -> Real {
    (positions[1].c - positions[0].c).norm() - 1.0
}

#[test]
fn elastic_head_on_collision_exchanges_velocities() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.49, [1.0, 1.0], 0.0, 1.0, &settings);
    world.velocities[0].v = Vector::new(5.0, 0.0);
    world.velocities[1].v = Vector::new(-5.0, 0.0);

    let mut solver = ContactSolver::new(&step, &world.graph, &[world.handle], &world.bodies);
    assert_eq!(solver.constraints().len(), 1);

    solver.initialize_velocity_constraints(&world.positions, &world.velocities, &settings);
    solver.warm_start(&mut world.velocities);
    for _ in 0..step.velocity_iterations {
        solver.solve_velocity_constraints(&mut world.velocities);
    }

    assert_relative_eq!(world.velocities[0].v, Vector::new(-5.0, 0.0), epsilon = 1.0e-4);
    assert_relative_eq!(world.velocities[1].v, Vector::new(5.0, 0.0), epsilon = 1.0e-4);
    assert_relative_eq!(world.velocities[0].w, 0.0, epsilon = 1.0e-4);

    solver.store_impulses(&mut world.graph);
    let contact = world.graph.get(world.handle).unwrap();
    assert_relative_eq!(contact.manifold().points[0].normal_impulse, 10.0, epsilon = 1.0e-3);
}

#[test]
fn slow_collisions_are_inelastic() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.49, [1.0, 1.0], 0.0, 1.0, &settings);
    // Closing speed below the velocity threshold.
    world.velocities[0].v = Vector::new(0.4, 0.0);
    world.velocities[1].v = Vector::new(-0.4, 0.0);

    let mut solver = ContactSolver::new(&step, &world.graph, &[world.handle], &world.bodies);
    solver.initialize_velocity_constraints(&world.positions, &world.velocities, &settings);
    for _ in 0..step.velocity_iterations {
        solver.solve_velocity_constraints(&mut world.velocities);
    }

    assert_relative_eq!(world.velocities[0].v, Vector::zeros(), epsilon = 1.0e-5);
    assert_relative_eq!(world.velocities[1].v, Vector::zeros(), epsilon = 1.0e-5);
}

#[test]
fn linear_momentum_is_conserved() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.49, [1.0, 0.5], 0.4, 0.3, &settings);
    world.velocities[0] = BodyVelocity::new(Vector::new(3.0, 1.0), 0.5);
    world.velocities[1] = BodyVelocity::new(Vector::new(-2.0, -1.5), -1.0);

    let momentum = |velocities: &[BodyVelocity]| {
        velocities[0].v / world.bodies[0].inv_mass + velocities[1].v / world.bodies[1].inv_mass
    };
    let before = momentum(&world.velocities);

    let mut solver = ContactSolver::new(&step, &world.graph, &[world.handle], &world.bodies);
    solver.initialize_velocity_constraints(&world.positions, &world.velocities, &settings);
    for _ in 0..step.velocity_iterations {
        solver.solve_velocity_constraints(&mut world.velocities);
    }

    assert_relative_eq!(momentum(&world.velocities), before, epsilon = 1.0e-4);

    // The balls no longer approach each other.
    let normal = Vector::x();
    let closing = (world.velocities[1].v - world.velocities[0].v).dot(&normal);
    assert!(closing >= -1.0e-4);
}

#[test]
fn warm_start_impulses_are_rescaled() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.49, [1.0, 1.0], 0.0, 1.0, &settings);
    world.graph.get_mut(world.handle).unwrap().manifold_mut().points[0].normal_impulse = 4.0;

    let solver = ContactSolver::new(&step, &world.graph, &[world.handle], &world.bodies);
    assert_relative_eq!(solver.constraints()[0].points[0].normal_impulse, 4.0);

    let next = step.next(step.dt * 0.5);
    let solver = ContactSolver::new(&next, &world.graph, &[world.handle], &world.bodies);
    assert_relative_eq!(solver.constraints()[0].points[0].normal_impulse, 2.0);

    let mut cold = step;
    cold.warm_starting = false;
    let solver = ContactSolver::new(&cold, &world.graph, &[world.handle], &world.bodies);
    assert_eq!(solver.constraints()[0].points[0].normal_impulse, 0.0);
}

#[test]
fn warm_starting_applies_stored_impulses() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.49, [1.0, 1.0], 0.0, 0.0, &settings);
    world.graph.get_mut(world.handle).unwrap().manifold_mut().points[0].normal_impulse = 1.0;

    let mut solver = ContactSolver::new(&step, &world.graph, &[world.handle], &world.bodies);
    solver.initialize_velocity_constraints(&world.positions, &world.velocities, &settings);
    solver.warm_start(&mut world.velocities);

    assert_relative_eq!(world.velocities[0].v, Vector::new(-1.0, 0.0), epsilon = 1.0e-6);
    assert_relative_eq!(world.velocities[1].v, Vector::new(1.0, 0.0), epsilon = 1.0e-6);
}

#[test]
fn position_solver_leaves_resolved_contacts_alone() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    // Overlap smaller than the slop.
    let mut world = two_balls(0.499, [1.0, 1.0], 0.0, 0.0, &settings);

    let solver = ContactSolver::new(&step, &world.graph, &[world.handle], &world.bodies);
    let initial = world.positions.clone();

    for _ in 0..3 {
        let min_separation = solver.solve_position_constraints(&mut world.positions, &settings);
        assert_relative_eq!(min_separation, -0.002, epsilon = 1.0e-5);
        assert!(min_separation >= -settings.linear_slop);
    }

    assert_eq!(world.positions, initial);
}

#[test]
fn position_solver_pushes_overlapping_bodies_apart() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.4, [1.0, 1.0], 0.0, 0.0, &settings);
    let solver = ContactSolver::new(&step, &world.graph, &[world.handle], &world.bodies);

    let mut previous = separation(&world.positions);
    let min_separation = solver.solve_position_constraints(&mut world.positions, &settings);
    assert_relative_eq!(min_separation, -0.2, epsilon = 1.0e-5);
    assert!(!position_solved(min_separation, &settings));

    for _ in 0..50 {
        let current = separation(&world.positions);
        assert!(current > previous || current >= -settings.linear_slop);
        assert!(current - previous <= settings.max_linear_correction + 1.0e-5);
        previous = current;

        let min_separation = solver.solve_position_constraints(&mut world.positions, &settings);
        assert!(min_separation <= 0.0);
        if position_solved(min_separation, &settings) {
            break;
        }
    }

    assert!(separation(&world.positions) >= -3.0 * settings.linear_slop);
    // Both bodies moved by the same amount.
    assert_relative_eq!(
        world.positions[0].c.x,
        -world.positions[1].c.x,
        epsilon = 1.0e-5
    );
}

#[test]
fn toi_position_solver_only_moves_toi_bodies() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.45, [1.0, 1.0], 0.0, 0.0, &settings);
    let solver = ContactSolver::new(&step, &world.graph, &[world.handle], &world.bodies);

    for _ in 0..20 {
        let min_separation =
            solver.solve_toi_position_constraints(&mut world.positions, &settings, 1, 1);
        if toi_position_solved(min_separation, &settings) {
            break;
        }
    }

    assert_eq!(world.positions[0], BodyPosition::new(Point::new(-0.45, 0.0), 0.0));
    assert!(world.positions[1].c.x > 0.45);
    assert!(separation(&world.positions) >= -1.5 * settings.linear_slop);
}

#[test]
fn toi_sub_step_positions_converge_within_the_tighter_tolerance() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.49, [1.0, 1.0], 0.0, 0.0, &settings);

    assert!(solve_toi_positions(
        &step,
        &settings,
        &world.graph,
        &[world.handle],
        &world.bodies,
        &mut world.positions,
        0,
        1,
    ));
    assert!(separation(&world.positions) >= -1.5 * settings.linear_slop);

    // Thresholds on the returned separation.
    assert!(position_solved(-2.0 * settings.linear_slop, &settings));
    assert!(!toi_position_solved(-2.0 * settings.linear_slop, &settings));
    assert!(toi_position_solved(0.0, &settings));
}

#[test]
fn solve_island_separates_colliding_balls() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.49, [1.0, 1.0], 0.0, 1.0, &settings);
    world.velocities[0].v = Vector::new(5.0, 0.0);
    world.velocities[1].v = Vector::new(-5.0, 0.0);

    let converged = solve_island(
        &step,
        &settings,
        &mut world.graph,
        &[world.handle],
        &world.bodies,
        &mut world.positions,
        &mut world.velocities,
    );

    assert!(converged);
    assert!(separation(&world.positions) > 0.0);
    assert!(world.velocities[0].v.x < 0.0 && world.velocities[1].v.x > 0.0);

    let impulse = world.graph.get(world.handle).unwrap().manifold().points[0].normal_impulse;
    assert!(impulse > 0.0);
}

#[test]
fn sensors_and_disabled_contacts_are_not_solved() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let mut world = two_balls(0.49, [1.0, 1.0], 0.0, 0.0, &settings);

    world.graph.get_mut(world.handle).unwrap().set_enabled(false);
    let solver = ContactSolver::new(&step, &world.graph, &[world.handle], &world.bodies);
    assert!(solver.constraints().is_empty());
    assert!(solver.handles().is_empty());
}

/// A unit box resting on a static segment, with a hand-built two-point manifold.
fn box_on_ground(
    velocity: Vector<Real>,
) -> (Contact, Vec<SolverBody>, Vec<BodyPosition>, Vec<BodyVelocity>) {
    let ground = Shape::from(Segment::new(Point::new(-5.0, 0.0), Point::new(5.0, 0.0), 0.0));
    let cuboid = Shape::from(ConvexPolygon::cuboid(Vector::new(0.5, 0.5), 0.0));

    let mut dispatcher = ContactDispatcher::new();
    let _ = dispatcher.register(ShapeType::Segment, ShapeType::ConvexPolygon, common::no_points);

    let mut contact = Contact::new(
        &dispatcher,
        ContactFixture::new(0, 0, 0, 0.0, 0.0),
        &ground,
        ContactFixture::new(1, 1, 0, 0.0, 0.0),
        &cuboid,
    )
    .unwrap();

    let manifold = contact.manifold_mut();
    manifold.manifold_type = ManifoldType::FaceA;
    manifold.local_normal = Vector::y();
    manifold.local_point = Point::origin();
    for (i, x) in [-0.5, 0.5].into_iter().enumerate() {
        manifold.points.push(ManifoldPoint::new(
            Point::new(x, -0.5),
            ContactId::new(0, ContactFeatureType::Face, i as u8, ContactFeatureType::Vertex),
        ));
    }

    // Box of mass 1 and inertia 1/6.
    let bodies = vec![SolverBody::fixed(), SolverBody::new(1.0, 6.0, Point::origin())];
    let positions = vec![
        BodyPosition::new(Point::origin(), 0.0),
        BodyPosition::new(Point::new(0.0, 0.5), 0.0),
    ];
    let velocities = vec![BodyVelocity::default(), BodyVelocity::new(velocity, 0.0)];

    (contact, bodies, positions, velocities)
}

#[test]
fn block_solver_stops_a_falling_box() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let (contact, bodies, positions, mut velocities) = box_on_ground(Vector::new(0.0, -2.0));

    let mut constraint = ContactConstraint::init_constraint(&contact, &bodies, &step);
    constraint.init_velocity_constraint(&positions, &velocities, &settings, &step);
    assert_eq!(constraint.point_count, 2);
    assert_relative_eq!(constraint.k.m11, 2.5, epsilon = 1.0e-5);
    assert_relative_eq!(constraint.k.m12, -0.5, epsilon = 1.0e-5);

    constraint.solve_velocity_constraint(&mut velocities, &step);

    assert_relative_eq!(velocities[1].v, Vector::zeros(), epsilon = 1.0e-5);
    assert_relative_eq!(velocities[1].w, 0.0, epsilon = 1.0e-5);
    assert_relative_eq!(constraint.points[0].normal_impulse, 1.0, epsilon = 1.0e-5);
    assert_relative_eq!(constraint.points[1].normal_impulse, 1.0, epsilon = 1.0e-5);

    // Another iteration changes nothing.
    constraint.solve_velocity_constraint(&mut velocities, &step);
    assert_relative_eq!(velocities[1].v, Vector::zeros(), epsilon = 1.0e-5);
}

#[test]
fn block_solver_applies_nothing_without_a_valid_case() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let (contact, bodies, positions, mut velocities) = box_on_ground(Vector::new(0.0, -1.0));

    let mut constraint = ContactConstraint::init_constraint(&contact, &bodies, &step);
    constraint.init_velocity_constraint(&positions, &velocities, &settings, &step);

    // A system with no admissible solution among the four cases. This is a known
    // tolerance of the block solver: the iteration is skipped.
    constraint.k = SdpMatrix2::new(2.5, 2.0, 2.5);
    constraint.normal_mass = SdpMatrix2::new(1.0, -2.0, 1.0);

    constraint.solve_velocity_constraint(&mut velocities, &step);

    assert_eq!(velocities[1].v, Vector::new(0.0, -1.0));
    assert_eq!(constraint.points[0].normal_impulse, 0.0);
    assert_eq!(constraint.points[1].normal_impulse, 0.0);
}

#[test]
fn redundant_points_fall_back_to_a_single_point() {
    let settings = Settings::default();
    let step = TimeStep::new(1.0 / 60.0);
    let (mut contact, bodies, positions, velocities) = box_on_ground(Vector::new(0.0, -1.0));

    // Two nearly coincident points make K ill-conditioned.
    contact.manifold_mut().points[1].local_point = Point::new(-0.5 + 1.0e-4, -0.5);

    let mut constraint = ContactConstraint::init_constraint(&contact, &bodies, &step);
    constraint.init_velocity_constraint(&positions, &velocities, &settings, &step);
    assert_eq!(constraint.point_count, 1);
}
