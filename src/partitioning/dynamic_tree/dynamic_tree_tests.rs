use super::{DynamicTree, ProxyId};
use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Point, Real, Vector};
use crate::query::RayCastInput;
use crate::settings::Settings;

fn make_test_aabb(i: usize) -> Aabb {
    Aabb::from_half_extents(Vector::repeat(i as Real).into(), Vector::repeat(1.0))
}

fn random_aabb(rng: &mut oorandom::Rand32) -> Aabb {
    let center = Point::new(
        rng.rand_float() as Real * 100.0 - 50.0,
        rng.rand_float() as Real * 100.0 - 50.0,
    );
    let half_extents = Vector::new(
        rng.rand_float() as Real * 2.0 + 0.1,
        rng.rand_float() as Real * 2.0 + 0.1,
    );
    Aabb::from_half_extents(center, half_extents)
}

fn brute_force_query(tree: &DynamicTree<usize>, ids: &[ProxyId], aabb: &Aabb) -> Vec<ProxyId> {
    let mut result: Vec<_> = ids
        .iter()
        .copied()
        .filter(|id| tree.fat_aabb(*id).intersects(aabb))
        .collect();
    result.sort();
    result
}

#[test]
fn tree_insertion_and_removal() {
    // Check various removal patterns.
    // The tree validity and balance are asserted at every step.
    #[derive(Copy, Clone, Debug)]
    enum RemovalPattern {
        InOrder,
        RevOrder,
        EvenOdd,
    }

    for removal_pattern in [
        RemovalPattern::InOrder,
        RemovalPattern::RevOrder,
        RemovalPattern::EvenOdd,
    ] {
        for len in 1..=60 {
            let mut tree = DynamicTree::default();
            let mut ids = Vec::new();

            for i in 0..len {
                ids.push(tree.create_proxy(make_test_aabb(i), i));
                tree.validate();
            }

            let order: Vec<usize> = match removal_pattern {
                RemovalPattern::InOrder => (0..len).collect(),
                RemovalPattern::RevOrder => (0..len).rev().collect(),
                RemovalPattern::EvenOdd => (0..len)
                    .filter(|i| i % 2 == 0)
                    .chain((0..len).filter(|i| i % 2 != 0))
                    .collect(),
            };

            for i in order {
                assert_eq!(tree.user_data(ids[i]), i);
                tree.destroy_proxy(ids[i]);
                tree.validate();
            }

            assert!(tree.is_empty());
            assert_eq!(tree.proxy_count(), 0);
            assert_eq!(tree.height(), 0);
        }
    }
}

#[test]
fn small_and_large_moves() {
    let settings = Settings::default();
    let mut tree = DynamicTree::new(&settings);

    let aabb1 = Aabb::new(Point::new(-1.0, -1.0), Point::new(1.0, 1.0));
    let aabb2 = Aabb::new(Point::new(-1.0, 1.0), Point::new(1.0, 3.0));
    let aabb3 = Aabb::new(Point::new(1.0, -1.0), Point::new(3.0, 1.0));

    let id1 = tree.create_proxy(aabb1, 1);
    let id2 = tree.create_proxy(aabb2, 2);
    let id3 = tree.create_proxy(aabb3, 3);

    assert_eq!(tree.height(), 2);
    assert_eq!(tree.compute_height(), 2);
    assert_eq!(
        *tree.fat_aabb(id1),
        aabb1.loosened(settings.aabb_extension)
    );

    // A move within the fat margin does not touch the tree.
    let displacement = Vector::new(0.05, 0.05);
    let moved = tree.move_proxy(id1, aabb1.translated(&displacement), &displacement);
    assert!(!moved);
    assert_eq!(
        *tree.fat_aabb(id1),
        aabb1.loosened(settings.aabb_extension)
    );

    // A large move reinserts the proxy with a fat AABB extended along the motion.
    let displacement = Vector::new(6.0, 6.0);
    let new_aabb = aabb1.translated(&displacement);
    assert!(tree.move_proxy(id1, new_aabb, &displacement));
    let fat = *tree.fat_aabb(id1);
    assert!(fat.contains(&new_aabb));
    assert_relative_eq!(
        fat.maxs,
        new_aabb.maxs + Vector::repeat(settings.aabb_extension)
            + displacement * settings.aabb_multiplier
    );
    assert!(tree.was_moved(id1));
    tree.clear_moved(id1);
    assert!(!tree.was_moved(id1));
    tree.assert_well_formed();

    tree.destroy_proxy(id1);
    assert_eq!(tree.height(), 1);
    tree.destroy_proxy(id2);
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.user_data(id3), 3);
    tree.destroy_proxy(id3);
    assert!(tree.is_empty());
}

#[test]
fn destroyed_handles_are_recycled() {
    let mut tree = DynamicTree::default();
    let a = tree.create_proxy(make_test_aabb(0), 0);
    let _b = tree.create_proxy(make_test_aabb(5), 1);
    tree.destroy_proxy(a);
    let c = tree.create_proxy(make_test_aabb(9), 2);
    tree.assert_well_formed();
    assert_eq!(tree.proxy_count(), 2);
    assert_eq!(tree.user_data(c), 2);
}

#[test]
#[should_panic]
fn destroying_a_dead_proxy_panics() {
    let mut tree = DynamicTree::default();
    let a = tree.create_proxy(make_test_aabb(0), 0);
    tree.destroy_proxy(a);
    tree.destroy_proxy(a);
}

#[test]
fn random_operations_keep_the_tree_valid() {
    let mut rng = oorandom::Rand32::new(42);
    let mut tree = DynamicTree::default();
    let mut ids: Vec<ProxyId> = Vec::new();

    for step in 0..2000 {
        match rng.rand_range(0..4) {
            0 | 1 => {
                ids.push(tree.create_proxy(random_aabb(&mut rng), step));
            }
            2 if !ids.is_empty() => {
                let k = rng.rand_range(0..ids.len() as u32) as usize;
                tree.destroy_proxy(ids.swap_remove(k));
            }
            _ if !ids.is_empty() => {
                let k = rng.rand_range(0..ids.len() as u32) as usize;
                let aabb = random_aabb(&mut rng);
                let displacement = aabb.center() - tree.fat_aabb(ids[k]).center();
                let _ = tree.move_proxy(ids[k], aabb, &(displacement * 0.01));
                assert!(tree.fat_aabb(ids[k]).contains(&aabb));
            }
            _ => {}
        }

        if step % 50 == 0 {
            tree.validate();

            let query = random_aabb(&mut rng).loosened(5.0);
            let mut found = Vec::new();
            tree.query(&query, |id| {
                found.push(id);
                true
            });
            found.sort();
            assert_eq!(found, brute_force_query(&tree, &ids, &query));
        }
    }

    assert!(tree.area_ratio() >= 1.0);
    tree.rebuild_bottom_up();
    tree.assert_well_formed();
    assert_eq!(tree.proxy_count(), ids.len());
}

#[test]
fn query_can_stop_early() {
    let mut tree = DynamicTree::default();
    for i in 0..10 {
        let _ = tree.create_proxy(make_test_aabb(0), i);
    }

    let mut count = 0;
    tree.query(&make_test_aabb(0), |_| {
        count += 1;
        count < 3
    });
    assert_eq!(count, 3);
}

#[test]
fn ray_cast_clips_and_terminates() {
    let mut tree = DynamicTree::with_margins(0.0, 0.0);
    let near = tree.create_proxy(
        Aabb::new(Point::new(2.0, -1.0), Point::new(3.0, 1.0)),
        0usize,
    );
    let _far = tree.create_proxy(
        Aabb::new(Point::new(6.0, -1.0), Point::new(7.0, 1.0)),
        1usize,
    );
    let _off_ray = tree.create_proxy(
        Aabb::new(Point::new(4.0, 5.0), Point::new(5.0, 6.0)),
        2usize,
    );

    let input = RayCastInput::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 1.0);

    // Clipping to the nearest hit prunes the far proxy once the near one is reported.
    let mut visited = Vec::new();
    tree.ray_cast(&input, |sub_input, id| {
        visited.push(id);
        tree.fat_aabb(id)
            .ray_cast(sub_input)
            .map(|hit| hit.fraction)
            .unwrap_or(-1.0)
    });
    assert!(visited.contains(&near));
    assert!(visited.len() <= 2);

    // Returning zero terminates immediately.
    let mut calls = 0;
    tree.ray_cast(&input, |_, _| {
        calls += 1;
        0.0
    });
    assert_eq!(calls, 1);
}

#[test]
fn shift_origin_translates_everything() {
    let mut tree = DynamicTree::with_margins(0.0, 0.0);
    let id = tree.create_proxy(make_test_aabb(3), ());
    tree.shift_origin(&Vector::new(1.0, 2.0));
    assert_eq!(tree.fat_aabb(id).center(), Point::new(2.0, 1.0));
    tree.assert_well_formed();
}
