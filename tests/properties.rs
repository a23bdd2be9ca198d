//! Property tests for the resolver and its helpers.

use std::collections::BTreeSet;

use bevy::prelude::Entity;
use fp_character_controller::prelude::*;
use fp_character_controller::triggers::TriggerTracker;
use proptest::prelude::*;

fn milli(n: i32) -> Fix {
    Fix::from_num(n) / 1000
}

fn floor(world: &mut CollisionWorld) {
    world.insert(WorldCollider::solid(
        Entity::from_raw(1),
        ColliderShape::Box(Aabb::new(FixVec2::from_num(-1000, -1), FixVec2::from_num(1000, 0))),
        0,
    ));
}

/// Move a 1 x 2 character centered at `center` once and return the applied
/// displacement, its final bounds and the collision state.
fn step_once(
    world: &CollisionWorld,
    config: ControllerConfig,
    center: FixVec2,
    requested: FixVec2,
) -> (FixVec2, Aabb, CollisionState) {
    let mut transform = FixedTransform::from_translation(center);
    let collider = BoxCollider2d::new(FixVec2::from_num(1, 2));
    let mut body = Body2d::new(&mut transform, &collider);
    let mut controller = CharacterController2d::for_body(config, &body).unwrap();

    let outcome = controller.move_by(world, &mut body, requested, Fix::ONE);
    (outcome.displacement, body.bounds(), *controller.collision_state())
}

proptest! {
    #[test]
    fn flat_ground_keeps_feet_on_the_surface(dx in -3000i32..3000, gravity in 1i32..500) {
        let mut world = CollisionWorld::new();
        floor(&mut world);
        let requested = FixVec2::new(milli(dx), -milli(gravity));

        let (applied, bounds, state) =
            step_once(&world, ControllerConfig::default(), FixVec2::from_num(0, 1), requested);

        prop_assert_eq!(applied.x, requested.x);
        prop_assert_eq!(applied.y, Fix::ZERO);
        prop_assert_eq!(bounds.min.y, Fix::ZERO);
        prop_assert!(state.below);
    }

    #[test]
    fn walls_are_never_penetrated(gap in 0i32..4000, dx in 0i32..6000) {
        let gap = milli(gap);
        let dx = milli(dx);
        let wall_x = Fix::from_num(0.5) + gap;
        let mut world = CollisionWorld::new();
        world.insert(WorldCollider::solid(
            Entity::from_raw(2),
            ColliderShape::Box(Aabb::new(
                FixVec2::new(wall_x, Fix::from_num(-10)),
                FixVec2::new(wall_x + Fix::ONE, Fix::from_num(10)),
            )),
            0,
        ));

        let (applied, bounds, state) = step_once(
            &world,
            ControllerConfig::default(),
            FixVec2::ZERO,
            FixVec2::new(dx, Fix::ZERO),
        );

        prop_assert_eq!(applied.x, dx.min(gap));
        prop_assert!(bounds.max.x <= wall_x);
        prop_assert_eq!(state.right, dx > Fix::ZERO && dx >= gap);
    }

    #[test]
    fn ray_counts_do_not_change_flat_results(
        horizontal in 2usize..=20,
        vertical in 2usize..=20,
        dx in -3000i32..3000,
    ) {
        let mut world = CollisionWorld::new();
        floor(&mut world);
        world.insert(WorldCollider::solid(
            Entity::from_raw(3),
            ColliderShape::rect(FixVec2::from_num(2.5, 5.0), FixVec2::from_num(1.0, 10.0)),
            0,
        ));
        let requested = FixVec2::new(milli(dx), Fix::from_num(-0.25));
        let center = FixVec2::from_num(0, 1);

        let baseline = step_once(&world, ControllerConfig::default(), center, requested);
        let config = ControllerConfig::default().with_ray_counts(horizontal, vertical);
        let candidate = step_once(&world, config, center, requested);

        prop_assert_eq!(baseline, candidate);
    }

    #[test]
    fn default_slope_curve_stays_in_range(angle in -180i32..=180) {
        let multiplier = SlopeSpeedCurve::default().evaluate(Fix::from_num(angle));
        prop_assert!(multiplier >= Fix::ZERO);
        prop_assert!(multiplier <= Fix::from_num(1.5));
    }

    #[test]
    fn trigger_events_classify_every_change(
        frames in prop::collection::vec(prop::collection::btree_set(0u32..8, 0..5), 1..10),
    ) {
        let mut tracker = TriggerTracker::default();
        let mut previous = BTreeSet::new();

        for frame in frames {
            let current: BTreeSet<Entity> = frame.into_iter().map(Entity::from_raw).collect();
            let events = tracker.update(current.iter().copied());

            let order: Vec<Entity> = events.iter().map(TriggerEvent::trigger).collect();
            let expected: Vec<Entity> = previous.union(&current).copied().collect();
            prop_assert_eq!(order, expected);

            for event in events {
                match event {
                    TriggerEvent::Enter(entity) => {
                        prop_assert!(current.contains(&entity) && !previous.contains(&entity));
                    }
                    TriggerEvent::Stay(entity) => {
                        prop_assert!(current.contains(&entity) && previous.contains(&entity));
                    }
                    TriggerEvent::Exit(entity) => {
                        prop_assert!(!current.contains(&entity) && previous.contains(&entity));
                    }
                }
            }
            previous = current;
        }
    }
}
