//! Rapier2D physics backend implementation.
//!
//! Collision queries are answered by the Rapier query pipeline instead of the
//! fixed-point [`CollisionWorld`](crate::world::CollisionWorld). Enable with the
//! `rapier2d` feature.
//!
//! Rapier works in `f32`, so ray hits are converted to [`Fix`] at the boundary. Movement
//! stays fixed-point, but the hits themselves are only as reproducible as Rapier's float
//! math, which makes this backend unsuitable for lockstep or rollback simulation.
//!
//! Trigger volumes are Rapier [`Sensor`] colliders. Overlaps are tracked from
//! [`CollisionEvent`]s, so the controller entity needs a `Collider` with
//! `ActiveEvents::COLLISION_EVENTS`. A kinematic controller body also needs
//! `ActiveCollisionTypes::KINEMATIC_STATIC` to see sensors without a rigid body.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;

use crate::backend::{CharacterPhysicsBackend, SpatialQuery};
use crate::body::{Body2d, BoxCollider2d, ControllerBody, FixedTransform};
use crate::collision::RaycastHit;
use crate::controller::CharacterController2d;
use crate::events::ControllerEvents;
use crate::intent::MovementIntent;
use crate::layer::LayerMask;
use crate::math::{Fix, FixVec2};
use crate::systems::{advance_controller, fixed_delta_time};
use crate::CharacterControllerSet;

/// Rapier2D physics backend for the character controller.
///
/// Each controller's platform mask is matched against the `memberships` of the
/// colliders it casts against, so layer `n` corresponds to Rapier `Group` bit `n`.
pub struct Rapier2dBackend;

impl CharacterPhysicsBackend for Rapier2dBackend {
    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }
}

/// Plugin that sets up Rapier2D-specific systems for the character controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RapierTriggerContacts>();

        app.add_systems(
            FixedUpdate,
            track_sensor_contacts.in_set(CharacterControllerSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            step_rapier_controllers.in_set(CharacterControllerSet::Movement),
        );
    }
}

/// Sensor overlaps reported by Rapier, keyed by both participants.
#[derive(Resource, Debug, Default)]
pub struct RapierTriggerContacts {
    overlaps: BTreeMap<Entity, BTreeSet<Entity>>,
}

impl RapierTriggerContacts {
    /// Record that `a` and `b` started overlapping.
    pub fn start(&mut self, a: Entity, b: Entity) {
        self.overlaps.entry(a).or_default().insert(b);
        self.overlaps.entry(b).or_default().insert(a);
    }

    /// Record that `a` and `b` stopped overlapping.
    pub fn stop(&mut self, a: Entity, b: Entity) {
        for (from, to) in [(a, b), (b, a)] {
            if let Some(set) = self.overlaps.get_mut(&from) {
                set.remove(&to);
                if set.is_empty() {
                    self.overlaps.remove(&from);
                }
            }
        }
    }

    /// Everything currently overlapping `entity`, in ascending order.
    pub fn touching(&self, entity: Entity) -> impl Iterator<Item = Entity> + '_ {
        self.overlaps.get(&entity).into_iter().flatten().copied()
    }
}

/// Fold sensor collision events into [`RapierTriggerContacts`].
pub fn track_sensor_contacts(
    mut collision_events: EventReader<CollisionEvent>,
    mut contacts: ResMut<RapierTriggerContacts>,
) {
    for event in collision_events.read() {
        match *event {
            CollisionEvent::Started(a, b, flags) if flags.contains(CollisionEventFlags::SENSOR) => {
                contacts.start(a, b);
            }
            CollisionEvent::Stopped(a, b, _) => contacts.stop(a, b),
            CollisionEvent::Started(..) => {}
        }
    }
}

/// Layers a sensor belongs to. A sensor without collision groups is on every layer.
fn sensor_layers(groups: Option<&CollisionGroups>) -> LayerMask {
    groups.map_or(LayerMask::ALL, |groups| {
        LayerMask::from_bits(groups.memberships.bits())
    })
}

/// Convert a finite float vector, or `None` if it does not fit.
fn fix_from_vect(v: Vec2) -> Option<FixVec2> {
    if !v.is_finite() {
        return None;
    }
    Some(FixVec2::new(Fix::checked_from_num(v.x)?, Fix::checked_from_num(v.y)?))
}

/// [`SpatialQuery`] backed by the Rapier query pipeline.
///
/// Sensors and the controller's own collider are never hit.
pub struct RapierSpatialQuery<'a, 'c> {
    context: &'a RapierContext<'c>,
    exclude: Entity,
}

impl<'a, 'c> RapierSpatialQuery<'a, 'c> {
    /// Query that ignores the collider and rigid body on `exclude`.
    pub fn new(context: &'a RapierContext<'c>, exclude: Entity) -> Self {
        Self { context, exclude }
    }
}

impl SpatialQuery for RapierSpatialQuery<'_, '_> {
    fn raycast(
        &self,
        origin: FixVec2,
        direction: FixVec2,
        max_distance: Fix,
        mask: LayerMask,
    ) -> Option<RaycastHit> {
        let filter = QueryFilter::default()
            .exclude_collider(self.exclude)
            .exclude_rigid_body(self.exclude)
            .exclude_sensors()
            .groups(CollisionGroups::new(
                Group::ALL,
                Group::from_bits_truncate(mask.bits()),
            ));

        let (entity, intersection) = self.context.cast_ray_and_get_normal(
            origin.to_vec2(),
            direction.to_vec2(),
            max_distance.to_num::<f32>(),
            true,
            filter,
        )?;

        let distance = Fix::checked_from_num(intersection.time_of_impact)?;
        Some(RaycastHit::new(
            fix_from_vect(intersection.point)?,
            fix_from_vect(intersection.normal)?,
            distance,
            Some(entity),
        ))
    }
}

/// Step every controller against the Rapier world in ascending entity order.
pub fn step_rapier_controllers(
    rapier_context: ReadRapierContext,
    time: Res<Time<Fixed>>,
    contacts: Res<RapierTriggerContacts>,
    q_sensors: Query<Option<&CollisionGroups>, With<Sensor>>,
    mut q_controllers: Query<(
        Entity,
        &mut CharacterController2d,
        &mut FixedTransform,
        &BoxCollider2d,
        Option<&mut MovementIntent>,
    )>,
    mut events: ControllerEvents,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    let delta_time = fixed_delta_time(&time);
    let mut entities: Vec<Entity> = q_controllers.iter().map(|(entity, ..)| entity).collect();
    entities.sort();

    for entity in entities {
        let Ok((entity, mut controller, mut transform, collider, intent)) = q_controllers.get_mut(entity) else {
            continue;
        };
        let query = RapierSpatialQuery::new(&context, entity);
        let mut body = Body2d::new(&mut *transform, collider);
        advance_controller(entity, &mut controller, &mut body, intent, &query, delta_time, &mut events);

        let trigger_mask = controller.config().trigger_mask;
        let overlaps: Vec<Entity> = contacts
            .touching(entity)
            .filter(|&other| {
                q_sensors
                    .get(other)
                    .is_ok_and(|groups| trigger_mask.intersects(sensor_layers(groups)))
            })
            .collect();
        let changes = controller.update_triggers(overlaps);
        events.write_triggers(entity, &changes);
    }
}
