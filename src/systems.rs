//! Core controller systems.
//!
//! These systems are shared by every backend: building controllers from their
//! configuration, keeping ray spacing current, mirroring collision state onto marker
//! components and copying the fixed-point position into `Transform` for rendering.
//! [`advance_controller`] is the per-entity step a backend's movement system calls.

use bevy::log::{debug, error};
use bevy::prelude::*;

use crate::backend::SpatialQuery;
use crate::body::{BoxCollider2d, ControllerBody, FixedTransform};
use crate::config::ControllerConfig;
use crate::controller::{CharacterController2d, MoveOutcome};
use crate::events::ControllerEvents;
use crate::intent::MovementIntent;
use crate::math::Fix;
use crate::state::{Airborne, Grounded, TouchingCeiling, TouchingWall};

/// Build a [`CharacterController2d`] for entities that have a configuration and a
/// collider but no controller yet.
///
/// Invalid configurations are logged and the entity is left alone until its
/// configuration changes again.
pub fn init_controllers(
    mut commands: Commands,
    q_pending: Query<
        (Entity, &ControllerConfig, &FixedTransform, &BoxCollider2d),
        (
            Without<CharacterController2d>,
            Or<(
                Changed<ControllerConfig>,
                Added<BoxCollider2d>,
                Added<FixedTransform>,
            )>,
        ),
    >,
) {
    for (entity, config, transform, collider) in &q_pending {
        let size = collider.scaled_size(transform.scale);
        match CharacterController2d::new(config.clone(), size) {
            Ok(controller) => {
                debug!("character controller ready on {entity}, ray spacing {:?}", controller.ray_spacing());
                commands.entity(entity).insert(controller);
            }
            Err(err) => error!("invalid controller config on {entity}: {err}"),
        }
    }
}

/// Apply configuration changes and recompute ray spacing when the collider size or
/// scale changed.
pub fn refresh_controllers(
    mut q_controllers: Query<
        (
            Entity,
            Ref<ControllerConfig>,
            &FixedTransform,
            &BoxCollider2d,
            &mut CharacterController2d,
        ),
        Or<(
            Changed<ControllerConfig>,
            Changed<BoxCollider2d>,
            Changed<FixedTransform>,
        )>,
    >,
) {
    for (entity, config, transform, collider, mut controller) in &mut q_controllers {
        if config.is_changed() {
            if let Err(err) = controller.set_config(ControllerConfig::clone(&config)) {
                error!("rejected controller config on {entity}, keeping the previous one: {err}");
            }
        }

        let size = collider.scaled_size(transform.scale);
        if size != controller.collider_size() {
            controller.recalculate_ray_spacing(size);
        }
    }
}

/// Step one controller: consume its intent, resolve the move and write hit events.
///
/// Backends call this from their movement system with their own spatial query.
pub fn advance_controller<Q, B>(
    entity: Entity,
    controller: &mut CharacterController2d,
    body: &mut B,
    intent: Option<Mut<MovementIntent>>,
    query: &Q,
    delta_time: Fix,
    events: &mut ControllerEvents,
) -> MoveOutcome
where
    Q: SpatialQuery + ?Sized,
    B: ControllerBody + ?Sized,
{
    let (displacement, ignore_one_way) = intent
        .filter(|intent| !intent.is_idle())
        .map(|mut intent| intent.take())
        .unwrap_or_default();
    if ignore_one_way {
        controller.set_ignore_one_way_platforms(true);
    }

    let outcome = controller.move_by(query, body, displacement, delta_time);
    if controller.collision_state().became_grounded_this_frame {
        debug!("{entity} landed");
    }

    events.write_hits(entity, &outcome.hits);
    outcome
}

/// Length of a fixed step as a [`Fix`], derived from the integer microsecond
/// timestep so every platform agrees.
pub fn fixed_delta_time(time: &Time<Fixed>) -> Fix {
    let raw = (time.timestep().as_micros() << 16) / 1_000_000;
    Fix::from_bits(i64::try_from(raw).unwrap_or(i64::MAX))
}

/// Sync state marker components based on the last step's collision state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(
        Entity,
        &CharacterController2d,
        Has<Grounded>,
        Has<Airborne>,
        Option<&TouchingWall>,
        Has<TouchingCeiling>,
    )>,
) {
    for (entity, controller, has_grounded, has_airborne, wall, has_ceiling) in &q_controllers {
        let state = controller.collision_state();

        // Sync Grounded/Airborne
        if state.below && !has_grounded {
            commands.entity(entity).insert(Grounded);
            commands.entity(entity).remove::<Airborne>();
        } else if !state.below && (has_grounded || !has_airborne) {
            commands.entity(entity).remove::<Grounded>();
            commands.entity(entity).insert(Airborne);
        }

        // Sync TouchingWall
        let touching = TouchingWall::new(state.left, state.right);
        if state.left || state.right {
            if wall != Some(&touching) {
                commands.entity(entity).insert(touching);
            }
        } else if wall.is_some() {
            commands.entity(entity).remove::<TouchingWall>();
        }

        // Sync TouchingCeiling
        if state.above && !has_ceiling {
            commands.entity(entity).insert(TouchingCeiling);
        } else if !state.above && has_ceiling {
            commands.entity(entity).remove::<TouchingCeiling>();
        }
    }
}

/// Copy [`FixedTransform`] into `Transform` for rendering. The z coordinate is kept.
pub fn sync_render_transforms(
    mut q_transforms: Query<(&FixedTransform, &mut Transform), Changed<FixedTransform>>,
) {
    for (fixed, mut transform) in &mut q_transforms {
        let translation = fixed.translation.to_vec2();
        let scale = fixed.scale.to_vec2();
        transform.translation.x = translation.x;
        transform.translation.y = translation.y;
        transform.scale.x = scale.x;
        transform.scale.y = scale.y;
    }
}
