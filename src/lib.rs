//! # `fp_character_controller`
//!
//! A deterministic 2D kinematic character controller for Bevy, built on raycasts and
//! fixed-point math.
//!
//! This crate provides a box-shaped controller that:
//! - Resolves each step's requested displacement with fans of raycasts
//! - Climbs and descends slopes up to a configurable angle, scaling speed along a curve
//! - Stops at walls, floors and ceilings, and lets the character pass up through
//!   one-way platforms or drop through them on request
//! - Tracks grounded transitions and trigger volume enter / stay / exit
//! - Computes everything in [`I48F16`](fixed::types::I48F16) so identical inputs give
//!   identical outputs on every platform
//! - Abstracts the collision world behind a backend (a fixed-point world is built in,
//!   Rapier2D is optional)
//!
//! ## Architecture
//!
//! Nothing is simulated by a physics engine. Each fixed step:
//! 1. Game code writes a displacement into [`MovementIntent`](intent::MovementIntent)
//! 2. The backend moves each controller through
//!    [`CharacterController2d::move_by`](controller::CharacterController2d::move_by),
//!    in ascending entity order
//! 3. Hits and trigger changes are written as events
//! 4. Marker components and the render `Transform` are synced from the result
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use fp_character_controller::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(MinimalPlugins)
//!     .add_plugins(CharacterController2dPlugin::<FixedWorldBackend>::default());
//!
//! // Floor
//! app.world_mut().spawn(FixedCollider::solid(
//!     ColliderShape::rect(FixVec2::ZERO, FixVec2::from_num(20, 1)),
//!     0,
//! ));
//!
//! // Character
//! app.world_mut().spawn((
//!     ControllerConfig::default(),
//!     FixedTransform::from_translation(FixVec2::from_num(0, 2)),
//!     BoxCollider2d::new(FixVec2::from_num(1, 2)),
//!     MovementIntent::default(),
//! ));
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod body;
pub mod collision;
pub mod config;
pub mod controller;
pub mod curve;
pub mod events;
pub mod intent;
pub mod layer;
pub mod math;
pub mod state;
pub mod systems;
pub mod triggers;
pub mod world;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{CharacterPhysicsBackend, SpatialQuery};
    pub use crate::body::{Body2d, BoxCollider2d, ControllerBody, FixedTransform};
    pub use crate::collision::{Aabb, RaycastHit};
    pub use crate::config::{ConfigError, ControllerConfig};
    pub use crate::controller::{CharacterController2d, MoveOutcome, WarpError};
    pub use crate::curve::{CurveKey, SlopeSpeedCurve};
    pub use crate::events::{ControllerCollided, TriggerEntered, TriggerExited, TriggerStayed};
    pub use crate::intent::MovementIntent;
    pub use crate::layer::LayerMask;
    pub use crate::math::{Fix, FixVec2};
    pub use crate::state::{Airborne, CollisionState, Grounded, TouchingCeiling, TouchingWall};
    pub use crate::triggers::TriggerEvent;
    pub use crate::world::{ColliderShape, CollisionWorld, FixedCollider, FixedWorldBackend, WorldCollider};
    pub use crate::{CharacterController2dPlugin, CharacterControllerSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::Rapier2dBackend;
}

/// System sets for the controller's fixed step, run in this order in `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CharacterControllerSet {
    /// Controllers are built and refreshed, backends sync their collision data.
    Preparation,
    /// Backends move every controller.
    Movement,
    /// Marker components and render transforms follow the new state.
    Markers,
}

/// Main plugin for the character controller system.
///
/// This plugin is generic over a physics backend `B` which provides the collision
/// queries and runs the movement step.
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `FixedWorldBackend`)
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use fp_character_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(CharacterController2dPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct CharacterController2dPlugin<B: backend::CharacterPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterPhysicsBackend> Default for CharacterController2dPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterPhysicsBackend> Plugin for CharacterController2dPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<state::TouchingWall>();
        app.register_type::<state::TouchingCeiling>();
        app.register_type::<state::CollisionState>();
        app.register_type::<layer::LayerMask>();
        app.register_type::<config::ControllerConfig>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<controller::CharacterController2d>();

        app.add_event::<events::ControllerCollided>();
        app.add_event::<events::TriggerEntered>();
        app.add_event::<events::TriggerStayed>();
        app.add_event::<events::TriggerExited>();

        app.configure_sets(
            FixedUpdate,
            (
                CharacterControllerSet::Preparation,
                CharacterControllerSet::Movement,
                CharacterControllerSet::Markers,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (systems::init_controllers, systems::refresh_controllers)
                .chain()
                .in_set(CharacterControllerSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            (systems::sync_state_markers, systems::sync_render_transforms)
                .in_set(CharacterControllerSet::Markers),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());
    }
}
