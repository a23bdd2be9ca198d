//! Physics backend abstraction.
//!
//! The resolver only needs one thing from a physics engine: a raycast that honors a
//! layer mask. That is [`SpatialQuery`]. A [`CharacterPhysicsBackend`] wires a
//! concrete engine into the Bevy schedule, running the movement step with its own
//! query implementation. Two backends ship: the deterministic
//! [`FixedWorldBackend`](crate::world::FixedWorldBackend) and, behind the `rapier2d`
//! feature, `Rapier2dBackend`.

use bevy::prelude::*;

use crate::collision::RaycastHit;
use crate::layer::LayerMask;
use crate::math::{Fix, FixVec2};

/// Raycast primitive consumed by the collision resolver.
///
/// Implementations must be pure reads: the resolver casts many rays per step and
/// expects identical answers for identical inputs.
pub trait SpatialQuery {
    /// Nearest hit along `direction` (unit length) within `max_distance`, considering
    /// only colliders on layers in `mask`.
    fn raycast(
        &self,
        origin: FixVec2,
        direction: FixVec2,
        max_distance: Fix,
        mask: LayerMask,
    ) -> Option<RaycastHit>;
}

impl<T: SpatialQuery + ?Sized> SpatialQuery for &T {
    fn raycast(
        &self,
        origin: FixVec2,
        direction: FixVec2,
        max_distance: Fix,
        mask: LayerMask,
    ) -> Option<RaycastHit> {
        (**self).raycast(origin, direction, max_distance, mask)
    }
}

/// Trait for physics backend implementations.
///
/// A backend provides a plugin that adds its movement system to
/// [`CharacterControllerSet::Movement`](crate::CharacterControllerSet::Movement) along
/// with whatever bookkeeping its spatial query needs.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fp_character_controller::backend::NoOpBackendPlugin;
/// use fp_character_controller::prelude::*;
///
/// /// Backend for an app that steps controllers by hand.
/// struct ManualBackend;
///
/// impl CharacterPhysicsBackend for ManualBackend {
///     fn plugin() -> impl Plugin {
///         NoOpBackendPlugin
///     }
/// }
///
/// let mut app = App::new();
/// app.add_plugins(CharacterController2dPlugin::<ManualBackend>::default());
/// ```
pub trait CharacterPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}
