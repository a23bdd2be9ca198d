//! Collision state and state marker components.
//!
//! [`CollisionState`] is what the resolver produces each step. The marker components
//! mirror it onto the entity so game systems can filter on them. They are
//! added/removed by [`sync_state_markers`](crate::systems::sync_state_markers).

use std::fmt;

use bevy::prelude::*;

use crate::math::Fix;

/// Contacts found by the most recent step.
///
/// Every flag is recomputed from scratch each step. Only
/// `was_grounded_last_frame` carries history from the previous step.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionState {
    /// Blocked moving right.
    pub right: bool,
    /// Blocked moving left.
    pub left: bool,
    /// Blocked moving up.
    pub above: bool,
    /// Standing on something. This is the grounded flag.
    pub below: bool,
    /// `below` was true at the end of the previous step.
    pub was_grounded_last_frame: bool,
    /// Grounded now but not at the end of the previous step.
    pub became_grounded_this_frame: bool,
    /// The descent probe snapped the movement onto a downhill slope.
    pub moving_down_slope: bool,
    /// Signed slope angle in degrees: negative while climbing, positive while
    /// descending, zero on flat ground or in the air.
    #[reflect(ignore)]
    pub slope_angle: Fix,
}

impl CollisionState {
    /// Clear every per-step flag. `was_grounded_last_frame` is left alone.
    pub fn reset(&mut self) {
        self.right = false;
        self.left = false;
        self.above = false;
        self.below = false;
        self.became_grounded_this_frame = false;
        self.moving_down_slope = false;
        self.slope_angle = Fix::ZERO;
    }

    /// Whether any side touched something.
    pub fn has_collision(&self) -> bool {
        self.below || self.right || self.left || self.above
    }
}

impl fmt::Display for CollisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "r: {}, l: {}, a: {}, b: {}, moving_down_slope: {}, angle: {}, was_grounded_last_frame: {}, became_grounded_this_frame: {}",
            self.right,
            self.left,
            self.above,
            self.below,
            self.moving_down_slope,
            self.slope_angle,
            self.was_grounded_last_frame,
            self.became_grounded_this_frame,
        )
    }
}

/// Marker component indicating the character is grounded.
///
/// Present while the last step reported `below`. Mutually exclusive with
/// [`Airborne`].
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fp_character_controller::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the character ran into a wall during the last step.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct TouchingWall {
    /// Wall on the left.
    pub left: bool,
    /// Wall on the right.
    pub right: bool,
}

impl TouchingWall {
    /// Create a new wall touch state.
    pub fn new(left: bool, right: bool) -> Self {
        Self { left, right }
    }

    /// Check if the wall is on the left side.
    pub fn is_left(&self) -> bool {
        self.left
    }

    /// Check if the wall is on the right side.
    pub fn is_right(&self) -> bool {
        self.right
    }
}

/// Marker component indicating the character hit a ceiling during the last step.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct TouchingCeiling;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keeps_grounded_history() {
        let mut state = CollisionState {
            right: true,
            below: true,
            was_grounded_last_frame: true,
            became_grounded_this_frame: true,
            moving_down_slope: true,
            slope_angle: Fix::from_num(12),
            ..default()
        };
        state.reset();

        assert!(state.was_grounded_last_frame);
        assert!(!state.has_collision());
        assert!(!state.became_grounded_this_frame);
        assert!(!state.moving_down_slope);
        assert_eq!(state.slope_angle, Fix::ZERO);
    }

    #[test]
    fn has_collision_on_any_side() {
        for side in 0..4 {
            let mut state = CollisionState::default();
            match side {
                0 => state.left = true,
                1 => state.right = true,
                2 => state.above = true,
                _ => state.below = true,
            }
            assert!(state.has_collision());
        }
    }

    #[test]
    fn display_lists_flags() {
        let state = CollisionState {
            below: true,
            slope_angle: Fix::from_num(-30),
            ..default()
        };
        let text = state.to_string();
        assert!(text.contains("b: true"));
        assert!(text.contains("angle: -30"));
    }

    #[test]
    fn touching_wall_sides() {
        let wall = TouchingWall::new(true, false);
        assert!(wall.is_left());
        assert!(!wall.is_right());
    }
}
