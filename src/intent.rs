//! Movement intent component.
//!
//! The intent is the per-step request from player input or AI. The backend
//! movement system consumes it once per fixed step and clears it.

use bevy::prelude::*;

use crate::math::{Fix, FixVec2};

/// Displacement requested for the next fixed step.
///
/// Game code computes the displacement (velocity times step, gravity included) and
/// writes it here. The controller resolves it against the world, applies the result
/// and resets the intent, so a step without a fresh request moves by zero.
///
/// # Example
///
/// ```rust
/// use fp_character_controller::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_displacement(FixVec2::from_num(0.1, -0.05));
/// intent.drop_through_one_way_platforms();
///
/// let (displacement, ignore_one_way) = intent.take();
/// assert_eq!(displacement, FixVec2::from_num(0.1, -0.05));
/// assert!(ignore_one_way);
///
/// // Taking the intent clears it.
/// assert_eq!(intent.displacement, FixVec2::ZERO);
/// assert!(!intent.ignore_one_way_platforms);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Requested displacement in world units.
    #[reflect(ignore)]
    pub displacement: FixVec2,
    /// Pass through one-way platforms during the next step.
    pub ignore_one_way_platforms: bool,
}

impl MovementIntent {
    /// Create a new empty movement intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the requested displacement.
    pub fn set_displacement(&mut self, displacement: FixVec2) {
        self.displacement = displacement;
    }

    /// Add to the requested displacement.
    pub fn add_displacement(&mut self, displacement: FixVec2) {
        self.displacement += displacement;
    }

    /// Request a horizontal run of `dx` on top of the current request.
    pub fn add_horizontal(&mut self, dx: Fix) {
        self.displacement.x += dx;
    }

    /// Fall through one-way platforms during the next step.
    pub fn drop_through_one_way_platforms(&mut self) {
        self.ignore_one_way_platforms = true;
    }

    /// Whether anything is requested.
    pub fn is_idle(&self) -> bool {
        self.displacement == FixVec2::ZERO && !self.ignore_one_way_platforms
    }

    /// Return the request and reset the intent.
    pub fn take(&mut self) -> (FixVec2, bool) {
        let request = (self.displacement, self.ignore_one_way_platforms);
        self.clear();
        request
    }

    /// Clear the request.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_intent_is_idle() {
        let intent = MovementIntent::new();
        assert!(intent.is_idle());
    }

    #[test]
    fn displacement_accumulates() {
        let mut intent = MovementIntent::new();
        intent.add_displacement(FixVec2::from_num(0, -1));
        intent.add_horizontal(Fix::from_num(2));
        assert_eq!(intent.displacement, FixVec2::from_num(2, -1));
        assert!(!intent.is_idle());

        intent.set_displacement(FixVec2::X);
        assert_eq!(intent.displacement, FixVec2::X);
    }

    #[test]
    fn drop_through_alone_is_not_idle() {
        let mut intent = MovementIntent::new();
        intent.drop_through_one_way_platforms();
        assert!(!intent.is_idle());

        let (displacement, ignore) = intent.take();
        assert_eq!(displacement, FixVec2::ZERO);
        assert!(ignore);
        assert!(intent.is_idle());
    }
}
