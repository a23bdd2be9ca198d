//! The controller's own collider and position.
//!
//! The resolver never reads ECS components directly. It sees the moving body through
//! [`ControllerBody`], which reports the world-space bounds of the box collider and
//! applies translations. [`Body2d`] implements it over the [`FixedTransform`] and
//! [`BoxCollider2d`] components.

use bevy::prelude::*;

use crate::collision::Aabb;
use crate::math::FixVec2;

/// Access to the body moved by a character controller.
pub trait ControllerBody {
    /// World-space bounding box of the collider.
    fn bounds(&self) -> Aabb;

    /// Effective collider size: local size times the absolute scale.
    fn collider_size(&self) -> FixVec2;

    /// Move the body by `delta` in world space.
    fn translate(&mut self, delta: FixVec2);
}

impl<T: ControllerBody + ?Sized> ControllerBody for &mut T {
    fn bounds(&self) -> Aabb {
        (**self).bounds()
    }

    fn collider_size(&self) -> FixVec2 {
        (**self).collider_size()
    }

    fn translate(&mut self, delta: FixVec2) {
        (**self).translate(delta)
    }
}

/// Deterministic position and scale of a controlled entity.
///
/// This is the simulation's source of truth. Bevy's `Transform` is written from it
/// for rendering and never read back.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedTransform {
    /// World position.
    pub translation: FixVec2,
    /// Local scale. Only its magnitude affects the collider.
    pub scale: FixVec2,
}

impl Default for FixedTransform {
    fn default() -> Self {
        Self {
            translation: FixVec2::ZERO,
            scale: FixVec2::ONE,
        }
    }
}

impl FixedTransform {
    /// Transform at `translation` with unit scale.
    pub fn from_translation(translation: FixVec2) -> Self {
        Self {
            translation,
            ..default()
        }
    }

    /// Builder: set scale.
    pub fn with_scale(mut self, scale: FixVec2) -> Self {
        self.scale = scale;
        self
    }
}

/// Axis-aligned box collider of a character.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxCollider2d {
    /// Unscaled size.
    pub size: FixVec2,
    /// Unscaled offset of the box center from the entity position.
    pub offset: FixVec2,
}

impl BoxCollider2d {
    /// Centered box of `size`.
    pub fn new(size: FixVec2) -> Self {
        Self {
            size,
            offset: FixVec2::ZERO,
        }
    }

    /// Builder: set the center offset.
    pub fn with_offset(mut self, offset: FixVec2) -> Self {
        self.offset = offset;
        self
    }

    /// Size under `scale`. Mirroring does not shrink the box.
    pub fn scaled_size(&self, scale: FixVec2) -> FixVec2 {
        self.size.mul_elements(scale.abs())
    }
}

/// [`ControllerBody`] over borrowed ECS components.
#[derive(Debug)]
pub struct Body2d<'a> {
    /// Position written by the controller.
    pub transform: &'a mut FixedTransform,
    /// Collider shape.
    pub collider: &'a BoxCollider2d,
}

impl<'a> Body2d<'a> {
    /// Wrap a transform and its collider.
    pub fn new(transform: &'a mut FixedTransform, collider: &'a BoxCollider2d) -> Self {
        Self {
            transform,
            collider,
        }
    }
}

impl ControllerBody for Body2d<'_> {
    fn bounds(&self) -> Aabb {
        let center = self.transform.translation + self.collider.offset.mul_elements(self.transform.scale);
        Aabb::from_center_size(center, self.collider_size())
    }

    fn collider_size(&self) -> FixVec2 {
        self.collider.scaled_size(self.transform.scale)
    }

    fn translate(&mut self, delta: FixVec2) {
        self.transform.translation += delta;
    }
}
