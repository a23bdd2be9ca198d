//! Collision primitives shared by the resolver and the spatial query backends.

use bevy::prelude::*;

use crate::math::{Fix, FixVec2};

/// Result of a raycast against the collision world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaycastHit {
    /// World position of the hit point.
    pub point: FixVec2,
    /// Surface normal at the hit point.
    pub normal: FixVec2,
    /// Distance along the ray to the hit point.
    pub distance: Fix,
    /// Entity that was hit (if any).
    pub entity: Option<Entity>,
}

impl RaycastHit {
    /// Create a hit record.
    pub fn new(point: FixVec2, normal: FixVec2, distance: Fix, entity: Option<Entity>) -> Self {
        Self {
            point,
            normal,
            distance,
            entity,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Bottom-left corner.
    pub min: FixVec2,
    /// Top-right corner.
    pub max: FixVec2,
}

impl Aabb {
    /// Box spanning two corners in any order.
    pub fn new(a: FixVec2, b: FixVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box of `size` centered on `center`.
    pub fn from_center_size(center: FixVec2, size: FixVec2) -> Self {
        let half = size.abs() / Fix::lit("2");
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Grow the total size by `amount` on both axes, keeping the center.
    ///
    /// Each edge moves by `amount / 2`; a negative amount shrinks the box.
    pub fn expand(self, amount: Fix) -> Self {
        let half = amount / Fix::lit("2");
        let offset = FixVec2::new(half, half);
        Self {
            min: self.min - offset,
            max: self.max + offset,
        }
    }

    /// Box moved by `delta`.
    pub fn translated(self, delta: FixVec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Horizontal extent.
    pub fn width(&self) -> Fix {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    pub fn height(&self) -> Fix {
        self.max.y - self.min.y
    }

    /// Center point.
    pub fn center(&self) -> FixVec2 {
        (self.min + self.max) / Fix::lit("2")
    }

    /// Whether the boxes overlap. Touching edges count as overlapping.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Whether `point` lies inside or on the boundary.
    pub fn contains(&self, point: FixVec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}
