//! Collision layer masks.
//!
//! A collider lives on exactly one of 32 layers; queries carry a [`LayerMask`] naming
//! the layers they may hit.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

use bevy::reflect::Reflect;

/// Set of collision layers, one bit per layer.
#[derive(Reflect, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerMask(u32);

impl LayerMask {
    /// No layers.
    pub const NONE: Self = Self(0);

    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Number of addressable layers.
    pub const LAYER_COUNT: u8 = 32;

    /// Mask containing a single layer. Layers past 31 yield an empty mask.
    #[inline]
    pub const fn layer(index: u8) -> Self {
        if index < Self::LAYER_COUNT {
            Self(1 << index)
        } else {
            Self::NONE
        }
    }

    /// Mask from raw bits.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Layers in either mask.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Layers in both masks.
    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Layers not in this mask.
    #[inline]
    pub const fn complement(self) -> Self {
        Self(!self.0)
    }

    /// This mask with every layer of `other` removed (`self & !other`).
    #[inline]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Whether the given layer is part of the mask.
    #[inline]
    pub const fn contains_layer(self, index: u8) -> bool {
        index < Self::LAYER_COUNT && self.0 & (1 << index) != 0
    }

    /// Whether the masks share at least one layer.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no layer is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for LayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerMask({:#034b})", self.0)
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for LayerMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl BitAndAssign for LayerMask {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.intersection(rhs);
    }
}

impl Not for LayerMask {
    type Output = Self;

    fn not(self) -> Self {
        self.complement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_layers() {
        let mask = LayerMask::layer(3);
        assert_eq!(mask.bits(), 0b1000);
        assert!(mask.contains_layer(3));
        assert!(!mask.contains_layer(2));
        assert_eq!(LayerMask::layer(32), LayerMask::NONE);
        assert!(!LayerMask::ALL.contains_layer(40));
    }

    #[test]
    fn set_operations() {
        let ground = LayerMask::layer(0);
        let one_way = LayerMask::layer(5);
        let platforms = ground | one_way;

        assert_eq!(platforms.without(one_way), ground);
        assert_eq!(platforms & !one_way, ground);
        assert!(platforms.intersects(one_way));
        assert!(!ground.intersects(one_way));
        assert_eq!(!LayerMask::NONE, LayerMask::ALL);
    }

    #[test]
    fn assign_operators() {
        let mut mask = LayerMask::layer(1);
        mask |= LayerMask::layer(2);
        assert_eq!(mask.bits(), 0b110);
        mask &= LayerMask::layer(2);
        assert_eq!(mask, LayerMask::layer(2));
        assert!(!mask.is_empty());
    }
}
