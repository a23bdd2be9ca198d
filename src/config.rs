//! Controller configuration.
//!
//! [`ControllerConfig`] holds the tunables of the collision resolution: skin width,
//! layer masks, slope limit, jump threshold, ray fan density and the slope speed
//! curve. Configs are validated once when a controller is built or reconfigured.

use std::fmt;

use bevy::log::warn;
use bevy::prelude::*;
use thiserror::Error;

use crate::curve::SlopeSpeedCurve;
use crate::layer::LayerMask;
use crate::math::Fix;

/// Smallest accepted skin width. Non-positive values are clamped to this.
pub const MIN_SKIN_WIDTH: Fix = Fix::lit("0.001");

/// Fewest rays per fan. Ray spacing divides by `count - 1`.
pub const MIN_RAYS: usize = 2;

/// Most rays per fan.
pub const MAX_RAYS: usize = 20;

/// Which ray fan a ray count belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayAxis {
    /// Rays cast sideways, stacked along the collider height.
    Horizontal,
    /// Rays cast up or down, spread along the collider width.
    Vertical,
}

impl fmt::Display for RayAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}

/// Configuration that cannot be used to build a controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A ray fan outside `MIN_RAYS..=MAX_RAYS`.
    #[error("{axis} ray count must be between {MIN_RAYS} and {MAX_RAYS}, got {count}")]
    RayCount {
        /// Offending fan.
        axis: RayAxis,
        /// Requested ray count.
        count: usize,
    },
    /// A slope speed curve without keys.
    #[error("slope speed curve needs at least one key")]
    EmptySlopeCurve,
    /// Two slope speed curve keys at the same angle.
    #[error("slope speed curve has more than one key at {0} degrees")]
    DuplicateCurveKey(Fix),
}

/// Configuration parameters for the character controller.
///
/// Use the builder methods to override defaults:
///
/// ```rust
/// use fp_character_controller::prelude::*;
///
/// let config = ControllerConfig::default()
///     .with_platform_mask(LayerMask::layer(0))
///     .with_one_way_platform_mask(LayerMask::layer(4))
///     .with_slope_limit(Fix::from_num(45))
///     .with_ray_counts(6, 3);
///
/// let config = config.validated().unwrap();
/// // One-way platforms are always part of the platform mask.
/// assert!(config.platform_mask.contains_layer(4));
/// ```
#[derive(Component, Reflect, Debug, Clone, PartialEq, Eq)]
#[reflect(Component)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Inward margin of the ray origins. Rays cast from exactly on a surface report
    /// unreliable hits, so every ray starts this far inside the collider.
    #[reflect(ignore)]
    pub skin_width: Fix,

    /// Layers the controller collides with.
    pub platform_mask: LayerMask,

    /// Layers whose trigger volumes raise trigger events.
    pub trigger_mask: LayerMask,

    /// Layers that only block from above.
    pub one_way_platform_mask: LayerMask,

    /// Steepest climbable slope, in degrees from up.
    #[reflect(ignore)]
    pub slope_limit: Fix,

    /// Upward displacement per step at or above which slope climbing is skipped
    /// because the character is taken to be jumping.
    #[reflect(ignore)]
    pub jumping_threshold: Fix,

    /// Number of rays in the horizontal sweep.
    pub total_horizontal_rays: usize,

    /// Number of rays in the vertical sweep.
    pub total_vertical_rays: usize,

    /// Horizontal speed multiplier by signed slope angle.
    #[reflect(ignore)]
    pub slope_speed_multiplier: SlopeSpeedCurve,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            skin_width: Fix::lit("0.02"),
            platform_mask: LayerMask::ALL,
            trigger_mask: LayerMask::NONE,
            one_way_platform_mask: LayerMask::NONE,
            slope_limit: Fix::lit("30"),
            jumping_threshold: Fix::lit("0.07"),
            total_horizontal_rays: 8,
            total_vertical_rays: 4,
            slope_speed_multiplier: SlopeSpeedCurve::default(),
        }
    }
}

impl ControllerConfig {
    /// Check and normalize the configuration.
    ///
    /// Ray counts outside `2..=20` are rejected. A non-positive skin width or a slope
    /// limit outside `[0, 90]` is clamped with a warning. The one-way platform mask is
    /// folded into the platform mask so the regular vertical sweep lands on one-way
    /// platforms from above.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        for (axis, count) in [
            (RayAxis::Horizontal, self.total_horizontal_rays),
            (RayAxis::Vertical, self.total_vertical_rays),
        ] {
            if !(MIN_RAYS..=MAX_RAYS).contains(&count) {
                return Err(ConfigError::RayCount { axis, count });
            }
        }

        if self.skin_width <= Fix::ZERO {
            warn!(
                "skin width {} must be positive, clamping to {}",
                self.skin_width, MIN_SKIN_WIDTH
            );
            self.skin_width = MIN_SKIN_WIDTH;
        }

        let max_slope = Fix::lit("90");
        if self.slope_limit < Fix::ZERO || self.slope_limit > max_slope {
            let clamped = self.slope_limit.clamp(Fix::ZERO, max_slope);
            warn!("slope limit {} is outside [0, 90], clamping to {}", self.slope_limit, clamped);
            self.slope_limit = clamped;
        }

        self.platform_mask |= self.one_way_platform_mask;
        Ok(self)
    }

    /// Builder: set skin width.
    pub fn with_skin_width(mut self, skin_width: Fix) -> Self {
        self.skin_width = skin_width;
        self
    }

    /// Builder: set the platform mask.
    pub fn with_platform_mask(mut self, mask: LayerMask) -> Self {
        self.platform_mask = mask;
        self
    }

    /// Builder: set the trigger mask.
    pub fn with_trigger_mask(mut self, mask: LayerMask) -> Self {
        self.trigger_mask = mask;
        self
    }

    /// Builder: set the one-way platform mask.
    pub fn with_one_way_platform_mask(mut self, mask: LayerMask) -> Self {
        self.one_way_platform_mask = mask;
        self
    }

    /// Builder: set slope limit in degrees.
    pub fn with_slope_limit(mut self, degrees: Fix) -> Self {
        self.slope_limit = degrees;
        self
    }

    /// Builder: set jumping threshold.
    pub fn with_jumping_threshold(mut self, threshold: Fix) -> Self {
        self.jumping_threshold = threshold;
        self
    }

    /// Builder: set both ray fan sizes.
    pub fn with_ray_counts(mut self, horizontal: usize, vertical: usize) -> Self {
        self.total_horizontal_rays = horizontal;
        self.total_vertical_rays = vertical;
        self
    }

    /// Builder: set the slope speed curve.
    pub fn with_slope_speed_multiplier(mut self, curve: SlopeSpeedCurve) -> Self {
        self.slope_speed_multiplier = curve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.skin_width, Fix::from_num(0.02));
        assert_eq!(config.slope_limit, Fix::from_num(30));
        assert_eq!(config.jumping_threshold, Fix::from_num(0.07));
        assert_eq!(config.total_horizontal_rays, 8);
        assert_eq!(config.total_vertical_rays, 4);
    }

    #[test]
    fn rejects_too_few_rays() {
        let result = ControllerConfig::default().with_ray_counts(1, 4).validated();
        assert_eq!(
            result,
            Err(ConfigError::RayCount {
                axis: RayAxis::Horizontal,
                count: 1
            })
        );

        let result = ControllerConfig::default().with_ray_counts(4, 0).validated();
        assert!(matches!(
            result,
            Err(ConfigError::RayCount {
                axis: RayAxis::Vertical,
                ..
            })
        ));
    }

    #[test]
    fn rejects_too_many_rays() {
        let result = ControllerConfig::default().with_ray_counts(21, 4).validated();
        assert!(result.is_err());
        assert!(ControllerConfig::default().with_ray_counts(20, 20).validated().is_ok());
    }

    #[test]
    fn clamps_non_positive_skin_width() {
        let config = ControllerConfig::default()
            .with_skin_width(Fix::ZERO)
            .validated()
            .unwrap();
        assert_eq!(config.skin_width, MIN_SKIN_WIDTH);

        let config = ControllerConfig::default()
            .with_skin_width(Fix::from_num(-0.5))
            .validated()
            .unwrap();
        assert_eq!(config.skin_width, MIN_SKIN_WIDTH);
    }

    #[test]
    fn clamps_slope_limit() {
        let config = ControllerConfig::default()
            .with_slope_limit(Fix::from_num(120))
            .validated()
            .unwrap();
        assert_eq!(config.slope_limit, Fix::from_num(90));
    }

    #[test]
    fn folds_one_way_platforms_into_platform_mask() {
        let config = ControllerConfig::default()
            .with_platform_mask(LayerMask::layer(0))
            .with_one_way_platform_mask(LayerMask::layer(3))
            .validated()
            .unwrap();
        assert_eq!(config.platform_mask, LayerMask::layer(0) | LayerMask::layer(3));
    }

    #[test]
    fn error_messages() {
        let err = ConfigError::RayCount {
            axis: RayAxis::Vertical,
            count: 1,
        };
        assert_eq!(err.to_string(), "vertical ray count must be between 2 and 20, got 1");
    }
}
