//! Slope speed multiplier curve.

use crate::config::ConfigError;
use crate::math::Fix;

/// One control point of a [`SlopeSpeedCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveKey {
    /// Signed slope angle in degrees (negative = downhill, positive = uphill).
    pub angle: Fix,
    /// Speed multiplier at this angle.
    pub multiplier: Fix,
}

impl CurveKey {
    /// Create a key.
    pub const fn new(angle: Fix, multiplier: Fix) -> Self {
        Self { angle, multiplier }
    }
}

/// Maps a signed slope angle to a horizontal speed multiplier.
///
/// Piecewise-linear between keys, constant past the first and last key. The default
/// curve speeds characters up going downhill and slows them to a stop at vertical:
/// `-90° → 1.5`, `0° → 1.0`, `90° → 0.0`.
///
/// # Example
///
/// ```rust
/// use fp_character_controller::prelude::*;
///
/// let curve = SlopeSpeedCurve::default();
/// assert_eq!(curve.evaluate(Fix::from_num(45)), Fix::from_num(0.5));
/// assert_eq!(curve.evaluate(Fix::from_num(-45)), Fix::from_num(1.25));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<CurveKey>", into = "Vec<CurveKey>"))]
pub struct SlopeSpeedCurve {
    keys: Vec<CurveKey>,
}

impl Default for SlopeSpeedCurve {
    fn default() -> Self {
        Self {
            keys: vec![
                CurveKey::new(Fix::lit("-90"), Fix::lit("1.5")),
                CurveKey::new(Fix::ZERO, Fix::ONE),
                CurveKey::new(Fix::lit("90"), Fix::ZERO),
            ],
        }
    }
}

impl SlopeSpeedCurve {
    /// Build a curve from `(angle, multiplier)` keys in any order.
    pub fn new(keys: impl IntoIterator<Item = CurveKey>) -> Result<Self, ConfigError> {
        let mut keys: Vec<CurveKey> = keys.into_iter().collect();
        if keys.is_empty() {
            return Err(ConfigError::EmptySlopeCurve);
        }
        keys.sort_by_key(|key| key.angle);
        if let Some(pair) = keys.windows(2).find(|pair| pair[0].angle == pair[1].angle) {
            return Err(ConfigError::DuplicateCurveKey(pair[0].angle));
        }
        Ok(Self { keys })
    }

    /// A curve that returns `multiplier` for every angle.
    pub fn constant(multiplier: Fix) -> Self {
        Self {
            keys: vec![CurveKey::new(Fix::ZERO, multiplier)],
        }
    }

    /// Keys in ascending angle order.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Sample the multiplier at `angle` degrees.
    pub fn evaluate(&self, angle: Fix) -> Fix {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return Fix::ONE;
        };
        if angle <= first.angle {
            return first.multiplier;
        }
        if angle >= last.angle {
            return last.multiplier;
        }

        // First key strictly above `angle`; its predecessor is at or below it.
        let upper = self.keys.partition_point(|key| key.angle <= angle);
        let (a, b) = (self.keys[upper - 1], self.keys[upper]);
        let t = (angle - a.angle) / (b.angle - a.angle);
        a.multiplier + (b.multiplier - a.multiplier) * t
    }
}

impl TryFrom<Vec<CurveKey>> for SlopeSpeedCurve {
    type Error = ConfigError;

    fn try_from(keys: Vec<CurveKey>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<SlopeSpeedCurve> for Vec<CurveKey> {
    fn from(curve: SlopeSpeedCurve) -> Self {
        curve.keys
    }
}
