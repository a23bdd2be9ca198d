//! Deterministic fixed-point math.
//!
//! All collision resolution runs on [`Fix`] (`I48F16` from the `fixed` crate) and
//! [`FixVec2`]. The `fixed` crate has no trigonometry, so this module provides
//! integer-only CORDIC routines for the handful of functions the controller needs:
//! tangent of an angle in degrees, two-argument arctangent and the unsigned angle
//! between two vectors. Intermediate values are carried in Q32.32 so the Q48.16 results
//! are accurate to a few ulps. Nothing here touches floating point, so results are
//! bit-identical on every platform.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use bevy::math::Vec2;
use fixed::types::I48F16;

/// Fixed-point scalar used throughout the controller.
///
/// 48 integer bits and 16 fractional bits: a range of roughly ±1.4e14 with a
/// resolution of ~0.000015 world units.
pub type Fix = I48F16;

/// π in Q32.32.
const PI_Q32: i64 = 13_493_037_705;

/// CORDIC gain compensation `K = Π 1/sqrt(1 + 2^-2i)` in Q32.32.
const CORDIC_K_Q32: i64 = 2_608_131_496;

/// `atan(2^-i)` in Q32.32 radians.
const ATAN_TABLE_Q32: [i64; 32] = [
    3_373_259_426,
    1_991_351_318,
    1_052_175_346,
    534_100_635,
    268_086_748,
    134_174_063,
    67_103_403,
    33_553_749,
    16_777_131,
    8_388_597,
    4_194_303,
    2_097_152,
    1_048_576,
    524_288,
    262_144,
    131_072,
    65_536,
    32_768,
    16_384,
    8_192,
    4_096,
    2_048,
    1_024,
    512,
    256,
    128,
    64,
    32,
    16,
    8,
    4,
    2,
];

/// 2D vector of [`Fix`] components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixVec2 {
    /// Horizontal component.
    pub x: Fix,
    /// Vertical component.
    pub y: Fix,
}

impl FixVec2 {
    /// `(0, 0)`.
    pub const ZERO: Self = Self::new(Fix::ZERO, Fix::ZERO);
    /// `(1, 1)`.
    pub const ONE: Self = Self::new(Fix::ONE, Fix::ONE);
    /// World right, `(1, 0)`.
    pub const X: Self = Self::new(Fix::ONE, Fix::ZERO);
    /// World up, `(0, 1)`.
    pub const Y: Self = Self::new(Fix::ZERO, Fix::ONE);
    /// World left, `(-1, 0)`.
    pub const NEG_X: Self = Self::new(Fix::NEG_ONE, Fix::ZERO);
    /// World down, `(0, -1)`.
    pub const NEG_Y: Self = Self::new(Fix::ZERO, Fix::NEG_ONE);

    /// Create a vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fix, y: Fix) -> Self {
        Self { x, y }
    }

    /// Create a vector from any numeric components `fixed` can convert exactly
    /// (integers, or float literals that are rounded once at construction).
    pub fn from_num<T: fixed::traits::ToFixed>(x: T, y: T) -> Self {
        Self::new(Fix::from_num(x), Fix::from_num(y))
    }

    /// Convert a Bevy `Vec2`. Non-finite components become zero.
    ///
    /// This is the one lossy entry point; keep it out of the simulation path.
    pub fn from_vec2(v: Vec2) -> Self {
        Self::new(
            Fix::checked_from_num(v.x).unwrap_or(Fix::ZERO),
            Fix::checked_from_num(v.y).unwrap_or(Fix::ZERO),
        )
    }

    /// Convert to a Bevy `Vec2` for rendering and engine interop.
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x.to_num::<f32>(), self.y.to_num::<f32>())
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, rhs: Self) -> Fix {
        self.x * rhs.x + self.y * rhs.y
    }

    /// 2D cross product (z component of the 3D cross product).
    #[inline]
    pub fn perp_dot(self, rhs: Self) -> Fix {
        self.x * rhs.y - self.y * rhs.x
    }

    /// Perpendicular vector, rotated 90° counter-clockwise.
    #[inline]
    pub fn perp(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Component-wise absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Component-wise product.
    #[inline]
    pub fn mul_elements(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, rhs: Self) -> Self {
        Self::new(self.x.min(rhs.x), self.y.min(rhs.y))
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, rhs: Self) -> Self {
        Self::new(self.x.max(rhs.x), self.y.max(rhs.y))
    }

    /// Euclidean length.
    ///
    /// Computed from the raw bits in 128-bit integers so neither squaring nor the
    /// root loses precision to the 16-bit fraction.
    pub fn length(self) -> Fix {
        let x = i128::from(self.x.to_bits());
        let y = i128::from(self.y.to_bits());
        // (x² + y²) is Q32.32, its root is Q16.16 raw bits again.
        let root = isqrt((x * x + y * y) as u128);
        Fix::from_bits(i64::try_from(root).unwrap_or(i64::MAX))
    }

    /// Unit vector in the same direction, or zero for a zero-length vector.
    pub fn normalize_or_zero(self) -> Self {
        let length = self.length();
        if length == Fix::ZERO {
            return Self::ZERO;
        }
        match (self.x.checked_div(length), self.y.checked_div(length)) {
            (Some(x), Some(y)) => Self::new(x, y),
            _ => Self::ZERO,
        }
    }

    /// Divide both components, returning `None` on division by zero or overflow.
    pub fn checked_div(self, rhs: Fix) -> Option<Self> {
        Some(Self::new(self.x.checked_div(rhs)?, self.y.checked_div(rhs)?))
    }
}

impl fmt::Display for FixVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for FixVec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for FixVec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for FixVec2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for FixVec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for FixVec2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<Fix> for FixVec2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Fix) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<Fix> for FixVec2 {
    #[inline]
    fn mul_assign(&mut self, rhs: Fix) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<Fix> for FixVec2 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Fix) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

/// Integer square root (floor) of a 128-bit value.
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // Start above the root so Newton's iteration decreases monotonically.
    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Square root of a non-negative scalar. Negative input yields zero.
pub fn sqrt(value: Fix) -> Fix {
    if value <= Fix::ZERO {
        return Fix::ZERO;
    }
    let raw = u128::from(value.to_bits().unsigned_abs()) << 16;
    Fix::from_bits(i64::try_from(isqrt(raw)).unwrap_or(i64::MAX))
}

/// Divide rounding half away from zero. `den` must be positive.
fn div_round(num: i128, den: i128) -> i128 {
    if num >= 0 {
        (num + den / 2) / den
    } else {
        (num - den / 2) / den
    }
}

/// Degrees (Q16.16) to radians (Q32.32).
fn deg_to_rad_q32(degrees: Fix) -> i64 {
    let rad = div_round(
        i128::from(degrees.to_bits()) * i128::from(PI_Q32),
        180 << 16,
    );
    i64::try_from(rad).unwrap_or(if rad < 0 { i64::MIN } else { i64::MAX })
}

/// Radians (Q32.32) to degrees (Q16.16).
fn rad_q32_to_deg(radians: i64) -> Fix {
    let deg = div_round(i128::from(radians) * (180 << 16), i128::from(PI_Q32));
    Fix::from_bits(i64::try_from(deg).unwrap_or(if deg < 0 { i64::MIN } else { i64::MAX }))
}

/// Convert degrees to radians.
pub fn deg_to_rad(degrees: Fix) -> Fix {
    Fix::from_bits(deg_to_rad_q32(degrees) >> 16)
}

/// Convert radians to degrees.
pub fn rad_to_deg(radians: Fix) -> Fix {
    rad_q32_to_deg(radians.to_bits() << 16)
}

/// CORDIC rotation mode. `theta` must be within ±π/2 (Q32.32).
/// Returns `(sin, cos)` in Q32.32.
fn cordic_sin_cos(theta: i64) -> (i64, i64) {
    let mut x = CORDIC_K_Q32;
    let mut y = 0i64;
    let mut z = theta;
    for (i, &step) in ATAN_TABLE_Q32.iter().enumerate() {
        let (dx, dy) = (y >> i, x >> i);
        if z >= 0 {
            x -= dx;
            y += dy;
            z -= step;
        } else {
            x += dx;
            y -= dy;
            z += step;
        }
    }
    (y, x)
}

/// CORDIC vectoring mode. Requires `x > 0`; returns `atan(y / x)` in Q32.32.
fn cordic_atan(mut x: i64, mut y: i64) -> i64 {
    let mut z = 0i64;
    for (i, &step) in ATAN_TABLE_Q32.iter().enumerate() {
        let (dx, dy) = (y >> i, x >> i);
        if y > 0 {
            x += dx;
            y -= dy;
            z += step;
        } else {
            x -= dx;
            y += dy;
            z -= step;
        }
    }
    z
}

/// Tangent of an angle given in degrees.
///
/// Saturates to `Fix::MAX` / `Fix::MIN` at ±90°.
pub fn tan_deg(degrees: Fix) -> Fix {
    let half_turn = Fix::lit("180");
    let mut reduced = degrees.rem_euclid(half_turn);
    if reduced > Fix::lit("90") {
        reduced -= half_turn;
    }
    if reduced == Fix::ZERO {
        return Fix::ZERO;
    }
    if reduced == Fix::lit("90") {
        return Fix::MAX;
    }

    // Odd function: evaluate on the magnitude so tan(-a) == -tan(a) bit for bit.
    let (sin, cos) = cordic_sin_cos(deg_to_rad_q32(reduced.abs()));
    let magnitude = if cos <= 0 {
        Fix::MAX
    } else {
        let tan = (i128::from(sin) << 16) / i128::from(cos);
        Fix::from_bits(i64::try_from(tan).unwrap_or(i64::MAX))
    };
    if reduced < Fix::ZERO {
        -magnitude
    } else {
        magnitude
    }
}

/// Four-quadrant arctangent of `y / x`, in degrees within (-180, 180].
///
/// Axis-aligned inputs return exact results (0, ±90, 180).
pub fn atan2_deg(y: Fix, x: Fix) -> Fix {
    if y == Fix::ZERO {
        return if x < Fix::ZERO {
            Fix::lit("180")
        } else {
            Fix::ZERO
        };
    }
    if x == Fix::ZERO {
        return if y > Fix::ZERO {
            Fix::lit("90")
        } else {
            Fix::lit("-90")
        };
    }

    // atan2 is scale invariant: move the larger magnitude to bit 59 so the CORDIC
    // iterations keep every significant bit without overflowing.
    let (mut xr, mut yr) = (x.to_bits(), y.to_bits());
    let magnitude = xr.unsigned_abs().max(yr.unsigned_abs());
    let shift = magnitude.leading_zeros() as i32 - 4;
    if shift > 0 {
        xr <<= shift;
        yr <<= shift;
    } else if shift < 0 {
        xr >>= -shift;
        yr >>= -shift;
    }

    let radians = if xr > 0 {
        cordic_atan(xr, yr)
    } else {
        let base = cordic_atan(-xr, yr);
        if yr > 0 {
            PI_Q32 - base
        } else {
            -PI_Q32 - base
        }
    };
    rad_q32_to_deg(radians)
}

/// Unsigned angle between two vectors in degrees, within [0, 180].
///
/// Equivalent to `acos(a·b / |a||b|)` but computed as `atan2(|a×b|, a·b)`, which is
/// well conditioned near 0° and 180°.
pub fn angle_between(a: FixVec2, b: FixVec2) -> Fix {
    atan2_deg(a.perp_dot(b).abs(), a.dot(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Fix, b: f64, tolerance: f64) -> bool {
        (a.to_num::<f64>() - b).abs() <= tolerance
    }

    #[test]
    fn tan_matches_reference_values() {
        for degrees in [1, 10, 20, 30, 45, 60, 75, 89] {
            let expected = (f64::from(degrees)).to_radians().tan();
            let actual = tan_deg(Fix::from_num(degrees));
            assert!(
                close(actual, expected, expected.abs() * 1e-3 + 1e-4),
                "tan({degrees}) = {actual}, expected {expected}"
            );
        }
    }

    #[test]
    fn tan_is_odd_and_periodic() {
        let a = tan_deg(Fix::from_num(35));
        assert_eq!(tan_deg(Fix::from_num(-35)), -a);
        assert_eq!(tan_deg(Fix::from_num(215)), a);
        assert_eq!(tan_deg(Fix::ZERO), Fix::ZERO);
        assert_eq!(tan_deg(Fix::from_num(90)), Fix::MAX);
    }

    #[test]
    fn atan2_axis_cases_are_exact() {
        let one = Fix::ONE;
        assert_eq!(atan2_deg(Fix::ZERO, one), Fix::ZERO);
        assert_eq!(atan2_deg(one, Fix::ZERO), Fix::from_num(90));
        assert_eq!(atan2_deg(-one, Fix::ZERO), Fix::from_num(-90));
        assert_eq!(atan2_deg(Fix::ZERO, -one), Fix::from_num(180));
    }

    #[test]
    fn atan2_all_quadrants() {
        let cases = [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0), (0.5, 3.0), (-7.0, 2.0)];
        for (y, x) in cases {
            let expected = f64::atan2(y, x).to_degrees();
            let actual = atan2_deg(Fix::from_num(y), Fix::from_num(x));
            assert!(close(actual, expected, 1e-3), "atan2({y}, {x}) = {actual}, expected {expected}");
        }
    }

    #[test]
    fn angle_between_normal_and_up() {
        assert_eq!(angle_between(FixVec2::Y, FixVec2::Y), Fix::ZERO);
        assert_eq!(angle_between(FixVec2::NEG_X, FixVec2::Y), Fix::from_num(90));
        assert_eq!(angle_between(FixVec2::NEG_Y, FixVec2::Y), Fix::from_num(180));

        // Normal of a 30° ramp rising to the right.
        let normal = FixVec2::from_num(-0.5, 0.866_025_4);
        assert!(close(angle_between(normal, FixVec2::Y), 30.0, 2e-3));
    }

    #[test]
    fn degree_radian_conversion() {
        assert!(close(deg_to_rad(Fix::from_num(180)), std::f64::consts::PI, 1e-4));
        assert!(close(rad_to_deg(Fix::from_num(std::f64::consts::FRAC_PI_2)), 90.0, 1e-3));
    }

    #[test]
    fn length_and_normalize() {
        let v = FixVec2::from_num(3, 4);
        assert_eq!(v.length(), Fix::from_num(5));
        let n = v.normalize_or_zero();
        assert!(close(n.x, 0.6, 1e-4));
        assert!(close(n.y, 0.8, 1e-4));
        assert_eq!(FixVec2::ZERO.normalize_or_zero(), FixVec2::ZERO);
    }

    #[test]
    fn sqrt_of_scalars() {
        assert_eq!(sqrt(Fix::from_num(16)), Fix::from_num(4));
        assert!(close(sqrt(Fix::from_num(2)), std::f64::consts::SQRT_2, 1e-4));
        assert_eq!(sqrt(Fix::from_num(-1)), Fix::ZERO);
    }

    #[test]
    fn vec2_conversion_ignores_non_finite() {
        let v = FixVec2::from_vec2(Vec2::new(f32::NAN, 2.5));
        assert_eq!(v, FixVec2::new(Fix::ZERO, Fix::from_num(2.5)));
        assert_eq!(v.to_vec2(), Vec2::new(0.0, 2.5));
    }
}
