//! Configuration serialization tests.

#![cfg(feature = "serde")]

use fp_character_controller::prelude::*;

#[test]
fn config_round_trips_through_json() {
    let config = ControllerConfig::default()
        .with_skin_width(Fix::from_num(0.05))
        .with_platform_mask(LayerMask::layer(0) | LayerMask::layer(3))
        .with_one_way_platform_mask(LayerMask::layer(3))
        .with_slope_limit(Fix::from_num(42))
        .with_ray_counts(6, 5)
        .with_slope_speed_multiplier(SlopeSpeedCurve::constant(Fix::from_num(0.75)));

    let json = serde_json::to_string(&config).unwrap();
    let restored: ControllerConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, config);
}

#[test]
fn missing_fields_use_defaults() {
    let restored: ControllerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(restored, ControllerConfig::default());
}

#[test]
fn duplicate_curve_keys_are_rejected() {
    let mut json = serde_json::to_value(SlopeSpeedCurve::default()).unwrap();
    let keys = json.as_array_mut().unwrap();
    let first = keys[0].clone();
    keys.push(first);

    assert!(serde_json::from_value::<SlopeSpeedCurve>(json).is_err());
}

#[test]
fn empty_curve_is_rejected() {
    assert!(serde_json::from_str::<SlopeSpeedCurve>("[]").is_err());
}
