use femdem::damage::{exponential_damage, max_damage};
use matrixcompare::assert_scalar_eq;
use proptest::prelude::*;

#[test]
fn no_damage_at_initial_threshold() {
    assert_eq!(exponential_damage(2.0, 10.0, 10.0), 0.0);
}

#[test]
fn exponential_damage_matches_closed_form() {
    let expected = 1.0 - 0.5 * (2.0 * (1.0 - 2.0f64)).exp();
    assert_scalar_eq!(exponential_damage(2.0, 20.0, 10.0), expected, comp = float);
}

#[test]
fn damage_is_clamped_from_above() {
    assert_eq!(exponential_damage(2.0, 1e6, 10.0), 0.99);
    assert_eq!(max_damage::<f64>(), 0.99);
}

#[test]
fn non_positive_uniaxial_stress_gives_no_damage() {
    assert_eq!(exponential_damage(2.0, 0.0, 10.0), 0.0);
    assert_eq!(exponential_damage(2.0, -5.0, 10.0), 0.0);
}

proptest! {
    #[test]
    fn damage_stays_within_bounds(a in 1e-6..10.0, uniaxial in -100.0..1e4, threshold in 1e-3..100.0) {
        let damage = exponential_damage(a, uniaxial, threshold);
        prop_assert!(damage >= 0.0);
        prop_assert!(damage <= 0.99);
    }

    #[test]
    fn damage_increases_with_uniaxial_stress(a in 1e-3..1.0, threshold in 1.0..10.0, factor in 1.0..10.0) {
        let lower = exponential_damage(a, threshold * factor, threshold);
        let higher = exponential_damage(a, threshold * factor * 1.1, threshold);
        prop_assert!(higher >= lower);
    }
}
