use femdem::damage::{calculate_elemental_damage, EdgeDamageState};
use femdem::proptest::edge_damages;
use matrixcompare::assert_scalar_eq;
use proptest::prelude::*;

#[test]
fn elemental_damage_averages_two_largest_edges() {
    assert_scalar_eq!(calculate_elemental_damage(&[0.1, 0.5, 0.5]), 0.5, comp = float);
    assert_scalar_eq!(calculate_elemental_damage(&[0.9, 0.1, 0.1]), 0.5, comp = float);
    assert_scalar_eq!(calculate_elemental_damage(&[0.1, 0.9, 0.1]), 0.5, comp = float);
    assert_scalar_eq!(calculate_elemental_damage(&[0.2, 0.4, 0.6, 0.8]), 0.7, comp = float);
}

#[test]
fn elemental_damage_of_degenerate_edge_sets() {
    assert_eq!(calculate_elemental_damage(&[0.3]), 0.3);
    assert_eq!(calculate_elemental_damage::<f64>(&[]), 0.0);
}

#[test]
fn trial_state_is_only_converged_on_commit() {
    let mut state = EdgeDamageState::new(3);
    state.set_non_converged(0, 3.5, 0.4);
    state.set_non_converged(1, 3.2, 0.2);
    assert_eq!(state.damages(), &[0.0, 0.0, 0.0]);
    assert_eq!(state.element_damage(), 0.0);

    state.commit();
    assert_eq!(state.damages(), &[0.4, 0.2, 0.0]);
    assert_eq!(state.thresholds(), &[3.5, 3.2, 0.0]);
    assert_scalar_eq!(state.element_damage(), 0.3, comp = float);
    assert_scalar_eq!(state.element_threshold(), 3.35, comp = float);
}

#[test]
fn commit_never_lowers_element_values() {
    let mut state = EdgeDamageState::new(3);
    state.set_element_damage(0.6);
    state.set_element_threshold(10.0);
    state.set_non_converged(0, 3.0, 0.1);
    state.commit();
    assert_eq!(state.element_damage(), 0.6);
    assert_eq!(state.element_threshold(), 10.0);
}

#[test]
fn mapped_element_values_are_imposed_on_pristine_edges() {
    let mut state = EdgeDamageState::new(3);
    state.set_element_damage(0.3);
    state.set_element_threshold(4.0);
    state.initialize_after_mapping();
    assert_eq!(state.damages(), &[0.3, 0.3, 0.3]);
    assert_eq!(state.thresholds(), &[4.0, 4.0, 4.0]);
    assert_eq!(state.non_converged_damages(), &[0.3, 0.3, 0.3]);
    assert_eq!(state.non_converged_thresholds(), &[4.0, 4.0, 4.0]);
}

#[test]
fn mapping_leaves_edges_with_state_untouched() {
    let mut state = EdgeDamageState::new(3);
    state.set_non_converged(1, 3.0, 0.2);
    state.commit();
    state.set_element_damage(0.9);
    state.initialize_after_mapping();
    assert_eq!(state.damages(), &[0.0, 0.2, 0.0]);
}

proptest! {
    #[test]
    fn elemental_damage_is_order_independent(damages in edge_damages(3)) {
        let mut reversed = damages.clone();
        reversed.reverse();
        let mut rotated = damages.clone();
        rotated.rotate_left(1);
        let damage = calculate_elemental_damage(&damages);
        prop_assert_eq!(damage, calculate_elemental_damage(&reversed));
        prop_assert_eq!(damage, calculate_elemental_damage(&rotated));
    }

    #[test]
    fn element_damage_is_monotonic_over_steps(steps in proptest::collection::vec(edge_damages(3), 1..10)) {
        let mut state = EdgeDamageState::new(3);
        let mut previous = state.element_damage();
        for damages in steps {
            for (edge, damage) in damages.into_iter().enumerate() {
                state.set_non_converged(edge, 3.0, damage);
            }
            state.commit();
            prop_assert!(state.element_damage() >= previous);
            prop_assert!(state.element_damage() <= 0.99);
            previous = state.element_damage();
        }
    }
}
