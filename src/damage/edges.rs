//! Per-edge damage state of an element and its reduction to element quantities.
use crate::damage::invariants::tolerance;
use crate::Real;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Reduces per-edge values to a single element value: the average of the two largest entries.
///
/// A single damaged edge therefore only partially weakens the element, while two damaged
/// edges, i.e. a crack running through the element, dominate its response. The result does
/// not depend on the order of the edges. With a single edge its value is returned, and zero
/// for no edges at all.
pub fn calculate_elemental_damage<T: Real>(edge_values: &[T]) -> T {
    let mut largest = edge_values
        .iter()
        .copied()
        .sorted_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    match (largest.next(), largest.next()) {
        (Some(first), Some(second)) => (first + second) / (T::one() + T::one()),
        (Some(first), None) => first,
        _ => T::zero(),
    }
}

/// Converged and trial (non-converged) damage state of the edges of an element.
///
/// Trial values are written while the element is evaluated during nonlinear iterations and
/// only become converged values in [`EdgeDamageState::commit`]. Evaluations always start from
/// the converged values, which keeps the result of an iteration independent of the iterations
/// that preceded it and lets neighbouring elements be evaluated concurrently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeDamageState<T> {
    thresholds: Vec<T>,
    damages: Vec<T>,
    non_converged_thresholds: Vec<T>,
    non_converged_damages: Vec<T>,
    element_threshold: T,
    element_damage: T,
}

impl<T: Real> EdgeDamageState<T> {
    pub fn new(number_of_edges: usize) -> Self {
        Self {
            thresholds: vec![T::zero(); number_of_edges],
            damages: vec![T::zero(); number_of_edges],
            non_converged_thresholds: vec![T::zero(); number_of_edges],
            non_converged_damages: vec![T::zero(); number_of_edges],
            element_threshold: T::zero(),
            element_damage: T::zero(),
        }
    }

    pub fn number_of_edges(&self) -> usize {
        self.thresholds.len()
    }

    /// Converged edge thresholds.
    pub fn thresholds(&self) -> &[T] {
        &self.thresholds
    }

    /// Converged edge damages.
    pub fn damages(&self) -> &[T] {
        &self.damages
    }

    pub fn non_converged_thresholds(&self) -> &[T] {
        &self.non_converged_thresholds
    }

    pub fn non_converged_damages(&self) -> &[T] {
        &self.non_converged_damages
    }

    /// The (monotonically non-decreasing) damage of the element.
    pub fn element_damage(&self) -> T {
        self.element_damage
    }

    /// The (monotonically non-decreasing) stress threshold of the element.
    pub fn element_threshold(&self) -> T {
        self.element_threshold
    }

    /// Overwrites the element damage, e.g. with a value mapped from a previous mesh.
    pub fn set_element_damage(&mut self, damage: T) {
        self.element_damage = damage;
    }

    /// Overwrites the element threshold, e.g. with a value mapped from a previous mesh.
    pub fn set_element_threshold(&mut self, threshold: T) {
        self.element_threshold = threshold;
    }

    pub fn set_non_converged(&mut self, edge: usize, threshold: T, damage: T) {
        self.non_converged_thresholds[edge] = threshold;
        self.non_converged_damages[edge] = damage;
    }

    /// Imposes the element threshold and damage on edges that carry no state yet.
    ///
    /// After remeshing, only the element quantities are transferred to the new mesh, so edges
    /// whose values are uniformly zero inherit them. The trial arrays are reset to the
    /// converged arrays.
    pub fn initialize_after_mapping(&mut self) {
        let sum = |values: &[T]| values.iter().fold(T::zero(), |acc, &v| acc + v);
        if sum(&self.thresholds) < tolerance() {
            let threshold = self.element_threshold;
            self.thresholds.iter_mut().for_each(|t| *t = threshold);
        }
        if sum(&self.damages) < tolerance() {
            let damage = self.element_damage;
            self.damages.iter_mut().for_each(|d| *d = damage);
        }
        self.non_converged_thresholds.clone_from(&self.thresholds);
        self.non_converged_damages.clone_from(&self.damages);
    }

    /// Accepts the trial state as converged.
    ///
    /// The element damage and threshold only ever increase: damage does not heal.
    pub fn commit(&mut self) {
        self.thresholds.clone_from(&self.non_converged_thresholds);
        self.damages.clone_from(&self.non_converged_damages);

        let converged_damage = calculate_elemental_damage(&self.damages);
        if converged_damage > self.element_damage {
            self.element_damage = converged_damage;
        }
        let converged_threshold = calculate_elemental_damage(&self.thresholds);
        if converged_threshold > self.element_threshold {
            self.element_threshold = converged_threshold;
        }
    }
}
