//! The FEM-DEM element: edge-wise damage on top of a small-displacement plane element.
//!
//! An element carries one damage variable per edge. Every edge integrates the damage law with
//! the stress and strain averaged between the element and the neighbour across that edge, and
//! the element damage is the average of the two largest edge damages. Evaluations during
//! nonlinear iterations only write trial (non-converged) edge state; the converged state is
//! advanced in [`FemDemElement::finalize_solution_step`].
use crate::constitutive::{ConstitutiveLaw, ConstitutiveResponse};
use crate::damage::invariants::tolerance;
use crate::damage::{
    calculate_elemental_damage, integrate_stress_damage_mechanics, max_damage, EdgeDamageState, EdgeUpdate,
};
use crate::error::FemDemError;
use crate::properties::{DamageProperties, TangentScheme};
use crate::tangent::{displacement_perturbed_tangent, strain_perturbed_tangent};
use crate::Real;
use itertools::Itertools;
use log::info;
use nalgebra::{Matrix3x6, Matrix6, Vector2, Vector3, Vector6};
use numeric_literals::replace_float_literals;
use std::sync::Arc;

mod kinematics;
mod neighbours;

pub use kinematics::*;
pub use neighbours::*;

/// Element damage at which an element is considered completely fractured and removed.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn deactivation_damage<T: Real>() -> T {
    0.98
}

/// Global quantities of the current solution step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProcessInfo<T: Real> {
    /// Acceleration acting on the whole body, e.g. gravity.
    pub volume_acceleration: Vector2<T>,
}

impl<T: Real> Default for ProcessInfo<T> {
    fn default() -> Self {
        Self {
            volume_acceleration: Vector2::zeros(),
        }
    }
}

/// Element stiffness and residual, both ordered node-wise.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalSystem<T: Real> {
    pub lhs: Matrix6<T>,
    /// External minus internal forces.
    pub rhs: Vector6<T>,
}

impl<T: Real> LocalSystem<T> {
    pub fn zeros() -> Self {
        Self {
            lhs: Matrix6::zeros(),
            rhs: Vector6::zeros(),
        }
    }
}

/// Quantities that can be read from (and partially written to) the integration points.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IntegrationPointVariable {
    Damage,
    StressThreshold,
    /// Predictive (undamaged) stress.
    StressVector,
    StrainVector,
    /// Stress reduced by the element damage.
    IntegratedStressVector,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum IntegrationPointValue<T: Real> {
    Scalar(T),
    Vector(Vector3<T>),
}

/// Result of the damage integration at a single integration point.
#[allow(non_snake_case)]
struct PointEvaluation<T: Real> {
    weight: T,
    B: Matrix3x6<T>,
    strain: Vector3<T>,
    response: ConstitutiveResponse<T>,
    edge_updates: Vec<EdgeUpdate<T>>,
    damage: T,
}

impl<T: Real> PointEvaluation<T> {
    fn integrated_stress(&self) -> Vector3<T> {
        self.response.stress * (T::one() - self.damage)
    }

    fn is_damaging(&self) -> bool {
        self.edge_updates.iter().any(|update| update.is_damaging)
    }
}

fn damage_of_updates<T: Real>(updates: &[EdgeUpdate<T>]) -> T {
    let damages = updates.iter().map(|update| update.damage).collect_vec();
    calculate_elemental_damage(&damages)
}

#[derive(Debug, Clone)]
pub struct FemDemElement<T: Real, K> {
    kinematics: K,
    properties: Arc<DamageProperties<T>>,
    neighbours: Option<Vec<Option<usize>>>,
    edges: EdgeDamageState<T>,
    state: VoigtState<T>,
    active: bool,
}

impl<T, K> FemDemElement<T, K>
where
    T: Real,
    K: ElementKinematics<T>,
{
    pub fn new(kinematics: K, properties: Arc<DamageProperties<T>>) -> Self {
        let edges = EdgeDamageState::new(kinematics.number_of_edges());
        Self {
            kinematics,
            properties,
            neighbours: None,
            edges,
            state: VoigtState::default(),
            active: true,
        }
    }

    pub fn kinematics(&self) -> &K {
        &self.kinematics
    }

    pub fn properties(&self) -> &DamageProperties<T> {
        &self.properties
    }

    pub fn edges(&self) -> &EdgeDamageState<T> {
        &self.edges
    }

    /// The stress and strain published to neighbouring elements.
    pub fn state(&self) -> &VoigtState<T> {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn damage(&self) -> T {
        self.edges.element_damage()
    }

    pub fn threshold(&self) -> T {
        self.edges.element_threshold()
    }

    /// Sets the neighbour across every edge. `None` marks a boundary edge.
    pub fn set_neighbours(&mut self, neighbours: Vec<Option<usize>>) -> Result<(), FemDemError> {
        if neighbours.len() != self.edges.number_of_edges() {
            return Err(FemDemError::Precondition(format!(
                "expected {} neighbours (one per edge), got {}",
                self.edges.number_of_edges(),
                neighbours.len()
            )));
        }
        self.neighbours = Some(neighbours);
        Ok(())
    }

    pub fn neighbours(&self) -> Result<&[Option<usize>], FemDemError> {
        self.neighbours
            .as_deref()
            .ok_or_else(|| FemDemError::Precondition("neighbours not calculated".to_string()))
    }

    pub fn initialize_solution_step(&mut self) {
        self.edges.initialize_after_mapping();
    }

    /// Computes the predictive stress and strain that neighbours read during the next
    /// evaluation of the local systems.
    pub fn initialize_non_linear_iteration<L>(&mut self, law: &L, displacements: &Vector6<T>) -> Result<(), FemDemError>
    where
        L: ConstitutiveLaw<T> + ?Sized,
    {
        let n_points = self.kinematics.num_integration_points();
        for point in 0..n_points {
            let strain = self.kinematics.strain(point, displacements)?;
            let stress = law.compute_stress(&strain);
            self.state = VoigtState::new(stress, strain);
        }
        Ok(())
    }

    /// Integrates the damage of every edge for the given own state, starting from the
    /// converged edge values.
    fn integrate_edges<N>(&self, own: &VoigtState<T>, states: &N) -> Result<Vec<EdgeUpdate<T>>, FemDemError>
    where
        N: NeighbourStates<T> + ?Sized,
    {
        let length = self.kinematics.characteristic_length();
        let thresholds = self.edges.thresholds();
        let damages = self.edges.damages();
        self.neighbours()?
            .iter()
            .enumerate()
            .map(|(edge, &neighbour)| {
                let average = edge_average(own, neighbour, states)?;
                integrate_stress_damage_mechanics(
                    &self.properties,
                    thresholds[edge],
                    damages[edge],
                    &average.strain,
                    &average.stress,
                    length,
                )
            })
            .collect()
    }

    #[allow(non_snake_case)]
    fn evaluate_point<L, N>(
        &self,
        law: &L,
        point: usize,
        displacements: &Vector6<T>,
        states: &N,
    ) -> Result<PointEvaluation<T>, FemDemError>
    where
        L: ConstitutiveLaw<T> + ?Sized,
        N: NeighbourStates<T> + ?Sized,
    {
        let B = self.kinematics.strain_displacement_matrix(point)?;
        let weight = self.kinematics.integration_weight(point)?;
        let strain = B * displacements;
        let response = law.compute_response(&strain);
        let edge_updates = self.integrate_edges(&VoigtState::new(response.stress, strain), states)?;
        let damage = damage_of_updates(&edge_updates);
        Ok(PointEvaluation {
            weight,
            B,
            strain,
            response,
            edge_updates,
            damage,
        })
    }

    /// Damaged stress for the given strain, integrated on scratch copies of the edge state.
    fn damaged_stress<L, N>(&self, law: &L, strain: &Vector3<T>, states: &N) -> Result<Vector3<T>, FemDemError>
    where
        L: ConstitutiveLaw<T> + ?Sized,
        N: NeighbourStates<T> + ?Sized,
    {
        let stress = law.compute_stress(strain);
        let updates = self.integrate_edges(&VoigtState::new(stress, *strain), states)?;
        Ok(stress * (T::one() - damage_of_updates(&updates)))
    }

    fn point_internal_force<L, N>(
        &self,
        law: &L,
        point: usize,
        displacements: &Vector6<T>,
        states: &N,
    ) -> Result<Vector6<T>, FemDemError>
    where
        L: ConstitutiveLaw<T> + ?Sized,
        N: NeighbourStates<T> + ?Sized,
    {
        let evaluation = self.evaluate_point(law, point, displacements, states)?;
        Ok(evaluation.B.transpose() * evaluation.integrated_stress() * evaluation.weight)
    }

    fn body_force(&self, point: usize, weight: T, process_info: &ProcessInfo<T>) -> Vector6<T> {
        let n = self.kinematics.shape_functions(point);
        let force_density = process_info.volume_acceleration * self.properties.density();
        let mut f = Vector6::zeros();
        for j in 0..3 {
            for k in 0..2 {
                f[2 * j + k] = weight * n[j] * force_density[k];
            }
        }
        f
    }

    /// Stiffness contribution of an evaluated integration point.
    ///
    /// The secant operator $(1 - d) \vec C$ is used unless an edge is damaging under a
    /// non-vanishing strain, in which case the configured tangent scheme is applied.
    #[allow(non_snake_case)]
    fn point_stiffness<L, N>(
        &self,
        law: &L,
        point: usize,
        displacements: &Vector6<T>,
        states: &N,
        evaluation: &PointEvaluation<T>,
    ) -> Result<Matrix6<T>, FemDemError>
    where
        L: ConstitutiveLaw<T> + ?Sized,
        N: NeighbourStates<T> + ?Sized,
    {
        let B = &evaluation.B;
        let w = evaluation.weight;
        let secant = || B.transpose() * evaluation.response.tangent * B * (w * (T::one() - evaluation.damage));

        let strain_sum = evaluation.strain.sum();
        if !evaluation.is_damaging() || strain_sum.abs() <= tolerance() {
            return Ok(secant());
        }

        match self.properties.tangent {
            TangentScheme::Secant => Ok(secant()),
            TangentScheme::StrainPerturbation(scheme) => {
                let tangent = strain_perturbed_tangent(
                    scheme,
                    &evaluation.strain,
                    &evaluation.integrated_stress(),
                    |strain| self.damaged_stress(law, strain, states),
                )?;
                Ok(B.transpose() * tangent * B * w)
            }
            TangentScheme::DisplacementPerturbation { seed } => {
                let f_int = B.transpose() * evaluation.integrated_stress() * w;
                displacement_perturbed_tangent(displacements, &f_int, seed, |u| {
                    self.point_internal_force(law, point, u, states)
                })
            }
        }
    }

    /// Computes the local system without touching the trial edge state.
    ///
    /// Also returns the edge updates of the last integration point.
    fn compute_local_system<L, N>(
        &self,
        law: &L,
        displacements: &Vector6<T>,
        states: &N,
        process_info: &ProcessInfo<T>,
        compute_lhs: bool,
    ) -> Result<(LocalSystem<T>, Vec<EdgeUpdate<T>>), FemDemError>
    where
        L: ConstitutiveLaw<T> + ?Sized,
        N: NeighbourStates<T> + ?Sized,
    {
        let mut system = LocalSystem::zeros();
        let mut updates = Vec::new();
        for point in 0..self.kinematics.num_integration_points() {
            let evaluation = self.evaluate_point(law, point, displacements, states)?;
            if compute_lhs {
                system.lhs += self.point_stiffness(law, point, displacements, states, &evaluation)?;
            }
            system.rhs += self.body_force(point, evaluation.weight, process_info);
            system.rhs -= evaluation.B.transpose() * evaluation.integrated_stress() * evaluation.weight;
            updates = evaluation.edge_updates;
        }
        Ok((system, updates))
    }

    /// Computes stiffness and residual, and records the resulting trial edge state.
    ///
    /// `states` holds the states published by all elements in
    /// [`initialize_non_linear_iteration`](Self::initialize_non_linear_iteration). Inactive
    /// elements contribute nothing.
    pub fn calculate_local_system<L, N>(
        &mut self,
        law: &L,
        displacements: &Vector6<T>,
        states: &N,
        process_info: &ProcessInfo<T>,
    ) -> Result<LocalSystem<T>, FemDemError>
    where
        L: ConstitutiveLaw<T> + ?Sized,
        N: NeighbourStates<T> + ?Sized,
    {
        if !self.active {
            return Ok(LocalSystem::zeros());
        }
        let (system, updates) = self.compute_local_system(law, displacements, states, process_info, true)?;
        for (edge, update) in updates.iter().enumerate() {
            self.edges.set_non_converged(edge, update.threshold, update.damage);
        }
        Ok(system)
    }

    pub fn calculate_left_hand_side<L, N>(
        &self,
        law: &L,
        displacements: &Vector6<T>,
        states: &N,
        process_info: &ProcessInfo<T>,
    ) -> Result<Matrix6<T>, FemDemError>
    where
        L: ConstitutiveLaw<T> + ?Sized,
        N: NeighbourStates<T> + ?Sized,
    {
        if !self.active {
            return Ok(Matrix6::zeros());
        }
        let (system, _) = self.compute_local_system(law, displacements, states, process_info, true)?;
        Ok(system.lhs)
    }

    pub fn calculate_right_hand_side<L, N>(
        &self,
        law: &L,
        displacements: &Vector6<T>,
        states: &N,
        process_info: &ProcessInfo<T>,
    ) -> Result<Vector6<T>, FemDemError>
    where
        L: ConstitutiveLaw<T> + ?Sized,
        N: NeighbourStates<T> + ?Sized,
    {
        if !self.active {
            return Ok(Vector6::zeros());
        }
        let (system, _) = self.compute_local_system(law, displacements, states, process_info, false)?;
        Ok(system.rhs)
    }

    /// Mass matrix of the linear triangle, either consistent or row-lumped.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn calculate_mass_matrix(&self, lumped: bool) -> Result<Matrix6<T>, FemDemError> {
        let mass = self.properties.density() * self.kinematics.measure()?;
        let mut matrix = Matrix6::zeros();
        if lumped {
            matrix.fill_diagonal(mass / 3.0);
        } else {
            for i in 0..3 {
                for j in 0..3 {
                    let m_ij = if i == j { mass / 6.0 } else { mass / 12.0 };
                    for k in 0..2 {
                        matrix[(2 * i + k, 2 * j + k)] = m_ij;
                    }
                }
            }
        }
        Ok(matrix)
    }

    /// Accepts the trial state of the edges and deactivates completely damaged elements.
    pub fn finalize_solution_step(&mut self) {
        self.edges.commit();
        if self.active && self.edges.element_damage() >= deactivation_damage() {
            info!(
                "Deactivating fractured element (damage {})",
                self.edges.element_damage()
            );
            self.active = false;
        }
    }

    pub fn value_on_integration_points(&self, variable: IntegrationPointVariable) -> Vec<IntegrationPointValue<T>> {
        use IntegrationPointValue::{Scalar, Vector};
        use IntegrationPointVariable::*;
        let value = match variable {
            Damage => Scalar(self.edges.element_damage()),
            StressThreshold => Scalar(self.edges.element_threshold()),
            StressVector => Vector(self.state.stress),
            StrainVector => Vector(self.state.strain),
            IntegratedStressVector => Vector(self.state.stress * (T::one() - self.edges.element_damage())),
        };
        vec![value; self.kinematics.num_integration_points()]
    }

    /// Overwrites integration point values, e.g. after mapping from another mesh.
    ///
    /// The integrated stress is derived from the other quantities and cannot be set. Damage
    /// must lie in `[0, 0.99]` and thresholds must not be negative.
    pub fn set_value_on_integration_points(
        &mut self,
        variable: IntegrationPointVariable,
        values: &[IntegrationPointValue<T>],
    ) -> Result<(), FemDemError> {
        use IntegrationPointValue::{Scalar, Vector};
        use IntegrationPointVariable::*;
        let value = values
            .last()
            .ok_or_else(|| FemDemError::Configuration(format!("no values given for {variable:?}")))?;
        match (variable, *value) {
            (Damage, Scalar(damage)) => {
                if !(damage >= T::zero() && damage <= max_damage()) {
                    return Err(FemDemError::Configuration(format!(
                        "damage {damage} is outside of [0, {}]",
                        max_damage::<T>()
                    )));
                }
                self.edges.set_element_damage(damage)
            }
            (StressThreshold, Scalar(threshold)) => {
                if !(threshold >= T::zero()) {
                    return Err(FemDemError::Configuration(format!(
                        "stress threshold {threshold} must not be negative"
                    )));
                }
                self.edges.set_element_threshold(threshold)
            }
            (StressVector, Vector(stress)) => self.state.stress = stress,
            (StrainVector, Vector(strain)) => self.state.strain = strain,
            (IntegratedStressVector, _) => {
                return Err(FemDemError::Configuration(
                    "the integrated stress vector cannot be set".to_string(),
                ))
            }
            (variable, value) => {
                return Err(FemDemError::Configuration(format!(
                    "value {value:?} does not match the type of {variable:?}"
                )))
            }
        }
        Ok(())
    }
}
