//! Finite-difference estimators of the tangent operator of the damaged material.
//!
//! Once softening initiates, the secant operator $(1 - d) \vec C$ is no longer consistent
//! with the stress update, and Newton iterations stall or diverge. The estimators in this
//! module differentiate the full stress (or force) update numerically instead.
//!
//! Both estimators are pure functions of their input: the function being differentiated
//! receives its perturbed argument by reference and is expected to evaluate into local state
//! only.
use crate::damage::invariants::tolerance;
use crate::properties::FiniteDifference;
use crate::Real;
use nalgebra::{SMatrix, SVector};
use numeric_literals::replace_float_literals;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Step size used to perturb component `component` of `strain`.
///
/// The step balances truncation and round-off error:
/// $h = \max(10^{-5} |\epsilon_i|, 10^{-10} \max_j |\epsilon_j|, \sqrt{\text{tol}} (1 + \max_j |\epsilon_j|))$,
/// where the smallest non-trivial scale $\min_j |\epsilon_j|$ replaces $|\epsilon_i|$ for
/// vanishing components.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn perturbation_step<T: Real, const N: usize>(strain: &SVector<T, N>, component: usize) -> T {
    let relative = if strain[component].abs() > tolerance() {
        1.0e-5 * strain[component].abs()
    } else {
        1.0e-5 * strain.amin()
    };
    let max_component = strain.amax();
    let step = relative.max(1.0e-10 * max_component);
    step.max(tolerance::<T>().sqrt() * (1.0 + max_component))
}

/// Approximates the Jacobian of `stress_update` at `strain` column by column.
///
/// `stress` must be the value of `stress_update` at `strain`; it is reused by the forward
/// schemes. Each column is perturbed with [`perturbation_step`].
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn strain_perturbed_tangent<T, E, F, const N: usize>(
    scheme: FiniteDifference,
    strain: &SVector<T, N>,
    stress: &SVector<T, N>,
    mut stress_update: F,
) -> Result<SMatrix<T, N, N>, E>
where
    T: Real,
    F: FnMut(&SVector<T, N>) -> Result<SVector<T, N>, E>,
{
    let mut tangent = SMatrix::<T, N, N>::zeros();
    for j in 0..N {
        let h = perturbation_step(strain, j);
        let perturbed = |delta: T| {
            let mut perturbed_strain = *strain;
            perturbed_strain[j] += delta;
            perturbed_strain
        };

        let column = match scheme {
            // (f(x + h) - f(x)) / h
            FiniteDifference::Forward => (stress_update(&perturbed(h))? - stress) / h,
            // (-f(x + 2h) + 4 f(x + h) - 3 f(x)) / 2h
            FiniteDifference::SecondOrderForward => {
                let f_plus = stress_update(&perturbed(h))?;
                let f_twice = stress_update(&perturbed(2.0 * h))?;
                (f_plus * 4.0 - f_twice - stress * 3.0) / (2.0 * h)
            }
            // (f(x + h) - f(x - h)) / 2h
            FiniteDifference::Central => {
                let f_plus = stress_update(&perturbed(h))?;
                let f_minus = stress_update(&perturbed(-h))?;
                (f_plus - f_minus) / (2.0 * h)
            }
        };
        tangent.set_column(j, &column);
    }
    Ok(tangent)
}

/// Approximates the (symmetrized) Jacobian of `internal_forces` with respect to the DOFs.
///
/// Every DOF $i$ is perturbed by $h_i = \sqrt{\text{tol}} (1 + |\vec u|) r_i$, where the
/// $r_i \in [0.5, 1)$ are drawn from a generator seeded with `seed`, so the perturbation
/// direction is fixed for a given seed. Forward differences are taken on a local copy of the
/// displacements and the result is symmetrized as $(\vec K + \vec K^T) / 2$.
pub fn displacement_perturbed_tangent<T, E, F, const N: usize>(
    displacements: &SVector<T, N>,
    forces: &SVector<T, N>,
    seed: u64,
    mut internal_forces: F,
) -> Result<SMatrix<T, N, N>, E>
where
    T: Real,
    F: FnMut(&SVector<T, N>) -> Result<SVector<T, N>, E>,
{
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    // Directions are drawn in f64 for any T
    let direction = Uniform::new(0.5_f64, 1.0_f64);
    let scale = tolerance::<T>().sqrt() * (T::one() + displacements.norm());
    let half = T::from_f64(0.5).expect("Literal must fit in T");

    let mut jacobian = SMatrix::<T, N, N>::zeros();
    let mut perturbed = *displacements;
    for j in 0..N {
        let r: f64 = direction.sample(&mut rng);
        let h = scale * T::from_f64(r).expect("Sample must fit in T");
        perturbed[j] += h;
        let column = (internal_forces(&perturbed)? - forces) / h;
        perturbed[j] = displacements[j];
        jacobian.set_column(j, &column);
    }

    Ok((jacobian.transpose() + jacobian) * half)
}
