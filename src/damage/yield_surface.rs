//! Damage yield surfaces driving the per-edge damage evolution.
//!
//! Every criterion follows the same pattern: the (edge-averaged) stress is reduced to a scalar
//! uniaxial stress which is compared with the current threshold of the edge. The very first
//! evaluation of an edge only initializes its threshold with the characteristic stress
//! $c_{max}$ of the criterion. Afterwards, exceeding the threshold drives the damage through the
//! exponential softening law, and anything else keeps the converged damage of the edge.
use crate::damage::invariants::{
    i1_invariant, j2_invariant, j3_invariant, lode_angle, principal_stresses, tolerance,
};
use crate::damage::softening::{exponential_damage, max_damage};
use crate::error::FemDemError;
use crate::properties::{DamageProperties, YieldSurface};
use crate::Real;
use nalgebra::Vector3;
use numeric_literals::replace_float_literals;

/// Updated state of a single edge after integrating the damage law.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeUpdate<T> {
    pub threshold: T,
    pub damage: T,
    pub is_damaging: bool,
}

/// Integrates the damage law of a single edge.
///
/// `threshold` and `damage` are the converged values of the edge, `strain` and `stress` the
/// edge-averaged Voigt vectors and `length` the characteristic length of the element.
pub fn integrate_stress_damage_mechanics<T: Real>(
    properties: &DamageProperties<T>,
    threshold: T,
    damage: T,
    strain: &Vector3<T>,
    stress: &Vector3<T>,
    length: T,
) -> Result<EdgeUpdate<T>, FemDemError> {
    match properties.yield_surface {
        YieldSurface::ModifiedMohrCoulomb => modified_mohr_coulomb(properties, threshold, damage, stress, length),
        YieldSurface::SimoJu => simo_ju(properties, threshold, damage, strain, stress, length),
        YieldSurface::Rankine => rankine(properties, threshold, damage, stress, length),
        YieldSurface::DruckerPrager => drucker_prager(properties, threshold, damage, stress, length),
        YieldSurface::RankineFragile => rankine_fragile(properties, threshold, damage, stress),
        YieldSurface::Elastic => Ok(elastic(properties, threshold)),
    }
}

/// Evaluates $A = 1 / (\text{factor} \cdot G_t E / (L \sigma_c^2) - 1/2)$ and checks that it
/// is positive.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn damage_parameter<T: Real>(factor: T, fracture_energy: T, young: T, length: T, sigma_c: T) -> Result<T, FemDemError> {
    let a = 1.0 / (factor * fracture_energy * young / (length * sigma_c.powi(2)) - 0.5);
    if a < tolerance() {
        Err(FemDemError::fracture_energy_too_low())
    } else {
        Ok(a)
    }
}

/// Shared threshold initialization and loading/unloading logic of the softening criteria.
fn update_with_softening<T: Real>(
    threshold: T,
    converged_damage: T,
    uniaxial_stress: T,
    c_max: T,
    damage_parameter: T,
) -> EdgeUpdate<T> {
    if threshold < tolerance() {
        return EdgeUpdate {
            threshold: c_max,
            damage: converged_damage,
            is_damaging: false,
        };
    }

    if uniaxial_stress - threshold <= T::zero() {
        EdgeUpdate {
            threshold,
            damage: converged_damage,
            is_damaging: false,
        }
    } else {
        EdgeUpdate {
            threshold: uniaxial_stress,
            damage: exponential_damage(damage_parameter, uniaxial_stress, c_max),
            is_damaging: true,
        }
    }
}

#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn modified_mohr_coulomb<T: Real>(
    properties: &DamageProperties<T>,
    threshold: T,
    damage: T,
    stress: &Vector3<T>,
    length: T,
) -> Result<EdgeUpdate<T>, FemDemError> {
    let principal = principal_stresses(stress);

    let sigma_c = properties.require_yield_stress_compression()?;
    let sigma_t = properties.require_yield_stress_tension()?;
    let Gt = properties.require_fracture_energy()?;
    let E = properties.require_young_modulus()?;
    let phi = properties.friction_angle_radians();

    let R = (sigma_c / sigma_t).abs();
    let R_mohr = (T::frac_pi_4() + phi / 2.0).tan().powi(2);
    let alpha_r = R / R_mohr;
    let c_max = sigma_c.abs();

    let I1 = i1_invariant(principal[0], principal[1]);
    let J2 = j2_invariant(principal[0], principal[1]);
    let J3 = j3_invariant(principal[0], principal[1], I1);
    let K1 = 0.5 * (1.0 + alpha_r) - 0.5 * (1.0 - alpha_r) * phi.sin();
    let K2 = 0.5 * (1.0 + alpha_r) - 0.5 * (1.0 - alpha_r) / phi.sin();
    let K3 = 0.5 * (1.0 + alpha_r) * phi.sin() - 0.5 * (1.0 - alpha_r);
    let n = sigma_c / sigma_t;
    let A = damage_parameter(n * n, Gt, E, length, sigma_c)?;

    let uniaxial_stress = if principal[0] + principal[1] < tolerance() {
        0.0
    } else {
        let theta = lode_angle(J2, J3);
        (2.0 * (T::frac_pi_4() + phi * 0.5).tan() / phi.cos())
            * ((I1 * K3 / 3.0)
                + J2.sqrt() * (K1 * theta.cos() - K2 * theta.sin() * phi.sin() / T::sqrt(3.0)))
    };

    Ok(update_with_softening(threshold, damage, uniaxial_stress, c_max, A))
}

#[allow(non_snake_case)]
fn rankine<T: Real>(
    properties: &DamageProperties<T>,
    threshold: T,
    damage: T,
    stress: &Vector3<T>,
    length: T,
) -> Result<EdgeUpdate<T>, FemDemError> {
    let principal = principal_stresses(stress);

    let sigma_c = properties.require_yield_stress_compression()?;
    let sigma_t = properties.require_yield_stress_tension()?;
    let Gt = properties.require_fracture_energy()?;
    let E = properties.require_young_modulus()?;
    let c_max = sigma_t.abs();
    let A = damage_parameter(T::one(), Gt, E, length, sigma_c)?;

    let uniaxial_stress = principal.max();

    Ok(update_with_softening(threshold, damage, uniaxial_stress, c_max, A))
}

#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn drucker_prager<T: Real>(
    properties: &DamageProperties<T>,
    threshold: T,
    damage: T,
    stress: &Vector3<T>,
    length: T,
) -> Result<EdgeUpdate<T>, FemDemError> {
    let principal = principal_stresses(stress);

    let sigma_c = properties.require_yield_stress_compression()?;
    let sigma_t = properties.require_yield_stress_tension()?;
    let Gt = properties.require_fracture_energy()?;
    let E = properties.require_young_modulus()?;
    let sin_phi = properties.friction_angle_radians().sin();

    let c_max = (sigma_t * (3.0 + sin_phi) / (3.0 * sin_phi - 3.0)).abs();
    let I1 = i1_invariant(principal[0], principal[1]);
    let J2 = j2_invariant(principal[0], principal[1]);
    let A = damage_parameter(1.0, Gt, E, length, sigma_c)?;

    let uniaxial_stress = if principal[0] + principal[1] < tolerance() {
        0.0
    } else {
        let cfl = -T::sqrt(3.0) * (3.0 - sin_phi) / (3.0 * sin_phi - 3.0);
        let ten0 = 2.0 * I1 * sin_phi / (T::sqrt(3.0) * (3.0 - sin_phi)) + J2.sqrt();
        (cfl * ten0).abs()
    };

    Ok(update_with_softening(threshold, damage, uniaxial_stress, c_max, A))
}

#[allow(non_snake_case)]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn simo_ju<T: Real>(
    properties: &DamageProperties<T>,
    threshold: T,
    damage: T,
    strain: &Vector3<T>,
    stress: &Vector3<T>,
    length: T,
) -> Result<EdgeUpdate<T>, FemDemError> {
    let principal = principal_stresses(stress);

    let sigma_c = properties.require_yield_stress_compression()?;
    let sigma_t = properties.require_yield_stress_tension()?;
    let Gt = properties.require_fracture_energy()?;
    let E = properties.require_young_modulus()?;
    let n = (sigma_c / sigma_t).abs();
    let c_max = sigma_c.abs() / E.sqrt();
    let A = damage_parameter(n * n, Gt, E, length, sigma_c)?;

    // Split of the principal stresses into tensile and compressive parts
    let (mut sum_abs, mut sum_tension, mut sum_compression) = (0.0, 0.0, 0.0);
    for &sigma in principal.iter() {
        sum_abs += sigma.abs();
        sum_tension += 0.5 * (sigma + sigma.abs());
        sum_compression += 0.5 * (-sigma + sigma.abs());
    }

    let uniaxial_stress = if strain[0] + strain[1] < tolerance() || sum_abs < tolerance() {
        0.0
    } else {
        let ere0 = sum_tension / sum_abs;
        let ere1 = sum_compression / sum_abs;
        let energy = strain.dot(stress).max(0.0);
        energy.sqrt() * (ere0 * n + ere1)
    };

    Ok(update_with_softening(threshold, damage, uniaxial_stress, c_max, A))
}

/// Brittle variant of the Rankine criterion: exceeding the threshold breaks the edge at once.
fn rankine_fragile<T: Real>(
    properties: &DamageProperties<T>,
    threshold: T,
    damage: T,
    stress: &Vector3<T>,
) -> Result<EdgeUpdate<T>, FemDemError> {
    let sigma_t = properties.require_yield_stress_tension()?;
    let c_max = sigma_t.abs();
    let uniaxial_stress = principal_stresses(stress).max();

    if threshold < tolerance() {
        return Ok(EdgeUpdate {
            threshold: c_max,
            damage,
            is_damaging: false,
        });
    }

    if uniaxial_stress - threshold <= T::zero() {
        Ok(EdgeUpdate {
            threshold,
            damage,
            is_damaging: false,
        })
    } else {
        Ok(EdgeUpdate {
            threshold: uniaxial_stress,
            damage: max_damage(),
            is_damaging: true,
        })
    }
}

/// Never damages, only initializes the threshold.
fn elastic<T: Real>(properties: &DamageProperties<T>, threshold: T) -> EdgeUpdate<T> {
    let threshold = if threshold < tolerance() {
        properties.yield_stress_tension.abs()
    } else {
        threshold
    };
    EdgeUpdate {
        threshold,
        damage: T::zero(),
        is_damaging: false,
    }
}
