use crate::Real;
use log::warn;
use numeric_literals::replace_float_literals;

/// Upper bound for any damage variable.
pub fn max_damage<T: Real>() -> T {
    T::from_f64(0.99).expect("Literal must fit in T")
}

/// Exponential softening law
/// $$
/// d = 1 - \frac{r_0}{\bar \sigma} \exp\left(A \left(1 - \frac{\bar \sigma}{r_0}\right)\right),
/// $$
/// where $A$ is the damage parameter, $\bar \sigma$ the uniaxial stress and $r_0$ the initial
/// threshold. The result is clamped to $[0, 0.99]$.
///
/// The law is only meaningful for a positive uniaxial stress, which callers guarantee by only
/// invoking it on the loading branch. A non-positive stress is reported and yields no damage.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn exponential_damage<T: Real>(damage_parameter: T, uniaxial_stress: T, initial_threshold: T) -> T {
    if uniaxial_stress <= 0.0 {
        warn!("Exponential softening evaluated with non-positive uniaxial stress {uniaxial_stress}");
        return 0.0;
    }
    let damage = 1.0
        - (initial_threshold / uniaxial_stress)
            * (damage_parameter * (1.0 - uniaxial_stress / initial_threshold)).exp();
    damage.clamp(0.0, max_damage())
}
