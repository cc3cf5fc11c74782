//! Stress invariants of plane Voigt stress states.
use crate::Real;
use nalgebra::{Vector2, Vector3};
use numeric_literals::replace_float_literals;

/// Numerical tolerance used by all damage computations.
pub fn tolerance<T: Real>() -> T {
    T::default_epsilon()
}

/// Principal stresses $(\sigma_1, \sigma_2)$, $\sigma_1 \geq \sigma_2$, of the Voigt stress
/// vector $(\sigma_{xx}, \sigma_{yy}, \sigma_{xy})$.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn principal_stresses<T: Real>(stress: &Vector3<T>) -> Vector2<T> {
    let center = 0.5 * (stress[0] + stress[1]);
    let radius = ((0.5 * (stress[0] - stress[1])).powi(2) + stress[2].powi(2)).sqrt();
    Vector2::new(center + radius, center - radius)
}

pub fn i1_invariant<T: Real>(sigma1: T, sigma2: T) -> T {
    sigma1 + sigma2
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn j2_invariant<T: Real>(sigma1: T, sigma2: T) -> T {
    ((sigma1 - sigma2).powi(2) + sigma1.powi(2) + sigma2.powi(2)) / 6.0
}

/// Third deviatoric invariant, with the out-of-plane principal stress taken as zero.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn j3_invariant<T: Real>(sigma1: T, sigma2: T, i1: T) -> T {
    let mean = i1 / 3.0;
    (sigma1 - mean) * (sigma2 - mean) * (-mean)
}

/// The Lode angle $\theta = \frac{1}{3} \arcsin(-\frac{3 \sqrt{3} J_3}{2 J_2^{3/2}})$.
///
/// Sine arguments outside $[-0.95, 0.95]$ are snapped to $\pm 1$, so the result always lies in
/// $[-\pi/6, \pi/6]$. Returns zero for a vanishing $J_2$.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn lode_angle<T: Real>(j2: T, j3: T) -> T {
    if j2.abs() > tolerance() {
        let mut sint3 = (-3.0 * T::sqrt(3.0) * j3) / (2.0 * j2 * j2.sqrt());
        if sint3 < -0.95 {
            sint3 = -1.0;
        } else if sint3 > 0.95 {
            sint3 = 1.0;
        }
        sint3.asin() / 3.0
    } else {
        0.0
    }
}
