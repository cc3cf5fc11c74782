use femdem::constitutive::{ConstitutiveLaw, ConstitutiveResponse};
use femdem::nalgebra::{Matrix3, RealField, Vector3};
use femdem::Real;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LameParameters<T> {
    pub mu: T,
    pub lambda: T,
}

impl<T> Default for LameParameters<T>
where
    T: RealField,
{
    fn default() -> Self {
        Self {
            mu: T::zero(),
            lambda: T::zero(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungPoisson<T> {
    pub young: T,
    pub poisson: T,
}

impl<T> From<YoungPoisson<T>> for LameParameters<T>
where
    T: RealField,
{
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    fn from(params: YoungPoisson<T>) -> Self {
        let YoungPoisson { young, poisson } = params;
        let mu = 0.5 * young.clone() / (1.0 + poisson.clone());
        let lambda = 2.0 * mu.clone() * poisson.clone() / (1.0 - 2.0 * poisson);
        Self { mu, lambda }
    }
}

/// Linear elasticity under plane strain, $\epsilon_{zz} = 0$.
///
/// In Voigt notation with engineering shear strain, the constitutive matrix is
/// $$
/// \vec C = \begin{pmatrix}
///     \lambda + 2 \mu & \lambda & 0 \\\\
///     \lambda & \lambda + 2 \mu & 0 \\\\
///     0 & 0 & \mu
/// \end{pmatrix}.
/// $$
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearElasticPlaneStrain<T> {
    pub parameters: LameParameters<T>,
}

impl<T: Real> LinearElasticPlaneStrain<T> {
    pub fn new(parameters: impl Into<LameParameters<T>>) -> Self {
        Self {
            parameters: parameters.into(),
        }
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    pub fn constitutive_matrix(&self) -> Matrix3<T> {
        let LameParameters { mu, lambda } = self.parameters;
        Matrix3::new(
            lambda + 2.0 * mu, lambda,            0.0,
            lambda,            lambda + 2.0 * mu, 0.0,
            0.0,               0.0,               mu)
    }
}

impl<T: Real> ConstitutiveLaw<T> for LinearElasticPlaneStrain<T> {
    fn compute_response(&self, strain: &Vector3<T>) -> ConstitutiveResponse<T> {
        let tangent = self.constitutive_matrix();
        ConstitutiveResponse {
            stress: tangent * strain,
            tangent,
        }
    }
}

/// Linear elasticity under plane stress, $\sigma_{zz} = 0$.
///
/// $$
/// \vec C = \frac{E}{1 - \nu^2} \begin{pmatrix}
///     1 & \nu & 0 \\\\
///     \nu & 1 & 0 \\\\
///     0 & 0 & (1 - \nu) / 2
/// \end{pmatrix}.
/// $$
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearElasticPlaneStress<T> {
    pub parameters: YoungPoisson<T>,
}

impl<T: Real> LinearElasticPlaneStress<T> {
    pub fn new(parameters: YoungPoisson<T>) -> Self {
        Self { parameters }
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    pub fn constitutive_matrix(&self) -> Matrix3<T> {
        let YoungPoisson { young, poisson: nu } = self.parameters;
        let factor = young / (1.0 - nu * nu);
        Matrix3::new(
            1.0, nu,  0.0,
            nu,  1.0, 0.0,
            0.0, 0.0, 0.5 * (1.0 - nu)) * factor
    }
}

impl<T: Real> ConstitutiveLaw<T> for LinearElasticPlaneStress<T> {
    fn compute_response(&self, strain: &Vector3<T>) -> ConstitutiveResponse<T> {
        let tangent = self.constitutive_matrix();
        ConstitutiveResponse {
            stress: tangent * strain,
            tangent,
        }
    }
}
