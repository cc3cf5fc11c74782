//! Interface to the (undamaged) constitutive response.
use crate::Real;
use nalgebra::{Matrix3, Vector3};

/// Predictive stress and constitutive tangent for a given strain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstitutiveResponse<T> {
    /// Undamaged Voigt stress $(\sigma_{xx}, \sigma_{yy}, \sigma_{xy})$.
    pub stress: Vector3<T>,
    /// Constitutive matrix $\vec C = \partial \vec \sigma / \partial \vec \epsilon$.
    pub tangent: Matrix3<T>,
}

/// A constitutive law for plane problems in Voigt notation.
///
/// Damage is applied on top of the response returned here, so implementations describe the
/// intact material. Strains use engineering shear, $\gamma_{xy} = 2 \epsilon_{xy}$.
pub trait ConstitutiveLaw<T: Real> {
    fn compute_response(&self, strain: &Vector3<T>) -> ConstitutiveResponse<T>;

    fn compute_stress(&self, strain: &Vector3<T>) -> Vector3<T> {
        self.compute_response(strain).stress
    }
}

impl<'a, T, L> ConstitutiveLaw<T> for &'a L
where
    T: Real,
    L: ConstitutiveLaw<T> + ?Sized,
{
    fn compute_response(&self, strain: &Vector3<T>) -> ConstitutiveResponse<T> {
        L::compute_response(self, strain)
    }
}
