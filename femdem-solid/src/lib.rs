//! Constitutive laws for `femdem`.
//!
//! The laws describe the intact material. Damage is applied on top of their response by the
//! elements in `femdem`.
use femdem::constitutive::{ConstitutiveLaw, ConstitutiveResponse};
use femdem::nalgebra::{Matrix3, Vector3};
use femdem::properties::{DamageProperties, PlaneHypothesis};
use femdem::{FemDemError, Real};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

pub mod materials;

use materials::{LinearElasticPlaneStrain, LinearElasticPlaneStress, YoungPoisson};

/// Linear elasticity under the plane hypothesis selected in the material properties.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlaneElasticity<T> {
    PlaneStrain(LinearElasticPlaneStrain<T>),
    PlaneStress(LinearElasticPlaneStress<T>),
}

impl<T: Real> PlaneElasticity<T> {
    #[replace_float_literals(T::from_f64(literal).expect("literal must fit in T"))]
    pub fn from_properties(properties: &DamageProperties<T>) -> Result<Self, FemDemError> {
        let young = properties.require_young_modulus()?;
        let poisson = properties.poisson_ratio;
        if poisson <= -1.0 || poisson >= 0.5 {
            return Err(FemDemError::InvalidMaterialParameter {
                parameter: "poisson_ratio",
                reason: format!("{poisson} is outside of (-1, 0.5)"),
            });
        }

        let young_poisson = YoungPoisson { young, poisson };
        Ok(match properties.plane {
            PlaneHypothesis::PlaneStrain => Self::PlaneStrain(LinearElasticPlaneStrain::new(young_poisson)),
            PlaneHypothesis::PlaneStress => Self::PlaneStress(LinearElasticPlaneStress::new(young_poisson)),
        })
    }

    pub fn constitutive_matrix(&self) -> Matrix3<T> {
        match self {
            Self::PlaneStrain(law) => law.constitutive_matrix(),
            Self::PlaneStress(law) => law.constitutive_matrix(),
        }
    }
}

impl<T: Real> ConstitutiveLaw<T> for PlaneElasticity<T> {
    fn compute_response(&self, strain: &Vector3<T>) -> ConstitutiveResponse<T> {
        match self {
            Self::PlaneStrain(law) => law.compute_response(strain),
            Self::PlaneStress(law) => law.compute_response(strain),
        }
    }
}
