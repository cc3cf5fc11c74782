//! Material parameters for damage-mechanics elements.
use crate::damage::invariants::tolerance;
use crate::error::FemDemError;
use crate::Real;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Damage yield surfaces available for edge damage integration.
///
/// The surface is resolved once when the material is configured, so the hot integration loop
/// only dispatches on the enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YieldSurface {
    ModifiedMohrCoulomb,
    SimoJu,
    Rankine,
    DruckerPrager,
    RankineFragile,
    Elastic,
}

impl YieldSurface {
    pub const ALL: [YieldSurface; 6] = [
        YieldSurface::ModifiedMohrCoulomb,
        YieldSurface::SimoJu,
        YieldSurface::Rankine,
        YieldSurface::DruckerPrager,
        YieldSurface::RankineFragile,
        YieldSurface::Elastic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ModifiedMohrCoulomb => "ModifiedMohrCoulomb",
            Self::SimoJu => "SimoJu",
            Self::Rankine => "Rankine",
            Self::DruckerPrager => "DruckerPrager",
            Self::RankineFragile => "RankineFragile",
            Self::Elastic => "Elastic",
        }
    }
}

impl fmt::Display for YieldSurface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for YieldSurface {
    type Err = FemDemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|surface| surface.name() == s)
            .ok_or_else(|| FemDemError::Configuration(format!("yield surface `{s}` is not defined")))
    }
}

/// Two-dimensional idealization of the out-of-plane behavior.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaneHypothesis {
    #[default]
    PlaneStrain,
    PlaneStress,
}

/// Finite difference scheme used by the strain-perturbation tangent estimator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiniteDifference {
    /// $(\sigma(\epsilon + h) - \sigma(\epsilon)) / h$.
    #[default]
    Forward,
    /// $(4 \sigma(\epsilon + h) - \sigma(\epsilon + 2h) - 3 \sigma(\epsilon)) / 2h$.
    SecondOrderForward,
    /// $(\sigma(\epsilon + h) - \sigma(\epsilon - h)) / 2h$.
    Central,
}

/// Stiffness operator used once an element has started to soften.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TangentScheme {
    /// Always use the secant operator $(1 - d) \vec C$.
    Secant,
    /// Numerical material tangent obtained by perturbing the Voigt strain.
    StrainPerturbation(FiniteDifference),
    /// Numerical element tangent obtained by perturbing nodal displacements along
    /// a direction drawn from a generator seeded with `seed`.
    DisplacementPerturbation { seed: u64 },
}

impl Default for TangentScheme {
    fn default() -> Self {
        Self::StrainPerturbation(FiniteDifference::Forward)
    }
}

/// Material parameters of a damage-mechanics element.
///
/// Parameters that are not set (or set to zero) are only reported when a yield surface
/// actually needs them, mirroring how property sets are usually shared between elements with
/// different criteria.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageProperties<T> {
    pub young_modulus: T,
    pub poisson_ratio: T,
    pub yield_stress_compression: T,
    pub yield_stress_tension: T,
    /// Fracture energy in tension, $G_t$.
    pub fracture_energy: T,
    /// Internal friction angle in degrees.
    #[serde(default)]
    pub friction_angle: Option<T>,
    #[serde(default)]
    pub density: Option<T>,
    #[serde(default)]
    pub thickness: Option<T>,
    pub yield_surface: YieldSurface,
    #[serde(default)]
    pub plane: PlaneHypothesis,
    #[serde(default)]
    pub tangent: TangentScheme,
}

impl<T> DamageProperties<T>
where
    T: Real,
{
    pub fn new(
        young_modulus: T,
        poisson_ratio: T,
        yield_stress_compression: T,
        yield_stress_tension: T,
        fracture_energy: T,
        yield_surface: YieldSurface,
    ) -> Self {
        Self {
            young_modulus,
            poisson_ratio,
            yield_stress_compression,
            yield_stress_tension,
            fracture_energy,
            friction_angle: None,
            density: None,
            thickness: None,
            yield_surface,
            plane: PlaneHypothesis::default(),
            tangent: TangentScheme::default(),
        }
    }

    pub fn with_friction_angle(self, degrees: T) -> Self {
        Self {
            friction_angle: Some(degrees),
            ..self
        }
    }

    pub fn with_density(self, density: T) -> Self {
        Self {
            density: Some(density),
            ..self
        }
    }

    pub fn with_thickness(self, thickness: T) -> Self {
        Self {
            thickness: Some(thickness),
            ..self
        }
    }

    pub fn with_plane(self, plane: PlaneHypothesis) -> Self {
        Self { plane, ..self }
    }

    pub fn with_tangent(self, tangent: TangentScheme) -> Self {
        Self { tangent, ..self }
    }

    fn require(value: T, parameter: &'static str) -> Result<T, FemDemError> {
        if value < tolerance() {
            Err(FemDemError::missing_parameter(parameter))
        } else {
            Ok(value)
        }
    }

    pub fn require_young_modulus(&self) -> Result<T, FemDemError> {
        Self::require(self.young_modulus, "young_modulus")
    }

    pub fn require_yield_stress_compression(&self) -> Result<T, FemDemError> {
        Self::require(self.yield_stress_compression, "yield_stress_compression")
    }

    pub fn require_yield_stress_tension(&self) -> Result<T, FemDemError> {
        Self::require(self.yield_stress_tension, "yield_stress_tension")
    }

    pub fn require_fracture_energy(&self) -> Result<T, FemDemError> {
        Self::require(self.fracture_energy, "fracture_energy")
    }

    /// The friction angle in degrees, if it is defined and not vanishing.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn defined_friction_angle(&self) -> Option<T> {
        self.friction_angle
            .filter(|&angle| angle * T::pi() / 180.0 >= tolerance())
    }

    /// Whether the yield surface depends on a friction angle that is not defined, so that the
    /// default of 32 degrees applies.
    pub fn uses_default_friction_angle(&self) -> bool {
        let needs_angle = matches!(
            self.yield_surface,
            YieldSurface::ModifiedMohrCoulomb | YieldSurface::DruckerPrager
        );
        needs_angle && self.defined_friction_angle().is_none()
    }

    /// The internal friction angle in radians.
    ///
    /// Falls back to 32 degrees if the angle is unset or vanishing. The fallback is reported
    /// once per property set by [`FemDemModel::new`](crate::model::FemDemModel::new), see
    /// [`uses_default_friction_angle`](Self::uses_default_friction_angle).
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn friction_angle_radians(&self) -> T {
        self.defined_friction_angle().unwrap_or(32.0) * T::pi() / 180.0
    }

    pub fn density(&self) -> T {
        self.density.unwrap_or_else(T::zero)
    }

    pub fn thickness(&self) -> T {
        self.thickness.unwrap_or_else(T::one)
    }
}
