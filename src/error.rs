//! Errors raised while integrating damage on an element.
use std::error::Error;
use std::fmt;

/// Failure modes of the element-level damage integration.
///
/// None of these are recoverable at the element level. Load-step cutbacks and similar retry
/// strategies belong to the global solver, which only needs to know that converged state
/// was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FemDemError {
    /// An unknown yield surface or otherwise inconsistent configuration.
    Configuration(String),
    /// A material parameter is missing, or the parameters yield a non-positive damage parameter.
    InvalidMaterialParameter { parameter: &'static str, reason: String },
    /// The element was evaluated before its prerequisites (e.g. edge adjacency) were set up.
    Precondition(String),
    /// The element geometry is degenerate or inverted. Holds the offending determinant.
    SingularJacobian(String),
}

impl FemDemError {
    pub(crate) fn missing_parameter(parameter: &'static str) -> Self {
        Self::InvalidMaterialParameter {
            parameter,
            reason: format!("{parameter} is not defined (or not positive)"),
        }
    }

    pub(crate) fn fracture_energy_too_low() -> Self {
        Self::InvalidMaterialParameter {
            parameter: "fracture_energy",
            reason: "damage parameter A is not positive, fracture energy too low \
                     for the element size and yield stress"
                .to_string(),
        }
    }
}

impl fmt::Display for FemDemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::InvalidMaterialParameter { parameter, reason } => {
                write!(f, "invalid material parameter `{parameter}`: {reason}")
            }
            Self::Precondition(msg) => write!(f, "precondition violated: {msg}"),
            Self::SingularJacobian(determinant) => {
                write!(f, "singular or inverted element Jacobian (det J = {determinant})")
            }
        }
    }
}

impl Error for FemDemError {}
