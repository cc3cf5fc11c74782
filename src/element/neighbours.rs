//! Read-only access to the stress and strain of neighbouring elements.
use crate::error::FemDemError;
use crate::Real;
use nalgebra::Vector3;
use numeric_literals::replace_float_literals;

/// Stress and strain of an element, as published to its neighbours.
///
/// The stress is the predictive (undamaged) Voigt stress.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VoigtState<T: Real> {
    pub stress: Vector3<T>,
    pub strain: Vector3<T>,
}

impl<T: Real> Default for VoigtState<T> {
    fn default() -> Self {
        Self {
            stress: Vector3::zeros(),
            strain: Vector3::zeros(),
        }
    }
}

impl<T: Real> VoigtState<T> {
    pub fn new(stress: Vector3<T>, strain: Vector3<T>) -> Self {
        Self { stress, strain }
    }

    /// The state averaged with another state, as seen by the edge shared by both elements.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn average(&self, other: &Self) -> Self {
        Self {
            stress: (self.stress + other.stress) * 0.5,
            strain: (self.strain + other.strain) * 0.5,
        }
    }
}

/// Access to the published states of all elements, by element index.
///
/// Elements only ever read states of their neighbours through this trait and never own them.
/// States are published in a separate phase before elements are evaluated, so concurrent
/// evaluations only ever observe data that no one is writing to.
pub trait NeighbourStates<T: Real> {
    fn state(&self, element_index: usize) -> Option<&VoigtState<T>>;
}

impl<T: Real> NeighbourStates<T> for [VoigtState<T>] {
    fn state(&self, element_index: usize) -> Option<&VoigtState<T>> {
        self.get(element_index)
    }
}

impl<T: Real> NeighbourStates<T> for Vec<VoigtState<T>> {
    fn state(&self, element_index: usize) -> Option<&VoigtState<T>> {
        self.get(element_index)
    }
}

/// Averages `own` with the state across an edge.
///
/// Boundary edges (`None`) have no neighbour and mirror the element itself, so their
/// average is the element's own state.
pub fn edge_average<T, N>(own: &VoigtState<T>, neighbour: Option<usize>, states: &N) -> Result<VoigtState<T>, FemDemError>
where
    T: Real,
    N: NeighbourStates<T> + ?Sized,
{
    match neighbour {
        None => Ok(*own),
        Some(index) => {
            let other = states.state(index).ok_or_else(|| {
                FemDemError::Precondition(format!("state of neighbour element {index} has not been published"))
            })?;
            Ok(own.average(other))
        }
    }
}
