//! Continuum damage elements for combined finite/discrete element fracture analyses.
//!
//! Each linear triangle carries one damage variable per edge. Edge damage is driven by the
//! stress and strain averaged with the neighbouring element across that edge, so that cracks
//! propagate along element boundaries. The element's homogenized damage is the average of its
//! two most damaged edges, and fully fractured elements are deactivated when a step converges.
use nalgebra::RealField;

pub mod constitutive;
pub mod damage;
pub mod element;
pub mod error;
pub mod mesh;
pub mod model;
pub mod properties;
pub mod tangent;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

/// Real scalar type used throughout `femdem`.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

pub use error::FemDemError;
