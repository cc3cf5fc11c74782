//! Edge-based continuum damage: invariants, yield surfaces, softening and aggregation.
pub mod edges;
pub mod invariants;
pub mod softening;
pub mod yield_surface;

pub use edges::*;
pub use softening::*;
pub use yield_surface::*;
