//! Strategies for property-based testing of the damage integration.
use crate::element::Tri3Kinematics;
use ::proptest::prelude::*;
use nalgebra::{Point2, Vector3};

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Keep coordinates in a moderate range, so that element sizes stay comparable to the
    // characteristic lengths used with realistic fracture energies
    let range = -10.0..10.0;
    [range.clone(), range.clone()].prop_map(|[x, y]| Point2::new(x, y))
}

/// Small Voigt strains $(\epsilon_{xx}, \epsilon_{yy}, \gamma_{xy})$.
pub fn voigt_strain() -> impl Strategy<Value = Vector3<f64>> {
    let range = -1e-3..1e-3;
    [range.clone(), range.clone(), range.clone()].prop_map(|[xx, yy, xy]| Vector3::new(xx, yy, xy))
}

/// Per-edge damage values within the admissible range `[0, 0.99]`.
pub fn edge_damages(num_edges: usize) -> impl Strategy<Value = Vec<f64>> {
    ::proptest::collection::vec(0.0..=0.99, num_edges)
}

impl Arbitrary for Tri3Kinematics<f64> {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        [point2(), point2(), point2()]
            .prop_filter_map("triangle must be counter-clockwise and not too thin", |[a, b, c]| {
                let ab = b - a;
                let ac = c - a;
                let twice_area = ab.x * ac.y - ab.y * ac.x;
                let longest = ab.norm().max(ac.norm()).max((c - b).norm());
                if twice_area > 0.1 * longest * longest {
                    Some(Tri3Kinematics::from_vertices([a, b, c]))
                } else if -twice_area > 0.1 * longest * longest {
                    Some(Tri3Kinematics::from_vertices([a, c, b]))
                } else {
                    None
                }
            })
            .boxed()
    }
}
