use crate::unit_right_triangle;
use femdem::element::{ElementKinematics, Tri3Kinematics};
use femdem::nalgebra::{Point2, Vector3, Vector6};
use femdem::FemDemError;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use proptest::prelude::*;

/// Nodal values of the displacement field $u = (a x + b y + 1, c x + d y - 2)$.
fn linear_displacements(vertices: &[Point2<f64>; 3], [a, b, c, d]: [f64; 4]) -> Vector6<f64> {
    let mut u = Vector6::zeros();
    for (i, v) in vertices.iter().enumerate() {
        u[2 * i] = a * v.x + b * v.y + 1.0;
        u[2 * i + 1] = c * v.x + d * v.y - 2.0;
    }
    u
}

#[test]
fn unit_right_triangle_geometry() {
    let kinematics = unit_right_triangle();
    assert_eq!(kinematics.num_integration_points(), 1);
    assert_eq!(kinematics.number_of_edges(), 3);
    assert_scalar_eq!(kinematics.integration_weight(0).unwrap(), 0.5, comp = float);
    assert_scalar_eq!(kinematics.measure().unwrap(), 0.5, comp = float);
    assert_scalar_eq!(
        kinematics.characteristic_length(),
        (2.0 + 2.0f64.sqrt()) / 3.0,
        comp = float
    );
    assert_scalar_eq!(kinematics.shape_functions(0).sum(), 1.0, comp = float);
}

#[test]
fn thickness_scales_integration_weight() {
    let kinematics = unit_right_triangle().with_thickness(2.0);
    assert_scalar_eq!(kinematics.integration_weight(0).unwrap(), 1.0, comp = float);
}

#[test]
fn strain_of_linear_displacement_field() {
    let kinematics = unit_right_triangle();
    let u = linear_displacements(kinematics.vertices(), [1e-3, 2e-3, -3e-3, 4e-3]);
    let strain = kinematics.strain(0, &u).unwrap();
    assert_matrix_eq!(strain, Vector3::new(1e-3, 4e-3, -1e-3), comp = abs, tol = 1e-15);
}

#[test]
fn inverted_triangle_is_rejected() {
    let kinematics =
        Tri3Kinematics::from_vertices([Point2::new(0.0, 0.0), Point2::new(0.0, 1.0), Point2::new(1.0, 0.0)]);
    assert!(matches!(
        kinematics.strain_displacement_matrix(0),
        Err(FemDemError::SingularJacobian(_))
    ));
    assert!(matches!(kinematics.measure(), Err(FemDemError::SingularJacobian(_))));
}

proptest! {
    #[test]
    fn integration_weight_is_area(kinematics in any::<Tri3Kinematics<f64>>()) {
        let [a, b, c] = *kinematics.vertices();
        let area = 0.5 * ((b - a).x * (c - a).y - (b - a).y * (c - a).x);
        let weight = kinematics.integration_weight(0).unwrap();
        prop_assert!((weight - area).abs() <= 1e-12 * area.max(1.0));
    }

    #[test]
    fn linear_fields_give_exact_strain(
        kinematics in any::<Tri3Kinematics<f64>>(),
        gradient in [-1.0..1.0, -1.0..1.0, -1.0..1.0, -1.0..1.0],
    ) {
        let u = linear_displacements(kinematics.vertices(), gradient);
        let strain = kinematics.strain(0, &u).unwrap();
        let [a, b, c, d] = gradient;
        let expected = Vector3::new(a, d, b + c);
        prop_assert!((strain - expected).amax() <= 1e-9);
    }
}
