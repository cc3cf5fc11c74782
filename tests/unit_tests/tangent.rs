use crate::unit_right_triangle;
use femdem::element::ElementKinematics;
use femdem::nalgebra::{matrix, Matrix3, Vector3, Vector6};
use femdem::properties::{FiniteDifference, YieldSurface};
use femdem::tangent::{displacement_perturbed_tangent, perturbation_step, strain_perturbed_tangent};
use femdem::FemDemError;
use femdem_solid::PlaneElasticity;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};

use femdem::nalgebra;

const SCHEMES: [FiniteDifference; 3] = [
    FiniteDifference::Forward,
    FiniteDifference::SecondOrderForward,
    FiniteDifference::Central,
];

fn elastic_matrix() -> Matrix3<f64> {
    let properties = crate::concrete_properties(YieldSurface::Elastic);
    PlaneElasticity::from_properties(&properties)
        .unwrap()
        .constitutive_matrix()
}

#[test]
fn perturbation_step_scales_with_strain() {
    let strain = Vector3::new(1e-2, 0.0, -4e-3);
    assert_scalar_eq!(perturbation_step(&strain, 0), 1e-7, comp = float);
    assert_scalar_eq!(perturbation_step(&strain, 2), 4e-8, comp = float);

    // Vanishing components fall back to the round-off bound
    let bound = f64::EPSILON.sqrt() * (1.0 + 1e-2);
    assert_scalar_eq!(perturbation_step(&strain, 1), bound, comp = float);

    // Tiny strains are bounded from below by round-off
    let tiny = Vector3::new(1e-12, 0.0, 0.0);
    assert_scalar_eq!(perturbation_step(&tiny, 0), f64::EPSILON.sqrt() * (1.0 + 1e-12), comp = float);
}

#[test]
fn strain_perturbed_tangent_recovers_elastic_matrix() {
    let c = elastic_matrix();
    let strain = Vector3::new(1e-4, -3e-5, 2e-5);
    let stress = c * strain;

    for scheme in SCHEMES {
        let tangent = strain_perturbed_tangent(scheme, &strain, &stress, |eps| Ok::<_, FemDemError>(c * eps)).unwrap();
        let relative_error = (tangent - c).norm() / c.norm();
        assert!(relative_error < 1e-3, "{scheme:?}: relative error {relative_error}");
    }
}

#[test]
fn second_order_schemes_are_exact_for_quadratics() {
    let f = |x: &Vector3<f64>| Ok::<_, FemDemError>(Vector3::new(x[0] * x[0], x[0] * x[1], x[2]));
    let x = Vector3::new(1.0, 2.0, 3.0);
    let fx = f(&x).unwrap();
    #[rustfmt::skip]
    let expected = matrix![2.0, 0.0, 0.0;
                           2.0, 1.0, 0.0;
                           0.0, 0.0, 1.0];

    for scheme in [FiniteDifference::SecondOrderForward, FiniteDifference::Central] {
        let jacobian = strain_perturbed_tangent(scheme, &x, &fx, f).unwrap();
        assert_matrix_eq!(jacobian, expected, comp = abs, tol = 1e-6);
    }

    // The forward scheme carries an error of order h in the quadratic term
    let jacobian = strain_perturbed_tangent(FiniteDifference::Forward, &x, &fx, f).unwrap();
    let h = perturbation_step(&x, 0);
    assert_scalar_eq!(jacobian[(0, 0)], 2.0 + h, comp = abs, tol = 1e-6);
}

#[test]
fn strain_perturbed_tangent_propagates_errors() {
    let x = Vector3::new(1.0, 2.0, 3.0);
    let result = strain_perturbed_tangent(FiniteDifference::Central, &x, &x, |_| {
        Err(FemDemError::Precondition("neighbours not calculated".to_string()))
    });
    assert!(matches!(result, Err(FemDemError::Precondition(_))));
}

#[test]
fn displacement_perturbed_tangent_approximates_elastic_stiffness() {
    let kinematics = unit_right_triangle();
    let b = kinematics.strain_displacement_matrix(0).unwrap();
    let w = kinematics.integration_weight(0).unwrap();
    let stiffness = b.transpose() * elastic_matrix() * b * w;

    let u = Vector6::new(0.0, 0.0, 1e-4, 0.0, 2e-5, -1e-5);
    let forces = stiffness * u;
    let tangent =
        displacement_perturbed_tangent(&u, &forces, 3, |u| Ok::<_, FemDemError>(stiffness * u)).unwrap();

    assert_eq!(tangent, tangent.transpose());
    let relative_error = (tangent - stiffness).norm() / stiffness.norm();
    assert!(relative_error < 1e-3, "relative error {relative_error}");
}

#[test]
fn displacement_perturbed_tangent_is_symmetrized() {
    #[rustfmt::skip]
    let a = matrix![4.0, 1.0, 0.0;
                    3.0, 5.0, 2.0;
                    0.0, 0.0, 6.0];
    let u = Vector3::new(0.1, 0.2, 0.3);
    let tangent = displacement_perturbed_tangent(&u, &(a * u), 11, |u| Ok::<_, FemDemError>(a * u)).unwrap();
    assert_matrix_eq!(tangent, (a + a.transpose()) * 0.5, comp = abs, tol = 1e-6);
}

#[test]
fn displacement_perturbed_tangent_leaves_input_untouched() {
    let u = Vector3::new(0.1, 0.2, 0.3);
    let copy = u;
    let mut seen = Vec::new();
    displacement_perturbed_tangent(&u, &u, 5, |perturbed| {
        seen.push(*perturbed);
        Ok::<_, FemDemError>(*perturbed)
    })
    .unwrap();

    assert_eq!(u, copy);
    // Exactly one DOF is perturbed per evaluation
    for (j, perturbed) in seen.iter().enumerate() {
        for i in 0..3 {
            if i == j {
                assert!(perturbed[i] > u[i]);
            } else {
                assert_eq!(perturbed[i], u[i]);
            }
        }
    }
}

#[test]
fn displacement_perturbed_tangent_is_generic_over_scalar() {
    #[rustfmt::skip]
    let a = matrix![2.0f32, 1.0;
                    0.0,    3.0];
    let u = nalgebra::Vector2::new(0.5f32, -0.25);
    let tangent = displacement_perturbed_tangent(&u, &(a * u), 7, |u| Ok::<_, FemDemError>(a * u)).unwrap();
    assert_matrix_eq!(tangent, (a + a.transpose()) * 0.5, comp = abs, tol = 1e-2);
}

#[test]
fn displacement_perturbation_steps_are_seeded_and_bounded() {
    let u = Vector3::new(0.3, 0.0, -0.4);
    let scale = f64::EPSILON.sqrt() * (1.0 + u.norm());

    let steps = |seed: u64| {
        let mut recorded = Vec::new();
        displacement_perturbed_tangent(&u, &u, seed, |perturbed| {
            recorded.push((perturbed - u).amax());
            Ok::<_, FemDemError>(*perturbed)
        })
        .unwrap();
        recorded
    };

    let first = steps(13);
    assert_eq!(first, steps(13));
    assert_ne!(first, steps(14));
    for h in first {
        let r = h / scale;
        assert!(r > 0.5 - 1e-6 && r < 1.0 + 1e-6, "relative step {r} outside of [0.5, 1)");
    }
}
