use crate::concrete_properties;
use femdem::properties::{DamageProperties, FiniteDifference, PlaneHypothesis, TangentScheme, YieldSurface};
use femdem::FemDemError;
use matrixcompare::assert_scalar_eq;
use std::str::FromStr;

#[test]
fn yield_surface_names_round_trip() {
    for surface in YieldSurface::ALL {
        assert_eq!(YieldSurface::from_str(surface.name()).unwrap(), surface);
        assert_eq!(surface.to_string(), surface.name());
    }
}

#[test]
fn unknown_yield_surface_is_a_configuration_error() {
    let err = YieldSurface::from_str("MohrCoulombish").unwrap_err();
    assert_eq!(
        err,
        FemDemError::Configuration("yield surface `MohrCoulombish` is not defined".to_string())
    );
}

#[test]
fn properties_from_json_with_defaults() {
    let json = r#"{
        "young_modulus": 30000.0,
        "poisson_ratio": 0.2,
        "yield_stress_compression": 30.0,
        "yield_stress_tension": 3.0,
        "fracture_energy": 100.0,
        "friction_angle": 32.0,
        "yield_surface": "ModifiedMohrCoulomb"
    }"#;
    let properties: DamageProperties<f64> = serde_json::from_str(json).unwrap();

    assert_eq!(properties, concrete_properties(YieldSurface::ModifiedMohrCoulomb));
    assert_eq!(properties.plane, PlaneHypothesis::PlaneStrain);
    assert_eq!(properties.tangent, TangentScheme::StrainPerturbation(FiniteDifference::Forward));
    assert_eq!(properties.density(), 0.0);
    assert_eq!(properties.thickness(), 1.0);
}

#[test]
fn properties_from_json_with_tangent_scheme() {
    let json = r#"{
        "young_modulus": 30000.0,
        "poisson_ratio": 0.2,
        "yield_stress_compression": 30.0,
        "yield_stress_tension": 3.0,
        "fracture_energy": 100.0,
        "density": 2400.0,
        "thickness": 0.1,
        "yield_surface": "Rankine",
        "plane": "PlaneStress",
        "tangent": { "DisplacementPerturbation": { "seed": 7 } }
    }"#;
    let properties: DamageProperties<f64> = serde_json::from_str(json).unwrap();

    assert_eq!(properties.yield_surface, YieldSurface::Rankine);
    assert_eq!(properties.plane, PlaneHypothesis::PlaneStress);
    assert_eq!(properties.tangent, TangentScheme::DisplacementPerturbation { seed: 7 });
    assert_eq!(properties.density(), 2400.0);
    assert_eq!(properties.thickness(), 0.1);
}

#[test]
fn unknown_yield_surface_in_json_is_rejected() {
    let json = r#"{
        "young_modulus": 30000.0,
        "poisson_ratio": 0.2,
        "yield_stress_compression": 30.0,
        "yield_stress_tension": 3.0,
        "fracture_energy": 100.0,
        "yield_surface": "Tresca"
    }"#;
    assert!(serde_json::from_str::<DamageProperties<f64>>(json).is_err());
}

#[test]
fn friction_angle_defaults_to_32_degrees() {
    let properties = DamageProperties::new(30000.0, 0.2, 30.0, 3.0, 100.0, YieldSurface::DruckerPrager);
    assert_scalar_eq!(properties.friction_angle_radians(), 32.0f64.to_radians(), comp = abs, tol = 1e-15);

    let properties = properties.with_friction_angle(0.0);
    assert_scalar_eq!(properties.friction_angle_radians(), 32.0f64.to_radians(), comp = abs, tol = 1e-15);

    let properties = properties.with_friction_angle(45.0);
    assert_scalar_eq!(properties.friction_angle_radians(), std::f64::consts::FRAC_PI_4, comp = abs, tol = 1e-15);
}

#[test]
fn default_friction_angle_is_detected_per_property_set() {
    let without_angle = |surface| DamageProperties::new(30000.0, 0.2, 30.0, 3.0, 100.0, surface);

    // Every property set reports its own fallback, not only the first one
    for _ in 0..2 {
        assert!(without_angle(YieldSurface::ModifiedMohrCoulomb).uses_default_friction_angle());
        assert!(without_angle(YieldSurface::DruckerPrager).uses_default_friction_angle());
    }
    assert!(without_angle(YieldSurface::DruckerPrager)
        .with_friction_angle(0.0)
        .uses_default_friction_angle());
    assert!(!without_angle(YieldSurface::DruckerPrager)
        .with_friction_angle(30.0)
        .uses_default_friction_angle());

    // Criteria without friction never fall back
    for surface in [
        YieldSurface::Rankine,
        YieldSurface::RankineFragile,
        YieldSurface::SimoJu,
        YieldSurface::Elastic,
    ] {
        assert!(!without_angle(surface).uses_default_friction_angle(), "{surface}");
    }
}

#[test]
fn required_parameters_name_the_missing_field() {
    let mut properties = concrete_properties(YieldSurface::Rankine);
    properties.yield_stress_compression = 0.0;
    assert!(matches!(
        properties.require_yield_stress_compression(),
        Err(FemDemError::InvalidMaterialParameter {
            parameter: "yield_stress_compression",
            ..
        })
    ));
    assert_eq!(properties.require_yield_stress_tension().unwrap(), 3.0);
}
