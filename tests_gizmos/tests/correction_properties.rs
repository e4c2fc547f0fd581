//! Correction Property Tests
//!
//! Properties of the correction math that must hold on any closed orbit:
//! - Prograde edits scale along the target velocity
//! - Normal and radial edits rotate without changing target speed
//! - Folding keeps every angle well defined
//! - Idle ticks change nothing

use approx::{assert_abs_diff_eq, assert_relative_eq};
use gizmo_correction::{correct, fold, CorrectionConfig, CorrectionEngine, TargetFrame, TickOutcome};
use maneuver_types::{Axis, MomentumVector, OrbitalGeometrySnapshot, Vec3};
use sim_planner::KeplerOrbit;
use tests_gizmos::init_tracing;

const EPS: f64 = CorrectionConfig::DEFAULT_EPSILON;

/// Geometry samples over several eccentricities and orbit positions
fn geometry_samples() -> Vec<OrbitalGeometrySnapshot> {
    let mut samples = Vec::new();
    for eccentricity in [0.0, 0.05, 0.3, 0.7, 0.9] {
        let orbit = KeplerOrbit::new(2_500_000.0, eccentricity, 3.5e12, 0.0).unwrap();
        for fraction in [0.0, 0.13, 0.37, 0.5, 0.81] {
            samples.push(orbit.geometry_at(orbit.period() * fraction));
        }
    }
    samples
}

fn references() -> Vec<MomentumVector> {
    vec![
        MomentumVector::ZERO,
        MomentumVector::new(30.0, -12.0, 80.0),
        MomentumVector::new(-250.0, 400.0, -90.0),
    ]
}

fn target_speed(reference: MomentumVector, geometry: &OrbitalGeometrySnapshot) -> f64 {
    (reference.to_vec3() + Vec3::z() * geometry.orbital_speed).norm()
}

#[test]
fn test_prograde_delta_follows_target_velocity() {
    init_tracing();

    for geometry in geometry_samples() {
        for reference in references() {
            let raw = reference.offset(Axis::Prograde, 25.0);
            let delta = correct(reference, raw, &geometry, Axis::Prograde, EPS).unwrap();

            let target = Vec3::new(
                reference.radial,
                reference.normal,
                reference.prograde + geometry.orbital_speed,
            );
            let expected = target.normalize() * 25.0;

            assert_relative_eq!(delta.to_vec3(), expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_prograde_delta_ignores_orbit_shape() {
    init_tracing();
    let reference = MomentumVector::new(15.0, 5.0, 60.0);
    let raw = reference.offset(Axis::Prograde, -40.0);

    let narrow = OrbitalGeometrySnapshot {
        orbital_speed: 3_000.0,
        true_anomaly: 2.1,
        eccentric_anomaly: 1.7,
        semi_major_axis: 9_000_000.0,
        semi_minor_axis: 3_000_000.0,
        eccentricity: 0.94,
    };
    let round = OrbitalGeometrySnapshot::circular(640_000.0, 3_000.0, 0.4);

    let from_narrow = correct(reference, raw, &narrow, Axis::Prograde, EPS).unwrap();
    let from_round = correct(reference, raw, &round, Axis::Prograde, EPS).unwrap();

    assert_relative_eq!(from_narrow.to_vec3(), from_round.to_vec3(), epsilon = 1e-9);
}

#[test]
fn test_rotations_preserve_target_speed() {
    init_tracing();

    for geometry in geometry_samples() {
        for reference in references() {
            let before = target_speed(reference, &geometry);
            for axis in [Axis::Normal, Axis::Radial] {
                let raw = reference.offset(axis, 180.0);
                let delta = correct(reference, raw, &geometry, axis, EPS).unwrap();
                let after = target_speed(reference + delta, &geometry);

                assert_relative_eq!(after, before, max_relative = 1e-9);
            }
        }
    }
}

#[test]
fn test_fold_bound_for_huge_deltas() {
    for magnitude in [1e-3, 1.0, 7_000.0, 2.5e6] {
        for multiple in [0.5, 1.0, 3.999, 4.0, 17.25, 1e3, 1e9] {
            for sign in [1.0, -1.0] {
                let delta = sign * multiple * magnitude;
                let ratio = fold::half_angle_sine(delta, magnitude);
                assert!((-1.0..=1.0).contains(&ratio), "ratio {ratio} for {delta}");
                assert!(fold::rotation_angle(delta, magnitude).is_finite());
            }
        }
    }
}

#[test]
fn test_huge_normal_delta_stays_finite() {
    let geometry = OrbitalGeometrySnapshot::circular(700_000.0, 7_000.0, 0.0);
    let raw = MomentumVector::new(0.0, 1e12, 0.0);

    let delta = correct(MomentumVector::ZERO, raw, &geometry, Axis::Normal, EPS).unwrap();

    assert!(delta.is_finite());
}

#[test]
fn test_two_reversals_cancel() {
    init_tracing();

    for geometry in geometry_samples() {
        for reference in references() {
            let frame = TargetFrame::derive(&reference, &geometry, EPS).unwrap();
            let (_, level) = frame.split_level();
            let raw = reference.offset(Axis::Normal, 4.0 * level.norm());

            let delta = correct(reference, raw, &geometry, Axis::Normal, EPS).unwrap();

            assert_abs_diff_eq!(delta.to_vec3(), Vec3::zeros(), epsilon = 1e-6);
        }
    }
}

#[test]
fn test_idle_ticks_are_idempotent() {
    let geometry = OrbitalGeometrySnapshot::circular(700_000.0, 7_000.0, 0.0);
    let initial = MomentumVector::new(1.0, 2.0, 3.0);
    let mut engine = CorrectionEngine::new(initial, CorrectionConfig::default());

    for _ in 0..10 {
        let drifted = MomentumVector::new(100.0, 200.0, 300.0);
        assert_eq!(engine.tick(drifted, &geometry), TickOutcome::Idle);
        assert_eq!(engine.reference(), initial);
    }
}
