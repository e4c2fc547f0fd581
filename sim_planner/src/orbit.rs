//! Two-body Keplerian orbits for the simulated planner.
//!
//! Elliptical orbits only. This is a fixture for driving the registry, not a
//! general propagator.

use maneuver_types::OrbitalGeometrySnapshot;
use std::f64::consts::{PI, TAU};
use thiserror::Error;

const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: usize = 64;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrbitError {
    #[error("Eccentricity must be in [0, 1), got {0}")]
    Eccentricity(f64),

    #[error("Semi-major axis must be positive, got {0}")]
    SemiMajorAxis(f64),

    #[error("Gravitational parameter must be positive, got {0}")]
    GravitationalParameter(f64),
}

/// Closed orbit around a point mass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerOrbit {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub gravitational_parameter: f64,
    /// Time of periapsis passage
    pub periapsis_epoch: f64,
}

impl KeplerOrbit {
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        gravitational_parameter: f64,
        periapsis_epoch: f64,
    ) -> Result<Self, OrbitError> {
        let orbit = Self {
            semi_major_axis,
            eccentricity,
            gravitational_parameter,
            periapsis_epoch,
        };
        orbit.validate()?;
        Ok(orbit)
    }

    /// Circular orbit of `radius` travelling at `speed`
    pub fn circular(radius: f64, speed: f64) -> Result<Self, OrbitError> {
        Self::new(radius, 0.0, speed * speed * radius, 0.0)
    }

    /// Orbit from periapsis and apoapsis radii
    pub fn from_apsides(
        periapsis: f64,
        apoapsis: f64,
        gravitational_parameter: f64,
    ) -> Result<Self, OrbitError> {
        let semi_major_axis = (periapsis + apoapsis) / 2.0;
        let eccentricity = (apoapsis - periapsis) / (apoapsis + periapsis);
        Self::new(semi_major_axis, eccentricity, gravitational_parameter, 0.0)
    }

    pub fn validate(&self) -> Result<(), OrbitError> {
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(OrbitError::Eccentricity(self.eccentricity));
        }
        if !(self.semi_major_axis > 0.0) {
            return Err(OrbitError::SemiMajorAxis(self.semi_major_axis));
        }
        if !(self.gravitational_parameter > 0.0) {
            return Err(OrbitError::GravitationalParameter(
                self.gravitational_parameter,
            ));
        }
        Ok(())
    }

    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity).sqrt()
    }

    pub fn period(&self) -> f64 {
        TAU / self.mean_motion()
    }

    pub fn mean_motion(&self) -> f64 {
        (self.gravitational_parameter / self.semi_major_axis.powi(3)).sqrt()
    }

    /// Mean anomaly at `epoch`, wrapped to `[-PI, PI)`
    pub fn mean_anomaly_at(&self, epoch: f64) -> f64 {
        let raw = self.mean_motion() * (epoch - self.periapsis_epoch);
        (raw + PI).rem_euclid(TAU) - PI
    }

    /// Solves Kepler's equation `M = E - e sin E` with Newton's method
    pub fn eccentric_anomaly_at(&self, epoch: f64) -> f64 {
        let mean = self.mean_anomaly_at(epoch);
        let e = self.eccentricity;
        let mut anomaly = if e < 0.8 { mean } else { PI.copysign(mean) };

        for _ in 0..KEPLER_MAX_ITERATIONS {
            let step = (anomaly - e * anomaly.sin() - mean) / (1.0 - e * anomaly.cos());
            anomaly -= step;
            if step.abs() < KEPLER_TOLERANCE {
                break;
            }
        }
        anomaly
    }

    pub fn true_anomaly_from_eccentric(&self, eccentric_anomaly: f64) -> f64 {
        let e = self.eccentricity;
        let half = eccentric_anomaly / 2.0;
        2.0 * ((1.0 + e).sqrt() * half.sin()).atan2((1.0 - e).sqrt() * half.cos())
    }

    pub fn radius_from_eccentric(&self, eccentric_anomaly: f64) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * eccentric_anomaly.cos())
    }

    /// Vis-viva speed at `radius`
    pub fn speed_at_radius(&self, radius: f64) -> f64 {
        (self.gravitational_parameter * (2.0 / radius - 1.0 / self.semi_major_axis)).sqrt()
    }

    pub fn geometry_at(&self, epoch: f64) -> OrbitalGeometrySnapshot {
        let eccentric_anomaly = self.eccentric_anomaly_at(epoch);
        let radius = self.radius_from_eccentric(eccentric_anomaly);

        OrbitalGeometrySnapshot {
            orbital_speed: self.speed_at_radius(radius),
            true_anomaly: self.true_anomaly_from_eccentric(eccentric_anomaly),
            eccentric_anomaly,
            semi_major_axis: self.semi_major_axis,
            semi_minor_axis: self.semi_minor_axis(),
            eccentricity: self.eccentricity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_circular_speed_is_constant() {
        let orbit = KeplerOrbit::circular(700_000.0, 7_000.0).unwrap();
        for epoch in [0.0, 10.0, 250.0, 4_000.0] {
            let geometry = orbit.geometry_at(epoch);
            assert_relative_eq!(geometry.orbital_speed, 7_000.0, epsilon = 1e-6);
            assert_relative_eq!(geometry.semi_minor_axis, 700_000.0);
            assert_relative_eq!(geometry.true_anomaly, geometry.eccentric_anomaly, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_kepler_solution_satisfies_equation() {
        for e in [0.0, 0.1, 0.5, 0.85, 0.97] {
            let orbit = KeplerOrbit::new(1_000_000.0, e, 3.5e12, 0.0).unwrap();
            for fraction in [0.01, 0.2, 0.49, 0.51, 0.9] {
                let epoch = orbit.period() * fraction;
                let eccentric = orbit.eccentric_anomaly_at(epoch);
                let mean = orbit.mean_anomaly_at(epoch);
                assert_relative_eq!(eccentric - e * eccentric.sin(), mean, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_periapsis_and_apoapsis_speeds() {
        let orbit = KeplerOrbit::from_apsides(600_000.0, 1_800_000.0, 3.5e12).unwrap();
        assert_relative_eq!(orbit.eccentricity, 0.5);

        let at_periapsis = orbit.geometry_at(0.0);
        let at_apoapsis = orbit.geometry_at(orbit.period() / 2.0);

        assert!(at_periapsis.orbital_speed > at_apoapsis.orbital_speed);
        // angular momentum is conserved at the apsides
        assert_relative_eq!(
            at_periapsis.orbital_speed * 600_000.0,
            at_apoapsis.orbital_speed * 1_800_000.0,
            max_relative = 1e-6
        );
    }

    #[test]
    fn test_rejects_open_orbits() {
        assert_eq!(
            KeplerOrbit::new(1.0, 1.2, 1.0, 0.0),
            Err(OrbitError::Eccentricity(1.2))
        );
        assert_eq!(
            KeplerOrbit::new(-5.0, 0.1, 1.0, 0.0),
            Err(OrbitError::SemiMajorAxis(-5.0))
        );
        assert_eq!(
            KeplerOrbit::new(5.0, 0.1, 0.0, 0.0),
            Err(OrbitError::GravitationalParameter(0.0))
        );
    }
}
