//! Target frame reconstruction.
//!
//! The handles move along the maneuver's stored axes, which drift away from
//! the real prograde/normal/radial directions once the maneuver carries a
//! non-zero vector. The target frame is the set of unit directions implied by
//! the reference vector and the orbital geometry at the epoch.

use crate::CorrectionError;
use maneuver_types::{MomentumVector, OrbitalGeometrySnapshot, Vec3};

/// Unit directions of the post-maneuver velocity at the epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetFrame {
    /// Vessel-to-primary direction in maneuver coordinates (not normalized)
    pub downward: Vec3,
    /// Reference vector plus orbital speed along prograde
    pub target_prograde: Vec3,
    pub unit_prograde: Vec3,
    pub unit_normal: Vec3,
    pub unit_radial: Vec3,
}

impl TargetFrame {
    /// Derives the frame for `reference` on the orbit described by `geometry`.
    pub fn derive(
        reference: &MomentumVector,
        geometry: &OrbitalGeometrySnapshot,
        epsilon: f64,
    ) -> Result<Self, CorrectionError> {
        let downward = maneuver_downward(geometry);
        let downward_magnitude = downward.norm();
        check_magnitude("downward", downward_magnitude, epsilon)?;

        let target_prograde = reference.to_vec3() + Vec3::z() * geometry.orbital_speed;
        let prograde_magnitude = target_prograde.norm();
        check_magnitude("target prograde", prograde_magnitude, epsilon)?;
        let unit_prograde = target_prograde / prograde_magnitude;

        // Compared as the sine between downward and prograde so the check
        // does not depend on the orbit's scale.
        let normal = downward.cross(&target_prograde);
        let normal_magnitude = normal.norm();
        check_magnitude(
            "target normal",
            normal_magnitude / (downward_magnitude * prograde_magnitude),
            epsilon,
        )?;
        let unit_normal = normal / normal_magnitude;

        let unit_radial = unit_normal.cross(&unit_prograde);

        Ok(Self {
            downward,
            target_prograde,
            unit_prograde,
            unit_normal,
            unit_radial,
        })
    }

    /// Splits the target prograde into its downward-parallel part and the
    /// level part orthogonal to it, returned in that order.
    pub fn split_level(&self) -> (Vec3, Vec3) {
        let along = self.downward
            * (self.target_prograde.dot(&self.downward) / self.downward.norm_squared());
        (along, self.target_prograde - along)
    }
}

/// Vessel-to-primary vector rotated from the orbital plane basis into
/// maneuver coordinates. The normal component is always zero.
pub fn maneuver_downward(geometry: &OrbitalGeometrySnapshot) -> Vec3 {
    let a = geometry.semi_major_axis;
    let b = geometry.semi_minor_axis;
    let (sin_e, cos_e) = geometry.eccentric_anomaly.sin_cos();

    let plane_x = a * (geometry.eccentricity - cos_e);
    let plane_y = -b * sin_e;

    let rotation = -(b * cos_e).atan2(-a * sin_e);
    let (sin_r, cos_r) = rotation.sin_cos();

    Vec3::new(
        -(sin_r * plane_x + cos_r * plane_y),
        0.0,
        cos_r * plane_x - sin_r * plane_y,
    )
}

fn check_magnitude(
    quantity: &'static str,
    magnitude: f64,
    epsilon: f64,
) -> Result<(), CorrectionError> {
    if !magnitude.is_finite() {
        return Err(CorrectionError::NonFiniteInput { quantity });
    }
    if magnitude < epsilon {
        return Err(CorrectionError::DegenerateGeometry {
            quantity,
            magnitude,
        });
    }
    Ok(())
}
