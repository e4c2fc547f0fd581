//! # Gizmo Correction
//!
//! Turns a raw single-axis handle delta into the 3D change the user meant.
//!
//! ## Philosophy
//!
//! - **Deferred, not inline**: Handle callbacks only mark an axis; the work happens on tick
//! - **One axis per tick**: Prograde, then normal, then radial
//! - **Never fatal**: Bad geometry skips the tick and leaves the maneuver untouched
//!
//! ## Background
//!
//! The host's handles move the maneuver vector along its stored radial,
//! normal and prograde axes. Those axes are only the true directions while
//! the vector is zero. Once a burn is planned the real post-maneuver
//! velocity points elsewhere, so each raw delta is re-expressed against the
//! target frame:
//!
//! - prograde scales along the target velocity direction
//! - normal rotates the level part of the target velocity around the
//!   vessel-to-primary axis
//! - radial rotates the whole target velocity within the orbital plane
//!
//! ## Example
//!
//! ```
//! use gizmo_correction::{CorrectionConfig, CorrectionEngine, TickOutcome};
//! use maneuver_types::{Axis, MomentumVector, OrbitalGeometrySnapshot};
//!
//! let geometry = OrbitalGeometrySnapshot::circular(700_000.0, 7_000.0, 0.0);
//! let mut engine = CorrectionEngine::new(MomentumVector::ZERO, CorrectionConfig::default());
//!
//! engine.pending().mark(Axis::Prograde);
//! let raw = MomentumVector::new(0.0, 0.0, 50.0);
//!
//! match engine.tick(raw, &geometry) {
//!     TickOutcome::Corrected { axis, vector, .. } => {
//!         assert!((vector.prograde - 50.0).abs() < 1e-9);
//!         engine.commit(axis, vector);
//!     }
//!     other => panic!("unexpected outcome {:?}", other),
//! }
//! assert!(engine.pending().is_empty());
//! ```

pub mod config;
pub mod fold;
pub mod frame;
pub mod pending;

pub use config::{ConfigError, CorrectionConfig};
pub use frame::TargetFrame;
pub use pending::PendingChanges;

use maneuver_types::{Axis, MomentumVector, OrbitalGeometrySnapshot, Vec3};
use thiserror::Error;
use tracing::trace;

/// Reasons a correction could not be computed this tick
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CorrectionError {
    #[error("Degenerate geometry: {quantity} magnitude {magnitude:e} below epsilon")]
    DegenerateGeometry {
        quantity: &'static str,
        magnitude: f64,
    },

    #[error("Non-finite input: {quantity}")]
    NonFiniteInput { quantity: &'static str },
}

/// Result of one engine tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing pending
    Idle,
    /// Corrections are switched off; the reference was resynchronized to the
    /// raw vector and pending changes dropped
    Disabled,
    /// `vector` must be written to the maneuver, then committed as the new
    /// reference
    Corrected {
        axis: Axis,
        delta: MomentumVector,
        vector: MomentumVector,
    },
    /// The correction for `axis` was skipped; the axis stays pending
    Skipped { axis: Axis, error: CorrectionError },
}

/// Computes the corrected change for a raw edit on `axis`.
///
/// `reference` is the last vector the engine wrote (or saw at creation);
/// `raw` is the maneuver's vector now. Only the `axis` component of
/// `raw - reference` is used.
pub fn correct(
    reference: MomentumVector,
    raw: MomentumVector,
    geometry: &OrbitalGeometrySnapshot,
    axis: Axis,
    epsilon: f64,
) -> Result<MomentumVector, CorrectionError> {
    if !geometry.is_finite() {
        return Err(CorrectionError::NonFiniteInput {
            quantity: "orbital geometry",
        });
    }
    if !reference.is_finite() || !raw.is_finite() {
        return Err(CorrectionError::NonFiniteInput {
            quantity: "maneuver vector",
        });
    }

    let change = raw - reference;
    let frame = TargetFrame::derive(&reference, geometry, epsilon)?;
    let speed = geometry.orbital_speed;
    let reference = reference.to_vec3();

    let delta = match axis {
        Axis::Prograde => frame.unit_prograde * change.prograde,
        Axis::Normal => {
            let (along, level) = frame.split_level();
            let level_magnitude = level.norm();
            if level_magnitude < epsilon {
                return Err(CorrectionError::DegenerateGeometry {
                    quantity: "prograde level",
                    magnitude: level_magnitude,
                });
            }

            let angle = fold::rotation_angle(change.normal, level_magnitude);
            trace!(
                angle = %format!("{:.6}", angle),
                level = %format!("{:.3}", level_magnitude),
                "Normal correction angle"
            );

            let rotated = (level / level_magnitude * angle.cos() + frame.unit_normal * angle.sin())
                * level_magnitude;
            without_orbital_speed(rotated + along - reference, speed)
        }
        Axis::Radial => {
            let magnitude = frame.target_prograde.norm();

            let angle = fold::rotation_angle(change.radial, magnitude);
            trace!(
                angle = %format!("{:.6}", angle),
                magnitude = %format!("{:.3}", magnitude),
                "Radial correction angle"
            );

            let rotated =
                (frame.unit_prograde * angle.cos() + frame.unit_radial * angle.sin()) * magnitude;
            without_orbital_speed(rotated - reference, speed)
        }
    };

    let delta = MomentumVector::from(delta);
    if !delta.is_finite() {
        return Err(CorrectionError::NonFiniteInput {
            quantity: "corrected delta",
        });
    }
    Ok(delta)
}

/// The target vector carries the orbital speed on its prograde axis; the
/// maneuver vector must not.
fn without_orbital_speed(mut delta: Vec3, speed: f64) -> Vec3 {
    delta.z -= speed;
    delta
}

/// Correction state for one edit session
///
/// Holds the reference vector (the value the maneuver had after the last
/// processed tick) and the pending axes shared with the handle listeners.
#[derive(Debug)]
pub struct CorrectionEngine {
    reference: MomentumVector,
    pending: PendingChanges,
    config: CorrectionConfig,
}

impl CorrectionEngine {
    /// Creates an engine whose reference is the maneuver's current vector
    pub fn new(initial: MomentumVector, config: CorrectionConfig) -> Self {
        Self {
            reference: initial,
            pending: PendingChanges::new(),
            config,
        }
    }

    pub fn reference(&self) -> MomentumVector {
        self.reference
    }

    /// Handle to the pending set, for wiring into listeners
    pub fn pending(&self) -> PendingChanges {
        self.pending.clone()
    }

    pub fn config(&self) -> CorrectionConfig {
        self.config
    }

    pub fn set_config(&mut self, config: CorrectionConfig) {
        self.config = config;
    }

    /// Runs one tick against the maneuver's current vector and geometry.
    ///
    /// Does nothing when no axis is pending. Otherwise computes the
    /// correction for the single highest-priority pending axis. A
    /// `Corrected` outcome leaves the engine untouched until it is passed to
    /// [`CorrectionEngine::commit`] once the host accepted the vector.
    pub fn tick(&mut self, raw: MomentumVector, geometry: &OrbitalGeometrySnapshot) -> TickOutcome {
        let Some(axis) = self.pending.snapshot().highest_priority() else {
            return TickOutcome::Idle;
        };

        if !self.config.enabled {
            self.reference = raw;
            self.pending.clear_all();
            return TickOutcome::Disabled;
        }

        match correct(
            self.reference,
            raw,
            geometry,
            axis,
            self.config.degenerate_epsilon,
        ) {
            Ok(delta) => TickOutcome::Corrected {
                axis,
                delta,
                vector: self.reference + delta,
            },
            Err(error) => TickOutcome::Skipped { axis, error },
        }
    }

    /// Adopts a written vector as the new reference and clears its axis
    pub fn commit(&mut self, axis: Axis, vector: MomentumVector) {
        self.reference = vector;
        self.pending.clear(axis);
    }
}
