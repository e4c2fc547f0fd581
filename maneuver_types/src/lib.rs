//! # Maneuver Types
//!
//! Value types exchanged between the maneuver host, the correction engine
//! and the session registry.
//!
//! ## Philosophy
//!
//! - **Named axes**: Components are `radial`, `normal`, `prograde`, never bare indices
//! - **Snapshots, not handles**: Orbital geometry is a plain value fetched per tick
//! - **Testable**: Everything here is serializable and can be built by hand in tests
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - An orbit propagator (the host supplies geometry)
//! - A general linear algebra library (see `nalgebra`)

use core::fmt;
use core::ops::{Add, Sub};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// 3D vector type used for all frame math.
pub type Vec3 = Vector3<f64>;

/// A velocity change in maneuver-local coordinates
///
/// Component order matches the host's stored delta-vector:
/// x = radial, y = normal, z = prograde.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MomentumVector {
    pub radial: f64,
    pub normal: f64,
    pub prograde: f64,
}

impl MomentumVector {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(radial: f64, normal: f64, prograde: f64) -> Self {
        Self {
            radial,
            normal,
            prograde,
        }
    }

    /// Returns the component along `axis`
    pub fn component(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Radial => self.radial,
            Axis::Normal => self.normal,
            Axis::Prograde => self.prograde,
        }
    }

    /// Returns a copy with `amount` added along `axis`
    pub fn offset(mut self, axis: Axis, amount: f64) -> Self {
        match axis {
            Axis::Radial => self.radial += amount,
            Axis::Normal => self.normal += amount,
            Axis::Prograde => self.prograde += amount,
        }
        self
    }

    pub fn magnitude(&self) -> f64 {
        self.to_vec3().norm()
    }

    /// True when no component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.radial.is_finite() && self.normal.is_finite() && self.prograde.is_finite()
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.radial, self.normal, self.prograde)
    }

    pub fn from_vec3(v: &Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl Add for MomentumVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.radial + rhs.radial,
            self.normal + rhs.normal,
            self.prograde + rhs.prograde,
        )
    }
}

impl Sub for MomentumVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.radial - rhs.radial,
            self.normal - rhs.normal,
            self.prograde - rhs.prograde,
        )
    }
}

impl From<Vec3> for MomentumVector {
    fn from(v: Vec3) -> Self {
        Self::from_vec3(&v)
    }
}

impl From<MomentumVector> for Vec3 {
    fn from(v: MomentumVector) -> Self {
        v.to_vec3()
    }
}

impl fmt::Display for MomentumVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(radial {:.3}, normal {:.3}, prograde {:.3})",
            self.radial, self.normal, self.prograde
        )
    }
}

/// One of the three maneuver-local axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Radial,
    Normal,
    Prograde,
}

impl Axis {
    /// Axes in the order pending changes are processed
    pub const PRIORITY: [Axis; 3] = [Axis::Prograde, Axis::Normal, Axis::Radial];

    fn bit(self) -> u8 {
        match self {
            Axis::Radial => 1 << 0,
            Axis::Normal => 1 << 1,
            Axis::Prograde => 1 << 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Radial => write!(f, "radial"),
            Axis::Normal => write!(f, "normal"),
            Axis::Prograde => write!(f, "prograde"),
        }
    }
}

/// Set of axes with pending raw changes
///
/// Bitflags, one bit per [`Axis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AxisSet {
    bits: u8,
}

impl AxisSet {
    pub const EMPTY: Self = Self { bits: 0 };

    pub fn empty() -> Self {
        Self::EMPTY
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Returns a copy with `axis` added
    pub fn with(mut self, axis: Axis) -> Self {
        self.insert(axis);
        self
    }

    pub fn insert(&mut self, axis: Axis) {
        self.bits |= axis.bit();
    }

    pub fn remove(&mut self, axis: Axis) {
        self.bits &= !axis.bit();
    }

    pub fn contains(&self, axis: Axis) -> bool {
        self.bits & axis.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// The axis to process first: prograde, then normal, then radial
    pub fn highest_priority(&self) -> Option<Axis> {
        Axis::PRIORITY.into_iter().find(|axis| self.contains(*axis))
    }
}

impl fmt::Display for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let parts: Vec<String> = Axis::PRIORITY
            .into_iter()
            .filter(|axis| self.contains(*axis))
            .map(|axis| axis.to_string())
            .collect();
        write!(f, "{}", parts.join("+"))
    }
}

/// One draggable handle of a maneuver gizmo
///
/// Handles come in opposing pairs; both members of a pair report on the
/// same axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GizmoHandle {
    Prograde,
    Retrograde,
    Normal,
    AntiNormal,
    RadialIn,
    RadialOut,
}

impl GizmoHandle {
    pub const ALL: [GizmoHandle; 6] = [
        GizmoHandle::Prograde,
        GizmoHandle::Retrograde,
        GizmoHandle::Normal,
        GizmoHandle::AntiNormal,
        GizmoHandle::RadialIn,
        GizmoHandle::RadialOut,
    ];

    /// The axis this handle moves along
    pub fn axis(self) -> Axis {
        match self {
            GizmoHandle::Prograde | GizmoHandle::Retrograde => Axis::Prograde,
            GizmoHandle::Normal | GizmoHandle::AntiNormal => Axis::Normal,
            GizmoHandle::RadialIn | GizmoHandle::RadialOut => Axis::Radial,
        }
    }

    /// +1.0 when dragging outward grows the axis component, -1.0 otherwise
    pub fn sign(self) -> f64 {
        match self {
            GizmoHandle::Prograde | GizmoHandle::Normal | GizmoHandle::RadialOut => 1.0,
            GizmoHandle::Retrograde | GizmoHandle::AntiNormal | GizmoHandle::RadialIn => -1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GizmoHandle::Prograde => "prograde",
            GizmoHandle::Retrograde => "retrograde",
            GizmoHandle::Normal => "normal",
            GizmoHandle::AntiNormal => "antinormal",
            GizmoHandle::RadialIn => "radial-in",
            GizmoHandle::RadialOut => "radial-out",
        }
    }

    /// Parses a handle name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "prograde" | "pro" => Some(GizmoHandle::Prograde),
            "retrograde" | "retro" => Some(GizmoHandle::Retrograde),
            "normal" => Some(GizmoHandle::Normal),
            "antinormal" | "anti-normal" => Some(GizmoHandle::AntiNormal),
            "radial-in" | "radialin" => Some(GizmoHandle::RadialIn),
            "radial-out" | "radialout" | "radial" => Some(GizmoHandle::RadialOut),
            _ => None,
        }
    }
}

impl fmt::Display for GizmoHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Orbital geometry at a maneuver's epoch
///
/// Produced by the host's orbit propagator and valid for one tick only.
/// Angles are radians, lengths and speeds in host units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalGeometrySnapshot {
    pub orbital_speed: f64,
    pub true_anomaly: f64,
    pub eccentric_anomaly: f64,
    pub semi_major_axis: f64,
    pub semi_minor_axis: f64,
    pub eccentricity: f64,
}

impl OrbitalGeometrySnapshot {
    /// Geometry of a circular orbit of `radius` at eccentric anomaly `anomaly`
    pub fn circular(radius: f64, orbital_speed: f64, anomaly: f64) -> Self {
        Self {
            orbital_speed,
            true_anomaly: anomaly,
            eccentric_anomaly: anomaly,
            semi_major_axis: radius,
            semi_minor_axis: radius,
            eccentricity: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.orbital_speed.is_finite()
            && self.true_anomaly.is_finite()
            && self.eccentric_anomaly.is_finite()
            && self.semi_major_axis.is_finite()
            && self.semi_minor_axis.is_finite()
            && self.eccentricity.is_finite()
    }
}
