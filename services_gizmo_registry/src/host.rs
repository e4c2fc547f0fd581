//! Collaborator contracts the registry drives.
//!
//! The host owns the maneuvers, their gizmos and the orbit propagation. The
//! registry only enumerates sessions, reads and writes vectors, and
//! subscribes listeners through these traits.

use crate::listener::{ChangeListener, DeletionListener};
use core_types::{ListenerId, SessionId};
use maneuver_types::{GizmoHandle, MomentumVector, OrbitalGeometrySnapshot};
use thiserror::Error;

/// Errors reported by a host
///
/// None of these are fatal to the registry; the affected session is skipped
/// for the tick.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("Handle {handle} unavailable on {session}")]
    HandleUnavailable {
        session: SessionId,
        handle: GizmoHandle,
    },

    #[error("Listener not found: {0}")]
    ListenerNotFound(ListenerId),

    #[error("Geometry unavailable for {session}: {reason}")]
    GeometryUnavailable { session: SessionId, reason: String },

    #[error("Write rejected for {session}: {reason}")]
    WriteRejected { session: SessionId, reason: String },
}

/// Source of maneuver-edit sessions
pub trait SessionSource {
    /// Sessions currently open, in the host's order
    fn sessions(&self) -> Vec<SessionId>;

    /// The maneuver's stored vector
    fn vector(&self, session: SessionId) -> Result<MomentumVector, SessionError>;

    /// Writes a corrected vector back to the maneuver and its gizmo
    ///
    /// The registry only adopts the vector as its reference when this
    /// returns `Ok`.
    fn set_vector(&mut self, session: SessionId, vector: MomentumVector)
        -> Result<(), SessionError>;

    /// The maneuver's epoch (host time units)
    fn epoch(&self, session: SessionId) -> Result<f64, SessionError>;

    /// Subscribes `listener` to raw changes of one handle
    ///
    /// Fails with [`SessionError::HandleUnavailable`] while the gizmo has not
    /// created that handle yet.
    fn subscribe_handle(
        &mut self,
        session: SessionId,
        handle: GizmoHandle,
        listener: ChangeListener,
    ) -> Result<ListenerId, SessionError>;

    fn unsubscribe_handle(
        &mut self,
        session: SessionId,
        handle: GizmoHandle,
        listener: ListenerId,
    ) -> Result<(), SessionError>;

    /// Subscribes `listener` to the session's deletion
    fn subscribe_deletion(
        &mut self,
        session: SessionId,
        listener: DeletionListener,
    ) -> Result<ListenerId, SessionError>;

    fn unsubscribe_deletion(
        &mut self,
        session: SessionId,
        listener: ListenerId,
    ) -> Result<(), SessionError>;
}

/// Orbit propagation at a maneuver's epoch
pub trait OrbitPropagator {
    fn geometry_at(
        &self,
        session: SessionId,
        epoch: f64,
    ) -> Result<OrbitalGeometrySnapshot, SessionError>;
}

/// Everything the registry needs from the host
pub trait ManeuverHost: SessionSource + OrbitPropagator {}

impl<T: SessionSource + OrbitPropagator + ?Sized> ManeuverHost for T {}
