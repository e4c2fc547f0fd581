//! # Simulated Maneuver Planner
//!
//! A deterministic in-memory host for the gizmo registry.
//!
//! ## Philosophy
//!
//! - **Simulation first**: Every host behavior the registry depends on can be reproduced in a test
//! - **Explicit input**: Handle drags, deletions and epoch changes are injected, never ambient
//! - **Faithful callbacks**: Listeners fire synchronously, exactly as a UI host would
//!
//! ## Features
//!
//! - Sessions on Keplerian orbits (see [`orbit`])
//! - Six handles per session that may appear late
//! - Deletion that fires during a write-back, for mid-tick removal tests
//! - Geometry overrides for exact or corrupted snapshots
//! - Line-based drag scripts (see [`drag_script`])

pub mod drag_script;
pub mod orbit;

pub use drag_script::{DragScript, DragScriptError, ScriptSummary, ScriptedAction};
pub use orbit::{KeplerOrbit, OrbitError};

use core_types::{ListenerId, SessionId};
use maneuver_types::{GizmoHandle, MomentumVector, OrbitalGeometrySnapshot};
use services_gizmo_registry::{
    ChangeListener, DeletionListener, OrbitPropagator, SessionError, SessionSource,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// One open gizmo in the simulation
#[derive(Debug)]
struct SimSession {
    id: SessionId,
    vector: MomentumVector,
    epoch: f64,
    orbit: KeplerOrbit,
    geometry_override: Option<OrbitalGeometrySnapshot>,
    hidden_handles: BTreeSet<GizmoHandle>,
    handle_listeners: BTreeMap<GizmoHandle, Vec<(ListenerId, ChangeListener)>>,
    deletion_listeners: Vec<(ListenerId, DeletionListener)>,
    delete_on_write: bool,
    read_only: bool,
}

/// Simulated planner host
#[derive(Debug, Default)]
pub struct SimPlanner {
    sessions: Vec<SimSession>,
    next_listener: u64,
    writes: usize,
}

impl SimPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an edit session on a maneuver at `epoch`
    pub fn open_session(
        &mut self,
        orbit: KeplerOrbit,
        epoch: f64,
        vector: MomentumVector,
    ) -> SessionId {
        let id = SessionId::new();
        self.sessions.push(SimSession {
            id,
            vector,
            epoch,
            orbit,
            geometry_override: None,
            hidden_handles: BTreeSet::new(),
            handle_listeners: BTreeMap::new(),
            deletion_listeners: Vec::new(),
            delete_on_write: false,
            read_only: false,
        });
        debug!(session = %id, epoch = epoch, "Simulated session opened");
        id
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Number of vectors written back by the registry so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Moves a handle by `amount` along its raw axis and notifies its
    /// listeners. Returns the number of deliveries.
    pub fn drag(
        &mut self,
        session: SessionId,
        handle: GizmoHandle,
        amount: f64,
    ) -> Result<usize, SessionError> {
        let sim = self.session_mut(session)?;
        if sim.hidden_handles.contains(&handle) {
            return Err(SessionError::HandleUnavailable { session, handle });
        }

        let axis = handle.axis();
        sim.vector = sim.vector.offset(axis, handle.sign() * amount);
        let raw_value = sim.vector.component(axis);

        let listeners = sim
            .handle_listeners
            .get(&handle)
            .cloned()
            .unwrap_or_default();
        for (_, listener) in &listeners {
            listener.notify(raw_value);
        }
        Ok(listeners.len())
    }

    /// Replaces the vector without notifying any handle, like a typed edit
    pub fn edit_vector(
        &mut self,
        session: SessionId,
        vector: MomentumVector,
    ) -> Result<(), SessionError> {
        self.session_mut(session)?.vector = vector;
        Ok(())
    }

    pub fn set_epoch(&mut self, session: SessionId, epoch: f64) -> Result<(), SessionError> {
        self.session_mut(session)?.epoch = epoch;
        Ok(())
    }

    /// Forces the geometry reported for `session`; `None` restores the orbit
    pub fn override_geometry(
        &mut self,
        session: SessionId,
        geometry: Option<OrbitalGeometrySnapshot>,
    ) -> Result<(), SessionError> {
        self.session_mut(session)?.geometry_override = geometry;
        Ok(())
    }

    /// Hides a handle; subscriptions to it fail until shown again
    pub fn hide_handle(
        &mut self,
        session: SessionId,
        handle: GizmoHandle,
    ) -> Result<(), SessionError> {
        self.session_mut(session)?.hidden_handles.insert(handle);
        Ok(())
    }

    pub fn show_handle(
        &mut self,
        session: SessionId,
        handle: GizmoHandle,
    ) -> Result<(), SessionError> {
        self.session_mut(session)?.hidden_handles.remove(&handle);
        Ok(())
    }

    /// Makes the host refuse vector writes for `session`, as a locked node would
    pub fn set_read_only(
        &mut self,
        session: SessionId,
        read_only: bool,
    ) -> Result<(), SessionError> {
        self.session_mut(session)?.read_only = read_only;
        Ok(())
    }

    /// Deletes the session the next time a vector is written to it
    pub fn delete_on_next_write(&mut self, session: SessionId) -> Result<(), SessionError> {
        self.session_mut(session)?.delete_on_write = true;
        Ok(())
    }

    /// Closes a session and fires its deletion listeners
    pub fn delete_session(&mut self, session: SessionId) -> Result<(), SessionError> {
        let index = self
            .sessions
            .iter()
            .position(|s| s.id == session)
            .ok_or(SessionError::SessionNotFound(session))?;
        let removed = self.sessions.remove(index);
        debug!(session = %session, "Simulated session deleted");
        for (_, listener) in &removed.deletion_listeners {
            listener.notify();
        }
        Ok(())
    }

    /// Live subscriptions on one handle
    pub fn handle_subscriptions(&self, session: SessionId, handle: GizmoHandle) -> usize {
        self.session(session)
            .ok()
            .and_then(|s| s.handle_listeners.get(&handle))
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Live subscriptions of every kind across all sessions
    pub fn total_subscriptions(&self) -> usize {
        self.sessions
            .iter()
            .map(|s| {
                s.handle_listeners.values().map(Vec::len).sum::<usize>()
                    + s.deletion_listeners.len()
            })
            .sum()
    }

    fn next_listener_id(&mut self) -> ListenerId {
        self.next_listener += 1;
        ListenerId::new(self.next_listener)
    }

    fn session(&self, session: SessionId) -> Result<&SimSession, SessionError> {
        self.sessions
            .iter()
            .find(|s| s.id == session)
            .ok_or(SessionError::SessionNotFound(session))
    }

    fn session_mut(&mut self, session: SessionId) -> Result<&mut SimSession, SessionError> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == session)
            .ok_or(SessionError::SessionNotFound(session))
    }
}

impl SessionSource for SimPlanner {
    fn sessions(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|s| s.id).collect()
    }

    fn vector(&self, session: SessionId) -> Result<MomentumVector, SessionError> {
        self.session(session).map(|s| s.vector)
    }

    fn set_vector(
        &mut self,
        session: SessionId,
        vector: MomentumVector,
    ) -> Result<(), SessionError> {
        let sim = self.session_mut(session)?;
        if sim.read_only {
            return Err(SessionError::WriteRejected {
                session,
                reason: "maneuver is read-only".to_string(),
            });
        }
        sim.vector = vector;
        let doomed = sim.delete_on_write;
        self.writes += 1;

        if doomed {
            self.delete_session(session)?;
        }
        Ok(())
    }

    fn epoch(&self, session: SessionId) -> Result<f64, SessionError> {
        self.session(session).map(|s| s.epoch)
    }

    fn subscribe_handle(
        &mut self,
        session: SessionId,
        handle: GizmoHandle,
        listener: ChangeListener,
    ) -> Result<ListenerId, SessionError> {
        if self.session(session)?.hidden_handles.contains(&handle) {
            return Err(SessionError::HandleUnavailable { session, handle });
        }
        let id = self.next_listener_id();
        self.session_mut(session)?
            .handle_listeners
            .entry(handle)
            .or_default()
            .push((id, listener));
        Ok(id)
    }

    fn unsubscribe_handle(
        &mut self,
        session: SessionId,
        handle: GizmoHandle,
        listener: ListenerId,
    ) -> Result<(), SessionError> {
        let listeners = self
            .session_mut(session)?
            .handle_listeners
            .get_mut(&handle)
            .ok_or(SessionError::ListenerNotFound(listener))?;
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != listener);
        if listeners.len() == before {
            return Err(SessionError::ListenerNotFound(listener));
        }
        Ok(())
    }

    fn subscribe_deletion(
        &mut self,
        session: SessionId,
        listener: DeletionListener,
    ) -> Result<ListenerId, SessionError> {
        self.session(session)?;
        let id = self.next_listener_id();
        self.session_mut(session)?
            .deletion_listeners
            .push((id, listener));
        Ok(id)
    }

    fn unsubscribe_deletion(
        &mut self,
        session: SessionId,
        listener: ListenerId,
    ) -> Result<(), SessionError> {
        let listeners = &mut self.session_mut(session)?.deletion_listeners;
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != listener);
        if listeners.len() == before {
            return Err(SessionError::ListenerNotFound(listener));
        }
        Ok(())
    }
}

impl OrbitPropagator for SimPlanner {
    fn geometry_at(
        &self,
        session: SessionId,
        epoch: f64,
    ) -> Result<OrbitalGeometrySnapshot, SessionError> {
        let sim = self.session(session)?;
        Ok(sim
            .geometry_override
            .unwrap_or_else(|| sim.orbit.geometry_at(epoch)))
    }
}
