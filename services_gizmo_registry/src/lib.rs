//! # Gizmo Session Registry
//!
//! Keeps one correction engine per open maneuver-edit session.
//!
//! ## Philosophy
//!
//! - **Discovered, not announced**: Sessions are found by enumerating the host every tick
//! - **Attach once**: Each handle carries at most one of our listeners, checked by membership
//! - **Mark and sweep**: Deletion signals are queued and applied after iteration
//! - **Never fatal**: A session that vanishes mid-tick is skipped, not an error
//!
//! ## Per-tick protocol
//!
//! 1. Sweep deletions signalled since the last tick
//! 2. Drop engines whose session is no longer enumerated
//! 3. Create engines for new sessions and subscribe their deletion
//! 4. Attach any handle listener that is still missing
//! 5. Drive every engine with freshly fetched vector and geometry
//! 6. Sweep deletions signalled during step 5

pub mod host;
pub mod listener;

pub use host::{ManeuverHost, OrbitPropagator, SessionError, SessionSource};
pub use listener::{ChangeListener, DeletionListener, DeletionQueue};

use core_types::{ListenerId, SessionId};
use gizmo_correction::{CorrectionConfig, CorrectionEngine, TickOutcome};
use maneuver_types::{AxisSet, GizmoHandle, MomentumVector};
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Counters for one registry pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Sessions that received a new engine
    pub attached: usize,
    /// Corrections written back to the host
    pub corrected: usize,
    /// Engines that had pending work but could not apply it, including
    /// corrections the host refused to store
    pub skipped: usize,
    /// Engines removed (deleted or vanished sessions)
    pub removed: usize,
}

/// Per-session state
#[derive(Debug)]
struct EditSession {
    id: SessionId,
    engine: CorrectionEngine,
    handle_listeners: BTreeMap<GizmoHandle, ListenerId>,
    deletion_listener: ListenerId,
}

/// Session registry
///
/// Maps host sessions one-to-one onto correction engines. Engines live in
/// discovery order.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: Vec<EditSession>,
    deletions: DeletionQueue,
    config: CorrectionConfig,
}

impl SessionRegistry {
    /// Creates an empty registry
    pub fn new(config: CorrectionConfig) -> Self {
        Self {
            sessions: Vec::new(),
            deletions: DeletionQueue::new(),
            config,
        }
    }

    pub fn config(&self) -> CorrectionConfig {
        self.config
    }

    /// Replaces the config of the registry and every live engine
    pub fn set_config(&mut self, config: CorrectionConfig) {
        self.config = config;
        for session in &mut self.sessions {
            session.engine.set_config(config);
        }
    }

    /// Returns the number of registered engines
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, session: SessionId) -> bool {
        self.position(session).is_some()
    }

    /// Registered sessions in discovery order
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|s| s.id).collect()
    }

    /// The engine's reference vector for `session`
    pub fn reference(&self, session: SessionId) -> Option<MomentumVector> {
        self.find(session).map(|s| s.engine.reference())
    }

    /// Axes still pending for `session`
    pub fn pending(&self, session: SessionId) -> Option<AxisSet> {
        self.find(session).map(|s| s.engine.pending().snapshot())
    }

    /// Number of handles our listener is attached to for `session`
    pub fn attached_handles(&self, session: SessionId) -> usize {
        self.find(session)
            .map(|s| s.handle_listeners.len())
            .unwrap_or(0)
    }

    /// Runs one full tick: refresh, then drive every engine.
    pub fn tick<H: ManeuverHost + ?Sized>(&mut self, host: &mut H) -> TickReport {
        let mut report = self.refresh(host);

        for index in 0..self.sessions.len() {
            let id = self.sessions[index].id;
            if self.deletions.contains(id) {
                continue;
            }
            match self.drive(index, host) {
                Some(TickOutcome::Corrected { .. }) => report.corrected += 1,
                Some(TickOutcome::Skipped { .. }) | None => report.skipped += 1,
                Some(TickOutcome::Idle) | Some(TickOutcome::Disabled) => {}
            }
        }

        report.removed += self.sweep(host);
        report
    }

    /// Syncs the registry with the host's sessions without driving engines.
    ///
    /// Safe to call any number of times per tick.
    pub fn refresh<H: ManeuverHost + ?Sized>(&mut self, host: &mut H) -> TickReport {
        let mut report = TickReport {
            removed: self.sweep(host),
            ..TickReport::default()
        };

        let live = host.sessions();

        let vanished: Vec<SessionId> = self
            .sessions
            .iter()
            .map(|s| s.id)
            .filter(|id| !live.contains(id))
            .collect();
        for id in vanished {
            debug!(session = %id, "Session vanished without deletion signal");
            if self.remove(id, host) {
                report.removed += 1;
            }
        }

        for id in live {
            if !self.contains(id) && self.open(id, host) {
                report.attached += 1;
            }
        }

        for session in &mut self.sessions {
            attach_handle_listeners(session, host);
        }

        report
    }

    /// Removes every engine, detaching its listeners.
    pub fn shutdown<H: ManeuverHost + ?Sized>(&mut self, host: &mut H) {
        self.deletions.drain();
        while let Some(session) = self.sessions.pop() {
            detach(&session, host);
            debug!(session = %session.id, "Engine removed on shutdown");
        }
    }

    fn open<H: ManeuverHost + ?Sized>(&mut self, id: SessionId, host: &mut H) -> bool {
        let initial = match host.vector(id) {
            Ok(vector) => vector,
            Err(err) => {
                debug!(session = %id, error = %err, "Cannot open session");
                return false;
            }
        };

        let listener = DeletionListener::new(id, self.deletions.clone());
        let deletion_listener = match host.subscribe_deletion(id, listener) {
            Ok(listener_id) => listener_id,
            Err(err) => {
                debug!(session = %id, error = %err, "Cannot subscribe to deletion");
                return false;
            }
        };

        debug!(session = %id, initial = %initial, "Engine attached");
        self.sessions.push(EditSession {
            id,
            engine: CorrectionEngine::new(initial, self.config),
            handle_listeners: BTreeMap::new(),
            deletion_listener,
        });
        true
    }

    /// Drives one engine. `None` when the host could not supply its inputs
    /// or rejected the corrected vector.
    fn drive<H: ManeuverHost + ?Sized>(
        &mut self,
        index: usize,
        host: &mut H,
    ) -> Option<TickOutcome> {
        let session = &mut self.sessions[index];
        let id = session.id;

        if session.engine.pending().is_empty() {
            return Some(TickOutcome::Idle);
        }

        let inputs = host.vector(id).and_then(|raw| {
            let epoch = host.epoch(id)?;
            let geometry = host.geometry_at(id, epoch)?;
            Ok((raw, geometry))
        });
        let (raw, geometry) = match inputs {
            Ok(inputs) => inputs,
            Err(err) => {
                debug!(session = %id, error = %err, "Inputs unavailable, skipping tick");
                return None;
            }
        };

        let outcome = session.engine.tick(raw, &geometry);
        match &outcome {
            TickOutcome::Corrected {
                axis,
                delta,
                vector,
            } => {
                if let Err(err) = host.set_vector(id, *vector) {
                    match &err {
                        SessionError::SessionNotFound(_) => {
                            debug!(session = %id, "Session gone before write-back")
                        }
                        other => warn!(session = %id, error = %other, "Write-back failed"),
                    }
                    return None;
                }
                session.engine.commit(*axis, *vector);
                debug!(
                    session = %id,
                    axis = %axis,
                    delta = %delta,
                    vector = %vector,
                    "Correction applied"
                );
            }
            TickOutcome::Skipped { axis, error } => {
                debug!(session = %id, axis = %axis, error = %error, "Correction skipped");
            }
            TickOutcome::Disabled => {
                trace!(session = %id, "Corrections disabled, reference resynced");
            }
            TickOutcome::Idle => {}
        }
        Some(outcome)
    }

    /// Removes every session whose deletion was signalled.
    fn sweep<H: ManeuverHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let mut removed = 0;
        for id in self.deletions.drain() {
            if self.remove(id, host) {
                debug!(session = %id, "Engine removed after deletion");
                removed += 1;
            }
        }
        removed
    }

    fn remove<H: ManeuverHost + ?Sized>(&mut self, id: SessionId, host: &mut H) -> bool {
        match self.position(id) {
            Some(index) => {
                let session = self.sessions.remove(index);
                detach(&session, host);
                true
            }
            None => false,
        }
    }

    fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    fn find(&self, id: SessionId) -> Option<&EditSession> {
        self.sessions.iter().find(|s| s.id == id)
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(CorrectionConfig::default())
    }
}

/// Subscribes to every handle not yet in the membership map.
fn attach_handle_listeners<H: ManeuverHost + ?Sized>(session: &mut EditSession, host: &mut H) {
    for handle in GizmoHandle::ALL {
        if session.handle_listeners.contains_key(&handle) {
            continue;
        }
        let listener = ChangeListener::new(handle.axis(), session.engine.pending());
        match host.subscribe_handle(session.id, handle, listener) {
            Ok(listener_id) => {
                trace!(session = %session.id, handle = %handle, "Handle listener attached");
                session.handle_listeners.insert(handle, listener_id);
            }
            Err(SessionError::HandleUnavailable { .. }) => {}
            Err(err) => {
                debug!(
                    session = %session.id,
                    handle = %handle,
                    error = %err,
                    "Cannot attach handle listener"
                );
            }
        }
    }
}

/// Unsubscribes every listener of `session`; failures mean the host already
/// dropped them.
fn detach<H: ManeuverHost + ?Sized>(session: &EditSession, host: &mut H) {
    for (handle, listener_id) in &session.handle_listeners {
        if let Err(err) = host.unsubscribe_handle(session.id, *handle, *listener_id) {
            trace!(
                session = %session.id,
                handle = %handle,
                error = %err,
                "Handle listener already gone"
            );
        }
    }
    if let Err(err) = host.unsubscribe_deletion(session.id, session.deletion_listener) {
        trace!(session = %session.id, error = %err, "Deletion listener already gone");
    }
}
