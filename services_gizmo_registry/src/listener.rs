//! Listener tokens handed to the host.
//!
//! Both kinds only record that something happened. The registry acts on the
//! record during its next tick, never inside the host's callback.

use core_types::SessionId;
use gizmo_correction::PendingChanges;
use maneuver_types::Axis;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Receives raw change notifications from one gizmo handle
#[derive(Debug, Clone)]
pub struct ChangeListener {
    axis: Axis,
    pending: PendingChanges,
}

impl ChangeListener {
    pub fn new(axis: Axis, pending: PendingChanges) -> Self {
        Self { axis, pending }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Called by the host whenever the handle's raw value changes
    pub fn notify(&self, raw_value: f64) {
        trace!(axis = %self.axis, raw_value = raw_value, "Handle change");
        self.pending.mark(self.axis);
    }

    /// True when this listener feeds `pending`
    pub fn feeds(&self, pending: &PendingChanges) -> bool {
        self.pending.same_set(pending)
    }
}

/// Sessions whose deletion was signalled but not yet swept
#[derive(Debug, Clone, Default)]
pub struct DeletionQueue {
    sessions: Rc<RefCell<Vec<SessionId>>>,
}

impl DeletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, session: SessionId) {
        let mut sessions = self.sessions.borrow_mut();
        if !sessions.contains(&session) {
            sessions.push(session);
        }
    }

    pub fn contains(&self, session: SessionId) -> bool {
        self.sessions.borrow().contains(&session)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.borrow().is_empty()
    }

    /// Takes every queued session, oldest first
    pub fn drain(&self) -> Vec<SessionId> {
        std::mem::take(&mut *self.sessions.borrow_mut())
    }
}

/// Receives the deletion signal of one session
#[derive(Debug, Clone)]
pub struct DeletionListener {
    session: SessionId,
    queue: DeletionQueue,
}

impl DeletionListener {
    pub fn new(session: SessionId, queue: DeletionQueue) -> Self {
        Self { session, queue }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Called by the host when the session's gizmo is deleted
    pub fn notify(&self) {
        trace!(session = %self.session, "Session deletion signalled");
        self.queue.push(self.session);
    }
}
