//! Shared pending-change bitset.
//!
//! Handle notifications arrive as fire-and-forget callbacks from the host.
//! They only mark an axis here; the engine drains the set on its next tick.

use maneuver_types::{Axis, AxisSet};
use std::cell::Cell;
use std::rc::Rc;

/// Cloneable handle to an engine's pending axes
///
/// All clones observe the same set. Single-threaded by construction.
#[derive(Debug, Clone, Default)]
pub struct PendingChanges {
    axes: Rc<Cell<AxisSet>>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a raw change on `axis`
    pub fn mark(&self, axis: Axis) {
        let mut axes = self.axes.get();
        axes.insert(axis);
        self.axes.set(axes);
    }

    pub fn snapshot(&self) -> AxisSet {
        self.axes.get()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.get().is_empty()
    }

    pub fn clear(&self, axis: Axis) {
        let mut axes = self.axes.get();
        axes.remove(axis);
        self.axes.set(axes);
    }

    pub fn clear_all(&self) {
        self.axes.set(AxisSet::empty());
    }

    /// True when both handles point at the same set
    pub fn same_set(&self, other: &PendingChanges) -> bool {
        Rc::ptr_eq(&self.axes, &other.axes)
    }
}
