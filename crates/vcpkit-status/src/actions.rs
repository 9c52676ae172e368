//! Machine action guards.
//!
//! Read-only predicates over the latest published snapshot, used by
//! command bindings to decide whether estop/power/home actions are
//! currently allowed. Guards never issue commands; they only answer
//! questions with an operator-facing message.

use vcpkit_core::TaskState;

use crate::sync::SnapshotCell;

/// Whether an action is currently allowed, with the operator message to
/// show either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardVerdict {
    /// True if the action may be issued now.
    pub allowed: bool,
    /// Operator-facing status/tooltip text.
    pub message: String,
}

impl GuardVerdict {
    fn allow(message: impl Into<String>) -> Self {
        Self {
            allowed: true,
            message: message.into(),
        }
    }

    fn deny(message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            message: message.into(),
        }
    }
}

/// Snapshot-backed guard predicates for machine actions.
#[derive(Debug, Clone)]
pub struct ActionGuard {
    snapshot: SnapshotCell,
}

impl ActionGuard {
    /// Create a guard reading from the given snapshot handle.
    pub fn new(snapshot: SnapshotCell) -> Self {
        Self { snapshot }
    }

    /// Whether E-stop is currently active.
    pub fn estop_is_activated(&self) -> bool {
        self.snapshot.with(|record| record.estop != 0)
    }

    /// E-stop toggling is always permitted.
    pub fn estop_ok(&self) -> GuardVerdict {
        GuardVerdict::allow("")
    }

    /// Whether machine power is on.
    pub fn power_is_on(&self) -> bool {
        self.snapshot
            .with(|record| record.task_state == TaskState::On)
    }

    /// Whether the machine may be powered on.
    pub fn power_ok(&self) -> GuardVerdict {
        let task_state = self.snapshot.with(|record| record.task_state);
        if task_state == TaskState::EstopReset {
            GuardVerdict::allow("Turn machine on")
        } else {
            GuardVerdict::deny("Can't turn machine ON until out of E-Stop")
        }
    }

    /// Whether the given joint (or all joints, for `None`) may be homed.
    pub fn home_ok(&self, _joint: Option<usize>) -> GuardVerdict {
        if self.power_is_on() {
            GuardVerdict::allow("")
        } else {
            GuardVerdict::deny("Machine must be on to home")
        }
    }
}
