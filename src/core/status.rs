//! # Unit lifecycle states and kind discriminator.
//!
//! ```text
//! created ──► pending ──► running ──► passed ──┐
//!                                  └─► failed ──┴─► destroyed
//! ```
//!
//! Transitions are monotonic. The only way back to `created` is a group configured
//! with `auto_clear`, which resets itself when re-run after completing.

use std::fmt;

/// Lifecycle state of a task or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Execution has not been requested yet.
    Created,
    /// `run()` was called; execution is scheduled for the next tick.
    Pending,
    /// The callable (or the group's scheduler) is executing.
    Running,
    /// Execution exited with an error.
    Failed,
    /// Execution exited without an error.
    Passed,
    /// Resources were released; the unit can never execute again.
    Destroyed,
}

impl Status {
    /// Returns a short stable label (lowercase) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Status::Created => "created",
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Failed => "failed",
            Status::Passed => "passed",
            Status::Destroyed => "destroyed",
        }
    }

    /// Has execution been requested?
    #[inline]
    pub fn is_started(&self) -> bool {
        !matches!(self, Status::Created)
    }

    /// Has execution finished (including destruction)?
    #[inline]
    pub fn is_exited(&self) -> bool {
        matches!(self, Status::Failed | Status::Passed | Status::Destroyed)
    }

    /// Has execution finished with a recorded outcome?
    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, Status::Failed | Status::Passed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Explicit discriminator for schedulable units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// A single callable.
    Task,
    /// A container of tasks and groups.
    Group,
}

impl UnitKind {
    /// Returns a short stable label (lowercase) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            UnitKind::Task => "task",
            UnitKind::Group => "group",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(!Status::Created.is_started());
        assert!(Status::Pending.is_started());
        assert!(!Status::Running.is_exited());
        assert!(Status::Destroyed.is_exited());
        assert!(!Status::Destroyed.is_completed());
        assert!(Status::Failed.is_completed());
        assert!(Status::Passed.is_completed());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Status::Passed.to_string(), "passed");
        assert_eq!(UnitKind::Group.to_string(), "group");
    }
}
