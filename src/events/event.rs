//! # Events emitted by tasks and groups.
//!
//! Two representations exist:
//! - [`UnitEvent`] is what direct listeners receive (registered through [`Emit`](crate::Emit)).
//!   It carries the typed payload: the error or the full [`TaskResult`].
//! - [`Event`] is the flattened record published on the optional [`Bus`](crate::Bus)
//!   for asynchronous subscribers. It adds ordering and timing metadata.
//!
//! Both share the [`EventKind`] vocabulary. A group is observed through exactly the
//! same vocabulary as a task.
//!
//! ## Ordering guarantees
//! Each bus event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use taskflow::{Event, EventKind, UnitKind};
//!
//! let ev = Event::new(EventKind::Failed)
//!     .with_unit("fetch")
//!     .with_unit_kind(UnitKind::Task)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::Failed);
//! assert_eq!(ev.unit.as_deref(), Some("fetch"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::UnitKind;
use crate::error::TaskError;
use crate::tasks::TaskResult;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of unit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Execution has been triggered.
    Pending,
    /// The callable started executing.
    Running,
    /// Execution exited with a failure.
    ///
    /// Payload: the first error.
    Failed,
    /// Execution exited with a success.
    Passed,
    /// Execution exited.
    ///
    /// Payload: the captured result.
    Completed,
    /// Fires on `Completed` and on `Error`.
    ///
    /// Payload: the captured result, or the error alone for `Error`.
    Done,
    /// Unexpected condition: usage error or excess completion.
    ///
    /// Payload: the error.
    Error,
    /// The unit released its resources.
    Destroyed,
}

impl EventKind {
    /// Returns a short stable label (lowercase) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Pending => "pending",
            EventKind::Running => "running",
            EventKind::Failed => "failed",
            EventKind::Passed => "passed",
            EventKind::Completed => "completed",
            EventKind::Done => "done",
            EventKind::Error => "error",
            EventKind::Destroyed => "destroyed",
        }
    }
}

/// Payload delivered to direct listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitEvent {
    /// See [`EventKind::Pending`].
    Pending,
    /// See [`EventKind::Running`].
    Running,
    /// See [`EventKind::Failed`].
    Failed(TaskError),
    /// See [`EventKind::Passed`].
    Passed,
    /// See [`EventKind::Completed`].
    Completed(TaskResult),
    /// See [`EventKind::Done`].
    Done(TaskResult),
    /// See [`EventKind::Error`].
    Error(TaskError),
    /// See [`EventKind::Destroyed`].
    Destroyed,
}

impl UnitEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            UnitEvent::Pending => EventKind::Pending,
            UnitEvent::Running => EventKind::Running,
            UnitEvent::Failed(_) => EventKind::Failed,
            UnitEvent::Passed => EventKind::Passed,
            UnitEvent::Completed(_) => EventKind::Completed,
            UnitEvent::Done(_) => EventKind::Done,
            UnitEvent::Error(_) => EventKind::Error,
            UnitEvent::Destroyed => EventKind::Destroyed,
        }
    }

    /// Returns the error carried by this event, if any.
    pub fn error(&self) -> Option<&TaskError> {
        match self {
            UnitEvent::Failed(e) | UnitEvent::Error(e) => Some(e),
            UnitEvent::Completed(r) | UnitEvent::Done(r) => r.error.as_ref(),
            _ => None,
        }
    }

    /// Returns the result carried by this event, if any.
    pub fn result(&self) -> Option<&TaskResult> {
        match self {
            UnitEvent::Completed(r) | UnitEvent::Done(r) => Some(r),
            _ => None,
        }
    }
}

/// Bus event with metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the emitting unit.
    pub unit: Option<Arc<str>>,
    /// Whether the emitter is a task or a group.
    pub unit_kind: Option<UnitKind>,
    /// Human-readable reason (error message).
    pub reason: Option<Arc<str>>,
    /// Number of result values (for `Completed`/`Done`).
    pub values: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            unit: None,
            unit_kind: None,
            reason: None,
            values: None,
        }
    }

    /// Flattens a unit event emitted by `unit`.
    pub fn from_unit(unit: &str, unit_kind: UnitKind, ev: &UnitEvent) -> Self {
        let mut out = Event::new(ev.kind())
            .with_unit(unit)
            .with_unit_kind(unit_kind);
        if let Some(e) = ev.error() {
            out = out.with_reason(e.to_string());
        }
        if let Some(r) = ev.result() {
            out.values = Some(r.values.len());
        }
        out
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the emitting unit's name.
    #[inline]
    pub fn with_unit(mut self, unit: impl Into<Arc<str>>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Attaches the emitting unit's kind.
    #[inline]
    pub fn with_unit_kind(mut self, kind: UnitKind) -> Self {
        self.unit_kind = Some(kind);
        self
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, EventKind::Failed | EventKind::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::Pending);
        let b = Event::new(EventKind::Running);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_from_unit_copies_reason_and_values() {
        let result = TaskResult::failed(TaskError::fail("boom"));
        let ev = Event::from_unit("t", UnitKind::Task, &UnitEvent::Completed(result));
        assert_eq!(ev.kind, EventKind::Completed);
        assert_eq!(ev.reason.as_deref(), Some("execution failed: boom"));
        assert_eq!(ev.values, Some(0));
        assert!(!ev.is_failure());

        let ev = Event::from_unit("g", UnitKind::Group, &UnitEvent::Error(TaskError::NoRuntime));
        assert!(ev.is_failure());
        assert_eq!(ev.unit_kind, Some(UnitKind::Group));
    }

    #[test]
    fn test_unit_event_accessors() {
        let ev = UnitEvent::Done(TaskResult::ok(vec![serde_json::json!(1)]));
        assert_eq!(ev.kind(), EventKind::Done);
        assert!(ev.error().is_none());
        assert_eq!(ev.result().map(|r| r.values.len()), Some(1));
        assert_eq!(EventKind::Destroyed.as_label(), "destroyed");
    }
}
