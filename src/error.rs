//! Error types used by tasks, groups and the named-event lock.
//!
//! This module defines two error enums:
//!
//! - [`TaskError`]: failures of a unit's callable and usage errors of the unit API.
//! - [`LockError`]: failures of [`EventLock`](crate::EventLock) set operations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//! Usage errors are never returned across the unit API: they are delivered as
//! `Error` events (see [`EventKind::Error`](crate::EventKind::Error)).

use std::time::Duration;
use thiserror::Error;

use crate::core::Status;

/// # Errors produced by task execution and unit usage.
///
/// Execution errors (`Fail`, `Timeout`, `Panicked`) come from the wrapped callable
/// and turn the unit `failed`. The remaining variants report misuse of a unit and
/// travel through the `error` signal.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The callable reported a failure.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The callable was forced to complete by an embedder-supplied timer.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The callable, or work it spawned inside the isolation scope, panicked.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// `run()` was called on a unit that is not in the `created` state.
    #[error("invalid run status for [{name}]: it was [{status}] instead of [created]")]
    InvalidRunStatus {
        /// Unit name.
        name: String,
        /// Status at the time of the call.
        status: Status,
    },

    /// The task has no callable to execute.
    #[error("the task [{name}] failed to run as no method was defined for it")]
    MissingMethod {
        /// Task name.
        name: String,
    },

    /// The unit completed again after it had already exited.
    #[error("the unit [{name}] just completed, but it had already completed earlier")]
    ExcessCompletion {
        /// Unit name.
        name: String,
    },

    /// A child was offered to a group that no longer accepts children.
    #[error("the group [{name}] is [{status}] and does not accept new items")]
    Closed {
        /// Group name.
        name: String,
        /// Group status at the time of the call.
        status: Status,
    },

    /// A child was offered to a running group configured to reject late additions.
    #[error("the group [{name}] is running and does not accept items while running")]
    NotAccepting {
        /// Group name.
        name: String,
    },

    /// A child that has already started was offered to a group.
    #[error("the item [{item}] added to [{name}] is [{status}] instead of [created]")]
    NotCreated {
        /// Group name.
        name: String,
        /// Child name.
        item: String,
        /// Child status.
        status: Status,
    },

    /// A child already belongs to a group (this one or another).
    #[error("the item [{item}] added to [{name}] already belongs to a group")]
    AlreadyOwned {
        /// Group name.
        name: String,
        /// Child name.
        item: String,
    },

    /// Deferred work was requested outside of a tokio runtime.
    #[error("no tokio runtime available to schedule deferred work")]
    NoRuntime,

    /// The unit was destroyed before it ever completed.
    #[error("the unit [{name}] was destroyed before completing")]
    Destroyed {
        /// Unit name.
        name: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use taskflow::TaskError;
    ///
    /// let err = TaskError::fail("boom");
    /// assert_eq!(err.to_string(), "execution failed: boom");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskflow::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::InvalidRunStatus { .. } => "invalid_run_status",
            TaskError::MissingMethod { .. } => "missing_method",
            TaskError::ExcessCompletion { .. } => "excess_completion",
            TaskError::Closed { .. } => "group_closed",
            TaskError::NotAccepting { .. } => "group_not_accepting",
            TaskError::NotCreated { .. } => "item_not_created",
            TaskError::AlreadyOwned { .. } => "item_already_owned",
            TaskError::NoRuntime => "no_runtime",
            TaskError::Destroyed { .. } => "unit_destroyed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::InvalidRunStatus { name, status } => {
                format!("run rejected: unit={name} status={status}")
            }
            TaskError::MissingMethod { name } => format!("missing method: task={name}"),
            TaskError::ExcessCompletion { name } => format!("excess completion: unit={name}"),
            TaskError::Closed { name, status } => format!("closed: group={name} status={status}"),
            TaskError::NotAccepting { name } => format!("not accepting: group={name}"),
            TaskError::NotCreated { name, item, status } => {
                format!("item not created: group={name} item={item} status={status}")
            }
            TaskError::NoRuntime => "no runtime".to_string(),
            TaskError::Destroyed { name } => format!("destroyed: unit={name}"),
        }
    }

    /// Indicates whether the error reports misuse of the API rather than a failing callable.
    ///
    /// # Example
    /// ```
    /// use taskflow::TaskError;
    ///
    /// assert!(TaskError::MissingMethod { name: "t".into() }.is_usage());
    /// assert!(!TaskError::fail("boom").is_usage());
    /// ```
    pub fn is_usage(&self) -> bool {
        !matches!(
            self,
            TaskError::Fail { .. } | TaskError::Timeout { .. } | TaskError::Panicked { .. }
        )
    }
}

/// # Errors produced by the named-event lock.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// The set of event names given to `block`/`unblock` was empty or contained blank names.
    #[error("malformed event names: {names:?}")]
    MalformedNames {
        /// The names as received.
        names: Vec<String>,
    },
}

impl LockError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            LockError::MalformedNames { .. } => "lock_malformed_names",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LockError::MalformedNames { names } => format!("malformed names: {names:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_classification() {
        assert!(!TaskError::Timeout { timeout: Duration::from_millis(5) }.is_usage());
        assert!(!TaskError::Panicked { info: "x".into() }.is_usage());
        assert!(TaskError::NoRuntime.is_usage());
        let owned = TaskError::AlreadyOwned {
            name: "g".into(),
            item: "t".into(),
        };
        assert!(owned.is_usage());
        assert_eq!(owned.as_label(), "item_already_owned");
        assert!(
            TaskError::InvalidRunStatus {
                name: "t".into(),
                status: Status::Running
            }
            .is_usage()
        );
    }

    #[test]
    fn test_display_includes_status_label() {
        let err = TaskError::InvalidRunStatus {
            name: "demo".into(),
            status: Status::Pending,
        };
        assert_eq!(
            err.to_string(),
            "invalid run status for [demo]: it was [pending] instead of [created]"
        );
        assert_eq!(err.as_label(), "invalid_run_status");
    }

    #[test]
    fn test_lock_error_label() {
        let err = LockError::MalformedNames { names: vec![] };
        assert_eq!(err.as_label(), "lock_malformed_names");
        assert_eq!(err.as_message(), "malformed names: []");
    }
}
