//! # Unit configuration.
//!
//! Provides [`Config`], the configuration surface shared by tasks and groups.
//! Tasks ignore the group-only fields; groups ignore the task-only ones.
//!
//! Config is used in two ways:
//! 1. **Unit creation**: `Task::builder(..).config(cfg)` / `Group::builder(..).config(cfg)`
//! 2. **Nested defaults**: `Group::create_task` / `Group::create_group` build children from
//!    `nested_task` / `nested_group`
//!
//! ## Sentinel values
//! - `concurrency = 0` → unlimited
//! - `sync = true` → concurrency forced to 1 for groups

use serde_json::Value;

use crate::events::Bus;

/// What a group does with not-yet-started children after a child fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnError {
    /// Keep dispatching; the first error still decides the group's outcome.
    #[default]
    Continue,
    /// Stop dispatching new children; running ones are awaited.
    Exit,
}

/// Configuration shared by tasks and groups.
///
/// ## Field semantics
/// - `sync`: completions are delivered without a deferral tick; groups run children one at a time
/// - `domain`: wrap execution in an isolation scope capturing background errors
/// - `ambi`: honor values returned by [`TaskFn::ambi`](crate::TaskFn::ambi) callables
/// - `destroy_once_done`: destroy the unit after its completion has been delivered
/// - `error_on_excess_completions`: report a second completion as an `Error` event
/// - `args`: arguments handed to the callable
/// - `concurrency`: maximum running children (`0` = unlimited)
/// - `auto_clear`: allow a completed group to take new children and run again
/// - `on_error`: dispatch behavior after a child failure
/// - `store_result`: keep each child's result in the group's result values
/// - `accept_while_running`: allow adding children while the group runs
/// - `nested_task` / `nested_group`: defaults for children created by the group
/// - `bus`: broadcast every emitted event
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid sprinkling sentinel checks.
#[derive(Clone, Debug)]
pub struct Config {
    /// Deliver completions synchronously; for groups, run children one at a time.
    pub sync: bool,
    /// Enable the fault-isolation scope.
    pub domain: bool,
    /// Honor values returned by `ambi` callables.
    pub ambi: bool,
    /// Destroy the unit once its completion has been delivered.
    pub destroy_once_done: bool,
    /// Emit an `Error` event when the unit completes more than once.
    pub error_on_excess_completions: bool,
    /// Arguments forwarded to the callable.
    pub args: Vec<Value>,

    /// Maximum number of simultaneously running children (`0` = unlimited).
    pub concurrency: usize,
    /// Allow re-running the group after completion.
    pub auto_clear: bool,
    /// Dispatch behavior after a child failure.
    pub on_error: OnError,
    /// Keep child results in the group's result values.
    pub store_result: bool,
    /// Allow adding children while the group is running.
    pub accept_while_running: bool,
    /// Defaults for tasks created through [`Group::create_task`](crate::Group::create_task).
    pub nested_task: Option<Box<Config>>,
    /// Defaults for groups created through [`Group::create_group`](crate::Group::create_group).
    pub nested_group: Option<Box<Config>>,

    /// Optional broadcast bus for observers.
    pub bus: Option<Bus>,
}

impl Config {
    /// Returns the effective child concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` running children
    ///
    /// # Example
    /// ```
    /// use taskflow::Config;
    ///
    /// let mut cfg = Config::default();
    /// assert_eq!(cfg.concurrency_limit(), None);
    /// cfg.concurrency = 3;
    /// assert_eq!(cfg.concurrency_limit(), Some(3));
    /// cfg.sync = true;
    /// assert_eq!(cfg.concurrency_limit(), Some(1));
    /// ```
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.sync {
            return Some(1);
        }
        match self.concurrency {
            0 => None,
            n => Some(n),
        }
    }

    /// Defaults for tasks created by a group with this config.
    pub fn nested_task_config(&self) -> Config {
        self.nested_task
            .as_deref()
            .cloned()
            .unwrap_or_default()
    }

    /// Defaults for groups created by a group with this config.
    pub fn nested_group_config(&self) -> Config {
        self.nested_group
            .as_deref()
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `sync = false`, `domain = true`, `ambi = true`
    /// - `destroy_once_done = true`, `error_on_excess_completions = true`
    /// - `concurrency = 0` (unlimited), `auto_clear = false`, `on_error = Continue`
    /// - `store_result = true`, `accept_while_running = true`
    /// - no nested defaults, no bus
    fn default() -> Self {
        Self {
            sync: false,
            domain: true,
            ambi: true,
            destroy_once_done: true,
            error_on_excess_completions: true,
            args: Vec::new(),
            concurrency: 0,
            auto_clear: false,
            on_error: OnError::Continue,
            store_result: true,
            accept_while_running: true,
            nested_task: None,
            nested_group: None,
            bus: None,
        }
    }
}
