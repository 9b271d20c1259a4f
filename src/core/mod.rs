//! Runtime core: unit lifecycle, tasks and groups.
//!
//! The public API from this module is [`Task`], [`Group`] and their builders, plus the
//! [`Emit`] listener capability they share.
//!
//! Internal modules:
//! - [`unit`]: state machine, emission and completion shared by tasks and groups;
//! - [`registry`]: `once_done` / `when_done` registration with late delivery;
//! - [`emitter`]: synchronous listener registry;
//! - [`tick`]: next-tick deferral on the ambient tokio runtime;
//! - [`isolation`]: fault-isolation scope around a task's execution;
//! - [`task`]: a single callable with its completion handle;
//! - [`group`]: ordered children with bounded concurrency;
//! - [`builder`]: `TaskBuilder` / `GroupBuilder`.

use std::sync::{Mutex, MutexGuard, PoisonError};

mod builder;
mod config;
mod emitter;
mod group;
mod isolation;
mod registry;
mod status;
mod task;
mod tick;
mod unit;

pub use builder::{GroupBuilder, TaskBuilder};
pub use config::{Config, OnError};
pub use emitter::{Emit, ListenerId};
pub use group::{Group, Item};
pub use status::{Status, UnitKind};
pub use task::Task;

pub(crate) use emitter::Emitter;
pub(crate) use task::Completer;

/// Locks `m`, recovering the guard if a listener panicked while holding it.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
