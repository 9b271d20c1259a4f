//! # Observing unit lifecycles off the emitting path
//!
//! Unit listeners (`on`, `once_done`, ...) run synchronously inside the task or group
//! that emits. A [`Subscribe`] implementation instead sees the [`Event`] records that
//! units publish on a shared [`Bus`](crate::events::Bus), after the fact and on its own
//! worker, fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! Records published by a unit fill in:
//! - `unit`: the task or group name, as given to the builder or `"task N"`/`"group N"`
//! - `unit_kind`: tells a group's own `passed`/`failed` apart from its children's
//! - `reason`: the error text, on `failed` and `error` and on results carrying an error
//! - `values`: how many values a `completed`/`done` result carried
//!
//! A group hands its bus to children that have none, so one subscriber attached to the
//! outer group's bus observes the whole tree.
//!
//! Slow subscribers never hold up a unit's completion. When a queue is full the record
//! is dropped for that subscriber only, with a warning.

use crate::events::Event;
use async_trait::async_trait;

/// Receives the bus records of tasks and groups.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use taskflow::{Event, EventKind, Subscribe, UnitKind};
///
/// /// Counts groups that finished with an error.
/// #[derive(Default)]
/// struct FailedGroups(AtomicUsize);
///
/// #[async_trait::async_trait]
/// impl Subscribe for FailedGroups {
///     async fn on_event(&self, ev: &Event) {
///         if ev.kind == EventKind::Failed && ev.unit_kind == Some(UnitKind::Group) {
///             self.0.fetch_add(1, Ordering::Relaxed);
///         }
///     }
///
///     fn name(&self) -> &'static str {
///         "failed-groups"
///     }
/// }
/// ```
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one record. Records of one unit arrive in emission order.
    async fn on_event(&self, event: &Event);

    /// Name used when the set logs a dropped record or a panic.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Records buffered for this subscriber before new ones are dropped.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
