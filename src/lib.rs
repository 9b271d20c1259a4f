//! # taskflow
//!
//! **Taskflow** coordinates units of work that complete exactly once.
//!
//! A [`Task`] wraps one callable, synchronous or asynchronous, and reports its
//! single completion through events. A [`Group`] runs an ordered set of tasks and
//! nested groups with bounded concurrency, aggregates their outcomes, and is observed
//! exactly like a task by its own parent. An [`EventLock`] serializes named phases.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Task     │   │     Task     │   │    Group     │
//!     │  (TaskFn #1) │   │  (TaskFn #2) │   │  (nested)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Group (scheduler)                                                │
//! │  - insertion order, `concurrency` running children at most        │
//! │  - first child error decides the outcome                          │
//! │  - child results collected as `[error, …values]`                  │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        │ direct listeners (Emit)                      │ publish(Event)
//!        ▼                                              ▼
//!   pending · running · passed|failed          ┌──────────────────────┐
//!   completed · done · error · destroyed       │ Bus (broadcast)      │
//!                                              └──────────┬───────────┘
//!                                                         ▼
//!                                              ┌──────────────────────┐
//!                                              │ SubscriberSet        │
//!                                              │ (per-sub queues)     │
//!                                              └──────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! created ─run()─► pending ─(next tick)─► running ─complete─► passed | failed ─► destroyed
//!    ▲                                                              │
//!    └───────────────── auto_clear group: run() again ◄─────────────┘
//! ```
//!
//! - `run()` never executes the callable inside the caller's stack.
//! - Only the first completion counts; later ones emit an `error` event.
//! - `once_done` registered after completion is called on the next tick.
//! - Usage errors (double `run`, closed group, …) are `error` events, not panics.
//!
//! ## Runtime
//! Deferred work runs on the ambient tokio runtime. Ordering guarantees are stated for
//! the current-thread runtime (`#[tokio::main(flavor = "current_thread")]`,
//! `#[tokio::test]`). Without a runtime, `run()` emits [`TaskError::NoRuntime`].
//!
//! ## Features
//! | Feature   | Description                                 | Default |
//! |-----------|---------------------------------------------|---------|
//! | `logging` | Exports [`LogWriter`] (tracing subscriber)  | yes     |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use serde_json::json;
//! use taskflow::{Group, TaskError, TaskFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let group = Group::builder().name("pipeline").concurrency(2).build();
//!
//!     group.create_task("sync", TaskFn::returning(|_| Ok(vec![json!(1)])));
//!     group.create_task("timer", TaskFn::callback(|ctx| {
//!         let done = ctx.clone();
//!         ctx.spawn(async move {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!             done.ok(vec![json!(2)]);
//!             Ok(())
//!         });
//!     }));
//!     group.create_task("async", TaskFn::future(|_ctx| async {
//!         Err::<Vec<serde_json::Value>, _>(TaskError::fail("unavailable"))
//!     }));
//!
//!     let result = group.run().outcome().await;
//!     assert_eq!(result.error, Some(TaskError::fail("unavailable")));
//!     assert_eq!(result.values.len(), 3);
//! }
//! ```

mod core;
mod error;
mod events;
mod lock;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    Config, Emit, Group, GroupBuilder, Item, ListenerId, OnError, Status, Task, TaskBuilder,
    UnitKind,
};
pub use error::{LockError, TaskError};
pub use events::{Bus, DEFAULT_BUS_CAPACITY, Event, EventKind, UnitEvent};
pub use lock::{EventLock, EventNames, Phase};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, TaskContext, TaskFn, TaskResult};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
