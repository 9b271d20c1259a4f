//! # Task: a single callable with a lifecycle.
//!
//! A [`Task`] wraps a [`TaskFn`] and drives it through the unit state machine:
//!
//! ```text
//! run() ─► pending ─(next tick)─► fire
//!                                  ├─ no callable      ─► error(MissingMethod)
//!                                  ├─ open scope       (domain = true)
//!                                  ├─ running
//!                                  └─ invoke per convention
//!                                       returning ─► complete(returned)
//!                                       callback  ─► ctx.complete(..) later
//!                                       ambi      ─► Some(r): complete(r) | None: ctx later
//!                                       future    ─► spawned; output completes
//! complete(result)
//!   ├─ sync or scope open ─► close scope, settle now
//!   └─ otherwise          ─► settle on next tick
//! ```
//!
//! Panics raised by the callable (or by scoped work) become [`TaskError::Panicked`]
//! completions instead of unwinding into the caller.

use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, warn};

use super::builder::TaskBuilder;
use super::config::Config;
use super::emitter::{Emit, ListenerId};
use super::isolation::{Scope, panicked};
use super::registry;
use super::status::{Status, UnitKind};
use super::unit::{self, Core, Lifecycle};
use super::{lock, tick};
use crate::error::TaskError;
use crate::events::{EventKind, UnitEvent};
use crate::tasks::{BoxTaskFuture, Convention, TaskContext, TaskFn, TaskResult};

pub(crate) struct TaskInner {
    core: Core,
    method: Option<TaskFn>,
    scope: Mutex<Option<Scope>>,
}

impl TaskInner {
    /// Closes the isolation scope. Returns `true` if one was open.
    fn close_scope(&self) -> bool {
        match lock(&self.scope).take() {
            Some(scope) => {
                scope.close();
                true
            }
            None => false,
        }
    }

    fn fire(self: &Arc<Self>) {
        let core = &self.core;
        let Some(method) = self.method.clone() else {
            core.emit(UnitEvent::Error(TaskError::MissingMethod {
                name: core.name().to_string(),
            }));
            return;
        };
        let config = core.config();
        if config.domain {
            *lock(&self.scope) = Some(Scope::open());
        }
        if !core.begin_execution() {
            self.close_scope();
            return;
        }

        let completer = Completer {
            task: Arc::clone(self),
        };
        let args: Arc<[Value]> = config.args.clone().into();

        match method.convention {
            Convention::Returning(f) => {
                let result = catch_unwind(AssertUnwindSafe(|| f(&args)))
                    .unwrap_or_else(|panic| Err(panicked(panic)));
                completer.complete(result.into());
            }
            Convention::Callback(f) => {
                let ctx = TaskContext::new(args, completer.clone());
                if let Err(panic) = catch_unwind(AssertUnwindSafe(|| f(ctx))) {
                    completer.complete(TaskResult::failed(panicked(panic)));
                }
            }
            Convention::Ambi(f) => {
                let ctx = TaskContext::new(args, completer.clone());
                match catch_unwind(AssertUnwindSafe(|| f(ctx))) {
                    Ok(Some(result)) if config.ambi => completer.complete(result.into()),
                    Ok(Some(_)) => {
                        debug!(task = %core.name(), "returned value ignored, ambi disabled");
                    }
                    Ok(None) => {}
                    Err(panic) => completer.complete(TaskResult::failed(panicked(panic))),
                }
            }
            Convention::Future(f) => {
                let ctx = TaskContext::new(args, completer.clone());
                match catch_unwind(AssertUnwindSafe(|| f(ctx))) {
                    Ok(fut) => completer.drive(fut),
                    Err(panic) => completer.complete(TaskResult::failed(panicked(panic))),
                }
            }
        }
    }
}

impl Lifecycle for TaskInner {
    fn core(&self) -> &Core {
        &self.core
    }

    fn release(&self) {
        self.close_scope();
    }
}

/// Completion handle of a running task.
#[derive(Clone)]
pub(crate) struct Completer {
    task: Arc<TaskInner>,
}

impl Completer {
    pub(crate) fn name(&self) -> &str {
        self.task.core.name()
    }

    pub(crate) fn complete(&self, result: TaskResult) {
        let task = &self.task;
        let scoped = task.close_scope();
        if task.core.config().sync || scoped {
            unit::complete(task, result);
            return;
        }
        let deferred = Arc::clone(task);
        if let Err(e) = tick::defer(move || unit::complete(&deferred, result)) {
            task.core.emit(UnitEvent::Error(e));
        }
    }

    /// Runs the future returned by a `future` callable; its output is the completion.
    fn drive(&self, fut: BoxTaskFuture) {
        let completer = self.clone();
        let spawned = tick::spawn(async move {
            let result = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => TaskResult::from(res),
                Err(panic) => TaskResult::failed(panicked(panic)),
            };
            completer.complete(result);
        });
        if let Err(e) = spawned {
            self.complete(TaskResult::failed(e));
        }
    }

    pub(crate) fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let scope = lock(&self.task.scope).clone();
        let spawned = match scope {
            Some(scope) => {
                let completer = self.clone();
                scope.spawn(fut, move |e| completer.complete(TaskResult::failed(e)))
            }
            None => {
                let name = self.name().to_string();
                tick::spawn(async move {
                    if let Err(e) = fut.await {
                        warn!(task = %name, error = %e, "unscoped background work failed");
                    }
                })
            }
        };
        if let Err(e) = spawned {
            self.task.core.emit(UnitEvent::Error(e));
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.task.core.status().is_exited()
    }
}

/// A single unit of work.
///
/// Cheap to clone; clones share the same underlying task.
///
/// # Example
/// ```
/// use serde_json::json;
/// use taskflow::{Task, TaskFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let task = Task::new("double", TaskFn::returning(|_| Ok(vec![json!(10)])));
/// let outcome = task.outcome();
/// task.run();
/// let result = outcome.await;
/// assert_eq!(result.values, vec![json!(10)]);
/// assert!(result.error.is_none());
/// # }
/// ```
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

impl Task {
    /// Creates a task with default configuration.
    pub fn new(name: impl Into<String>, method: TaskFn) -> Self {
        Task::builder().name(name).method(method).build()
    }

    /// Returns a builder for a task with custom configuration or listeners.
    pub fn builder() -> TaskBuilder {
        TaskBuilder::new()
    }

    pub(crate) fn from_parts(name: String, method: Option<TaskFn>, config: Config) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                core: Core::new(name, UnitKind::Task, config),
                method,
                scope: Mutex::new(None),
            }),
        }
    }

    pub(crate) fn core(&self) -> &Core {
        &self.inner.core
    }

    pub fn name(&self) -> &str {
        self.inner.core.name()
    }

    pub fn kind(&self) -> UnitKind {
        UnitKind::Task
    }

    pub fn status(&self) -> Status {
        self.inner.core.status()
    }

    /// The captured completion, once the task has exited.
    pub fn result(&self) -> Option<TaskResult> {
        self.inner.core.result()
    }

    /// The first error observed during the current execution.
    ///
    /// Cleared once the completion has been emitted; read [`Task::result`] afterwards.
    pub fn error(&self) -> Option<TaskError> {
        self.inner.core.error()
    }

    pub fn config(&self) -> &Config {
        self.inner.core.config()
    }

    pub fn is_started(&self) -> bool {
        self.status().is_started()
    }

    pub fn is_exited(&self) -> bool {
        self.status().is_exited()
    }

    pub fn is_completed(&self) -> bool {
        self.status().is_completed()
    }

    /// Starts the task: `pending` now, the callable on the next tick.
    ///
    /// Calling `run` outside the `created` state emits an `error` event instead.
    pub fn run(&self) -> &Self {
        if self.inner.core.begin_run() {
            let task = Arc::clone(&self.inner);
            if let Err(e) = tick::defer(move || task.fire()) {
                self.inner.core.emit(UnitEvent::Error(e));
            }
        }
        self
    }

    /// Calls `f` once with the task's result (deferred if already completed).
    pub fn once_done<F>(&self, f: F) -> &Self
    where
        F: FnOnce(TaskResult) + Send + 'static,
    {
        registry::once_done(&self.inner.core, f);
        self
    }

    /// Alias of [`Task::once_done`].
    pub fn done<F>(&self, f: F) -> &Self
    where
        F: FnOnce(TaskResult) + Send + 'static,
    {
        self.once_done(f)
    }

    /// Calls `f` on every `done` (deferred once if already completed).
    pub fn when_done<F>(&self, f: F) -> &Self
    where
        F: Fn(TaskResult) + Send + Sync + Clone + 'static,
    {
        registry::when_done(&self.inner.core, f);
        self
    }

    /// Future resolving with the task's result.
    pub fn outcome(&self) -> impl Future<Output = TaskResult> + Send + 'static {
        registry::outcome(&self.inner.core)
    }

    /// Destroys the task once it has completed: closes the scope, emits `destroyed`
    /// and drops every listener.
    pub fn destroy(&self) -> &Self {
        unit::destroy(&self.inner);
        self
    }

    /// True if both handles refer to the same task.
    pub fn ptr_eq(&self, other: &Task) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Emit for Task {
    fn on<F>(&self, kind: EventKind, f: F) -> ListenerId
    where
        F: Fn(&UnitEvent) + Send + Sync + 'static,
    {
        self.inner.core.emitter.on(kind, f)
    }

    fn once<F>(&self, kind: EventKind, f: F) -> ListenerId
    where
        F: Fn(&UnitEvent) + Send + Sync + 'static,
    {
        self.inner.core.emitter.once(kind, f)
    }

    fn off(&self, id: ListenerId) -> bool {
        self.inner.core.emitter.off(id)
    }

    fn remove_all_listeners(&self) {
        self.inner.core.emitter.remove_all();
    }

    fn listener_count(&self, kind: EventKind) -> usize {
        self.inner.core.emitter.listener_count(&kind)
    }

    fn emit(&self, event: UnitEvent) {
        self.inner.core.emit(event);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name())
            .field("status", &self.status())
            .field("method", &self.inner.method)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn recorder(task: &Task) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        for kind in [
            EventKind::Pending,
            EventKind::Running,
            EventKind::Failed,
            EventKind::Passed,
            EventKind::Completed,
            EventKind::Done,
            EventKind::Error,
            EventKind::Destroyed,
        ] {
            let log = Arc::clone(&log);
            task.on(kind, move |ev| lock(&log).push(ev.kind().as_label().to_string()));
        }
        log
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_returning_task_passes() {
        let task = Task::new("sum", TaskFn::returning(|_| Ok(vec![json!(5)])));
        let log = recorder(&task);
        let outcome = task.outcome();
        task.run();

        assert_eq!(task.status(), Status::Pending);
        let result = outcome.await;
        assert_eq!(result, TaskResult::ok(vec![json!(5)]));
        settle().await;

        assert_eq!(
            *lock(&log),
            vec!["pending", "running", "passed", "completed", "done", "destroyed"]
        );
        assert_eq!(task.status(), Status::Destroyed);
        assert_eq!(task.result(), Some(TaskResult::ok(vec![json!(5)])));
        assert_eq!(task.listener_count(EventKind::Done), 0);
    }

    #[tokio::test]
    async fn test_run_never_executes_inside_caller() {
        let task = Task::new("later", TaskFn::returning(|_| Ok(vec![])));
        task.run();
        assert_eq!(task.status(), Status::Pending);
        settle().await;
        assert!(task.is_exited());
    }

    #[tokio::test]
    async fn test_returned_error_fails_the_task() {
        let task = Task::builder()
            .name("broken")
            .method(TaskFn::returning(|_| Err(TaskError::fail("deliberate"))))
            .destroy_once_done(false)
            .build();
        let log = recorder(&task);
        let result = task.run().outcome().await;

        assert_eq!(result.error, Some(TaskError::fail("deliberate")));
        assert_eq!(task.status(), Status::Failed);
        assert_eq!(*lock(&log), vec!["pending", "running", "failed", "completed", "done"]);
        // transient error is cleared after emission; the result keeps it
        assert!(task.error().is_none());
    }

    #[tokio::test]
    async fn test_panicking_callable_is_captured() {
        let task = Task::new(
            "panics",
            TaskFn::returning(|_| {
                let v: Vec<Value> = Vec::new();
                if v.is_empty() {
                    panic!("bad input");
                }
                Ok(v)
            }),
        );
        let result = task.run().outcome().await;
        assert_eq!(
            result.error,
            Some(TaskError::Panicked {
                info: "bad input".into()
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_completes_later() {
        let task = Task::new(
            "cb",
            TaskFn::callback(|ctx| {
                let done = ctx.clone();
                ctx.spawn(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    done.ok(vec![json!("late")]);
                    Ok(())
                });
            }),
        );
        let result = task.run().outcome().await;
        assert_eq!(result.values, vec![json!("late")]);
    }

    #[tokio::test]
    async fn test_scoped_background_error_fails_task() {
        let task = Task::new(
            "bg",
            TaskFn::callback(|ctx| {
                ctx.spawn(async { Err(TaskError::fail("background")) });
            }),
        );
        let result = task.run().outcome().await;
        assert_eq!(result.error, Some(TaskError::fail("background")));
    }

    #[tokio::test]
    async fn test_ambi_return_value_honored_or_ignored() {
        let honored = Task::new("on", TaskFn::ambi(|_| Some(Ok(vec![json!(1)]))));
        assert_eq!(
            honored.run().outcome().await,
            TaskResult::ok(vec![json!(1)])
        );

        let ignored = Task::builder()
            .name("off")
            .method(TaskFn::ambi(|ctx| {
                ctx.ok(vec![json!(2)]);
                Some(Ok(vec![json!(1)]))
            }))
            .ambi(false)
            .build();
        assert_eq!(
            ignored.run().outcome().await,
            TaskResult::ok(vec![json!(2)])
        );
    }

    #[tokio::test]
    async fn test_future_task() {
        let task = Task::builder()
            .name("fut")
            .method(TaskFn::future(|ctx| async move {
                Ok(ctx.args().iter().rev().cloned().collect())
            }))
            .args(vec![json!(1), json!(2)])
            .build();
        let result = task.run().outcome().await;
        assert_eq!(result.values, vec![json!(2), json!(1)]);
    }

    #[tokio::test]
    async fn test_second_completion_is_excess() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let e = Arc::clone(&errors);
        let task = Task::builder()
            .name("twice")
            .method(TaskFn::callback(|ctx| {
                ctx.ok(vec![]);
                ctx.ok(vec![]);
            }))
            .destroy_once_done(false)
            .build();
        task.on(EventKind::Error, move |ev| {
            if let Some(err) = ev.error() {
                lock(&e).push(err.as_label());
            }
        });
        task.run();
        settle().await;
        assert_eq!(task.status(), Status::Passed);
        assert_eq!(*lock(&errors), vec!["excess_completion"]);
    }

    #[tokio::test]
    async fn test_deferred_completion_without_domain() {
        let task = Task::builder()
            .name("nodomain")
            .method(TaskFn::callback(|ctx| ctx.ok(vec![])))
            .domain(false)
            .build();
        let passed = Arc::new(Mutex::new(Vec::new()));
        let p = Arc::clone(&passed);
        let t = task.clone();
        task.on(EventKind::Running, move |_| {
            lock(&p).push(format!("running:{}", t.status()));
        });
        task.run();
        settle().await;
        assert_eq!(*lock(&passed), vec!["running:running"]);
        assert!(task.is_exited());
    }

    #[tokio::test]
    async fn test_missing_method_and_double_run() {
        let task = Task::builder().name("empty").build();
        let log = recorder(&task);
        task.run();
        task.run();
        settle().await;
        assert_eq!(task.status(), Status::Pending);
        assert_eq!(
            *lock(&log),
            vec!["pending", "error", "done", "error", "done"]
        );
    }

    #[tokio::test]
    async fn test_once_done_after_completion_is_deferred() {
        let task = Task::builder()
            .name("done")
            .method(TaskFn::returning(|_| Ok(vec![json!("x")])))
            .destroy_once_done(false)
            .build();
        task.run().outcome().await;

        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        task.once_done(move |r| *lock(&s) = Some(r));
        assert!(lock(&seen).is_none());
        settle().await;
        assert_eq!(*lock(&seen), Some(TaskResult::ok(vec![json!("x")])));
    }

    #[tokio::test]
    async fn test_destroy_before_completion_resolves_outcome() {
        let task = Task::new("never", TaskFn::callback(|_ctx| {}));
        let outcome = task.outcome();
        task.run();
        settle().await;
        // a done triggered by an error destroys the task
        task.destroy();
        task.emit(UnitEvent::Error(TaskError::fail("abort")));
        assert_eq!(task.status(), Status::Destroyed);
        assert_eq!(outcome.await.error, Some(TaskError::fail("abort")));
    }
}
