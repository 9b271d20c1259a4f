//! # Group: ordered children with bounded concurrency.
//!
//! A [`Group`] is itself a unit: it has the same state machine and emits the same
//! events as a task. Running a group dispatches its children in insertion order,
//! keeping at most `concurrency` of them running:
//!
//! ```text
//! run() ─► pending ─(next tick)─► running, active
//!   dispatch:  while active && !halted && running < limit
//!                pop front ─► child.once_done(child_done) ─► child.run()
//!   child_done: running -= 1, completed += 1
//!               store result, remember first error
//!               dispatch
//!   finish:    active && running == 0 && (remaining empty || halted)
//!                ─► complete(first_error, [child results…])
//! ```
//!
//! "Halted" means `on_error = Exit` and a child has failed: no new child is started,
//! the running ones are awaited.
//!
//! ## Rules
//! - Only children in the `created` state are accepted.
//! - A child belongs to one group at most, and is added once.
//! - The group's bus (if any) is attached to children that have none.
//! - Destroying a group destroys every child it still owns.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::mem;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;

use super::builder::GroupBuilder;
use super::config::{Config, OnError};
use super::emitter::{Emit, ListenerId};
use super::registry;
use super::status::{Status, UnitKind};
use super::task::Task;
use super::unit::{self, Core, Lifecycle};
use super::{lock, tick};
use crate::error::TaskError;
use crate::events::{Bus, EventKind, UnitEvent};
use crate::tasks::{TaskFn, TaskResult};

/// A schedulable child of a group.
#[derive(Clone, Debug)]
pub enum Item {
    Task(Task),
    Group(Group),
}

impl Item {
    pub fn name(&self) -> &str {
        match self {
            Item::Task(t) => t.name(),
            Item::Group(g) => g.name(),
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Item::Task(_) => UnitKind::Task,
            Item::Group(_) => UnitKind::Group,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Item::Task(t) => t.status(),
            Item::Group(g) => g.status(),
        }
    }

    fn core(&self) -> &Core {
        match self {
            Item::Task(t) => t.core(),
            Item::Group(g) => g.core(),
        }
    }

    fn run(&self) {
        match self {
            Item::Task(t) => {
                t.run();
            }
            Item::Group(g) => {
                g.run();
            }
        }
    }

    fn destroy(&self) {
        match self {
            Item::Task(t) => {
                t.destroy();
            }
            Item::Group(g) => {
                g.destroy();
            }
        }
    }
}

impl From<Task> for Item {
    fn from(task: Task) -> Self {
        Item::Task(task)
    }
}

impl From<Group> for Item {
    fn from(group: Group) -> Self {
        Item::Group(group)
    }
}

#[derive(Default)]
struct Sched {
    /// Every child added since the last reset, for teardown.
    owned: Vec<Item>,
    remaining: VecDeque<Item>,
    running: usize,
    completed: usize,
    results: Vec<Value>,
    first_error: Option<TaskError>,
    /// Set while the group is running and dispatching.
    active: bool,
}

pub(crate) struct GroupInner {
    core: Core,
    sched: Mutex<Sched>,
}

impl GroupInner {
    fn halted(&self, sched: &Sched) -> bool {
        self.core.config().on_error == OnError::Exit && sched.first_error.is_some()
    }

    fn fire(self: &Arc<Self>) {
        if !self.core.begin_execution() {
            return;
        }
        lock(&self.sched).active = true;
        self.dispatch();
    }

    fn dispatch(self: &Arc<Self>) {
        let limit = self.core.config().concurrency_limit();
        loop {
            let next = {
                let mut s = lock(&self.sched);
                if !s.active || self.halted(&s) || limit.is_some_and(|n| s.running >= n) {
                    None
                } else {
                    let next = s.remaining.pop_front();
                    if next.is_some() {
                        s.running += 1;
                    }
                    next
                }
            };
            let Some(item) = next else { break };
            self.start(item);
        }
        self.maybe_finish();
    }

    fn start(self: &Arc<Self>, item: Item) {
        debug!(group = %self.core.name(), item = %item.name(), kind = %item.kind(), "starting item");
        let group = Arc::clone(self);
        let name = item.name().to_string();
        registry::once_done(item.core(), move |result| group.child_done(&name, result));
        item.run();
    }

    fn child_done(self: &Arc<Self>, item: &str, result: TaskResult) {
        {
            let mut s = lock(&self.sched);
            s.running = s.running.saturating_sub(1);
            s.completed += 1;
            if self.core.config().store_result {
                s.results.push(result.to_value());
            }
            if s.first_error.is_none() {
                s.first_error = result.error.clone();
            }
        }
        debug!(group = %self.core.name(), item = %item, failed = result.is_err(), "item completed");
        self.dispatch();
    }

    fn maybe_finish(self: &Arc<Self>) {
        let outcome = {
            let mut s = lock(&self.sched);
            let drained = s.remaining.is_empty() || self.halted(&s);
            if s.active && s.running == 0 && drained {
                s.active = false;
                Some(TaskResult {
                    error: s.first_error.clone(),
                    values: mem::take(&mut s.results),
                })
            } else {
                None
            }
        };
        if let Some(result) = outcome {
            unit::complete(self, result);
        }
    }

    /// Prepares a completed `auto_clear` group for another run.
    fn reset(&self) {
        {
            let mut s = lock(&self.sched);
            s.running = 0;
            s.completed = 0;
            s.results.clear();
            s.first_error = None;
            s.active = false;
            s.owned = s.remaining.iter().cloned().collect();
        }
        self.core.reset();
        debug!(group = %self.core.name(), "cleared for another run");
    }
}

impl Lifecycle for GroupInner {
    fn core(&self) -> &Core {
        &self.core
    }

    fn release(&self) {
        let owned = {
            let mut s = lock(&self.sched);
            s.remaining.clear();
            s.active = false;
            mem::take(&mut s.owned)
        };
        for item in owned {
            item.destroy();
        }
    }
}

/// An ordered collection of tasks and nested groups, itself runnable as a unit.
///
/// Cheap to clone; clones share the same underlying group.
///
/// # Example
/// ```
/// use serde_json::json;
/// use taskflow::{Group, TaskFn};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let group = Group::builder().name("pipeline").concurrency(1).build();
/// group.create_task("fetch", TaskFn::returning(|_| Ok(vec![json!("data")])));
/// group.create_task("parse", TaskFn::returning(|_| Ok(vec![json!(42)])));
///
/// let result = group.run().outcome().await;
/// assert!(result.error.is_none());
/// assert_eq!(result.values, vec![json!([null, "data"]), json!([null, 42])]);
/// # }
/// ```
#[derive(Clone)]
pub struct Group {
    inner: Arc<GroupInner>,
}

impl Group {
    /// Creates a group with default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Group::builder().name(name).build()
    }

    /// Returns a builder for a group with custom configuration or listeners.
    pub fn builder() -> GroupBuilder {
        GroupBuilder::new()
    }

    pub(crate) fn from_parts(name: String, mut config: Config) -> Self {
        if config.auto_clear {
            config.destroy_once_done = false;
        }
        Self {
            inner: Arc::new(GroupInner {
                core: Core::new(name, UnitKind::Group, config),
                sched: Mutex::new(Sched::default()),
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
        UnitKind::Group
    }

    pub fn status(&self) -> Status {
        self.inner.core.status()
    }

    pub fn result(&self) -> Option<TaskResult> {
        self.inner.core.result()
    }

    pub fn error(&self) -> Option<TaskError> {
        self.inner.core.error()
    }

    pub fn config(&self) -> &Config {
        self.inner.core.config()
    }

    pub fn bus(&self) -> Option<Bus> {
        self.inner.core.bus()
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

    /// True while children are being dispatched.
    pub fn is_running(&self) -> bool {
        lock(&self.inner.sched).active
    }

    /// Children added since the group was created (or last cleared).
    pub fn items_total(&self) -> usize {
        let s = lock(&self.inner.sched);
        s.completed + s.running + s.remaining.len()
    }

    pub fn items_remaining(&self) -> usize {
        lock(&self.inner.sched).remaining.len()
    }

    pub fn items_running(&self) -> usize {
        lock(&self.inner.sched).running
    }

    pub fn items_completed(&self) -> usize {
        lock(&self.inner.sched).completed
    }

    /// Adds a task or group to the end of the queue.
    ///
    /// Rejections are reported as `error` events:
    /// - the group is destroyed, or completed without `auto_clear` → `Closed`
    /// - the group runs and `accept_while_running` is off → `NotAccepting`
    /// - the child is not in the `created` state → `NotCreated`
    /// - the child was already added to a group → `AlreadyOwned`
    pub fn add_item(&self, item: impl Into<Item>) -> &Self {
        let item = item.into();
        let core = &self.inner.core;
        let config = core.config();
        let status = core.status();

        let rejection = if status == Status::Destroyed
            || (status.is_completed() && !config.auto_clear)
        {
            Some(TaskError::Closed {
                name: core.name().to_string(),
                status,
            })
        } else if matches!(status, Status::Pending | Status::Running) && !config.accept_while_running
        {
            Some(TaskError::NotAccepting {
                name: core.name().to_string(),
            })
        } else {
            item.core().claim(core.name()).err()
        };
        if let Some(e) = rejection {
            core.emit(UnitEvent::Error(e));
            return self;
        }

        if let Some(bus) = core.bus() {
            item.core().attach_bus(bus);
        }
        debug!(group = %core.name(), item = %item.name(), kind = %item.kind(), "item added");
        {
            let mut s = lock(&self.inner.sched);
            s.owned.push(item.clone());
            s.remaining.push_back(item);
        }
        self.inner.dispatch();
        self
    }

    pub fn add_task(&self, task: Task) -> &Self {
        self.add_item(task)
    }

    pub fn add_tasks(&self, tasks: impl IntoIterator<Item = Task>) -> &Self {
        for task in tasks {
            self.add_item(task);
        }
        self
    }

    pub fn add_group(&self, group: Group) -> &Self {
        self.add_item(group)
    }

    pub fn add_groups(&self, groups: impl IntoIterator<Item = Group>) -> &Self {
        for group in groups {
            self.add_item(group);
        }
        self
    }

    /// Builds a task from the group's `nested_task` defaults and adds it.
    pub fn create_task(&self, name: impl Into<String>, method: TaskFn) -> Task {
        let task = Task::builder()
            .config(self.config().nested_task_config())
            .name(name)
            .method(method)
            .build();
        self.add_task(task.clone());
        task
    }

    /// Builds a group from the group's `nested_group` defaults and adds it.
    pub fn create_group(&self, name: impl Into<String>) -> Group {
        let group = Group::builder()
            .config(self.config().nested_group_config())
            .name(name)
            .build();
        self.add_group(group.clone());
        group
    }

    /// Starts dispatching children on the next tick.
    ///
    /// A completed `auto_clear` group is reset first and runs whatever was added since.
    pub fn run(&self) -> &Self {
        let core = &self.inner.core;
        if core.config().auto_clear && core.status().is_completed() {
            self.inner.reset();
        }
        if core.begin_run() {
            let group = Arc::clone(&self.inner);
            if let Err(e) = tick::defer(move || group.fire()) {
                core.emit(UnitEvent::Error(e));
            }
        }
        self
    }

    pub fn once_done<F>(&self, f: F) -> &Self
    where
        F: FnOnce(TaskResult) + Send + 'static,
    {
        registry::once_done(&self.inner.core, f);
        self
    }

    /// Alias of [`Group::once_done`].
    pub fn done<F>(&self, f: F) -> &Self
    where
        F: FnOnce(TaskResult) + Send + 'static,
    {
        self.once_done(f)
    }

    pub fn when_done<F>(&self, f: F) -> &Self
    where
        F: Fn(TaskResult) + Send + Sync + Clone + 'static,
    {
        registry::when_done(&self.inner.core, f);
        self
    }

    /// Future resolving with the group's result.
    pub fn outcome(&self) -> impl Future<Output = TaskResult> + Send + 'static {
        registry::outcome(&self.inner.core)
    }

    /// Destroys the group (and its children) once it has completed.
    pub fn destroy(&self) -> &Self {
        unit::destroy(&self.inner);
        self
    }

    /// True if both handles refer to the same group.
    pub fn ptr_eq(&self, other: &Group) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Emit for Group {
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

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = lock(&self.inner.sched);
        f.debug_struct("Group")
            .field("name", &self.name())
            .field("status", &self.status())
            .field("remaining", &s.remaining.len())
            .field("running", &s.running)
            .field("completed", &s.completed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn delayed(order: &Arc<Mutex<Vec<String>>>, name: &str, ms: u64) -> TaskFn {
        let order = Arc::clone(order);
        let name = name.to_string();
        TaskFn::callback(move |ctx| {
            let order = Arc::clone(&order);
            let name = name.clone();
            let done = ctx.clone();
            ctx.spawn(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                lock(&order).push(name);
                done.ok(vec![]);
                Ok(())
            });
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_children_finish_by_duration() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let group = Group::new("parallel");
        group.create_task("slow", delayed(&order, "slow", 1000));
        group.create_task("fast", delayed(&order, "fast", 500));

        let result = group.run().outcome().await;
        assert!(result.error.is_none());
        assert_eq!(*lock(&order), vec!["fast", "slow"]);
        assert_eq!(group.items_completed(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_serial_children_run_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let group = Group::builder().name("serial").concurrency(1).build();
        group.create_task("slow", delayed(&order, "slow", 1000));
        group.create_task("fast", delayed(&order, "fast", 500));

        let started = tokio::time::Instant::now();
        group.run().outcome().await;
        assert_eq!(*lock(&order), vec!["slow", "fast"]);
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_result_collects_child_results_in_completion_order() {
        let group = Group::new("collect");
        group.create_task("a", TaskFn::returning(|_| Ok(vec![json!(1)])));
        group.create_task("b", TaskFn::returning(|_| Err(TaskError::fail("b broke"))));
        group.create_task("c", TaskFn::returning(|_| Ok(vec![json!(3)])));

        let result = group.run().outcome().await;
        assert_eq!(result.error, Some(TaskError::fail("b broke")));
        assert_eq!(
            result.values,
            vec![
                json!([null, 1]),
                json!(["execution failed: b broke"]),
                json!([null, 3]),
            ]
        );
    }

    #[tokio::test]
    async fn test_exit_on_error_skips_remaining() {
        let group = Group::builder()
            .name("exit")
            .concurrency(1)
            .on_error(OnError::Exit)
            .destroy_once_done(false)
            .build();
        group.create_task("first", TaskFn::returning(|_| Err(TaskError::fail("stop"))));
        let skipped = group.create_task("second", TaskFn::returning(|_| Ok(vec![])));

        let result = group.run().outcome().await;
        assert_eq!(result.error, Some(TaskError::fail("stop")));
        assert_eq!(group.status(), Status::Failed);
        assert_eq!(skipped.status(), Status::Created);
        assert_eq!(group.items_remaining(), 1);
    }

    #[tokio::test]
    async fn test_empty_group_passes() {
        let group = Group::new("empty");
        let result = group.run().outcome().await;
        assert_eq!(result, TaskResult::ok(vec![]));
    }

    #[tokio::test]
    async fn test_nested_group_reports_like_a_task() {
        let outer = Group::builder().name("outer").store_result(true).build();
        let inner = outer.create_group("inner");
        inner.create_task("leaf", TaskFn::returning(|_| Ok(vec![json!("leaf")])));

        let result = outer.run().outcome().await;
        assert_eq!(result.values, vec![json!([null, [null, "leaf"]])]);
    }

    #[tokio::test]
    async fn test_rejections_are_error_events() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let group = Group::builder()
            .name("strict")
            .accept_while_running(false)
            .destroy_once_done(false)
            .build();
        let e = Arc::clone(&errors);
        group.on(EventKind::Error, move |ev| {
            if let Some(err) = ev.error() {
                lock(&e).push(err.as_label());
            }
        });

        let started = Task::new("started", TaskFn::returning(|_| Ok(vec![])));
        started.run();
        group.add_task(started);

        group.run();
        group.add_task(Task::new("late", TaskFn::returning(|_| Ok(vec![]))));
        group.outcome().await;
        group.add_task(Task::new("after", TaskFn::returning(|_| Ok(vec![]))));

        assert_eq!(
            *lock(&errors),
            vec!["item_not_created", "group_not_accepting", "group_closed"]
        );
        assert_eq!(group.items_total(), 0);
    }

    #[tokio::test]
    async fn test_accepts_children_while_running() {
        let group = Group::new("open");
        let late_group = group.clone();
        group.create_task(
            "first",
            TaskFn::returning(move |_| {
                late_group.create_task("added", TaskFn::returning(|_| Ok(vec![json!("added")])));
                Ok(vec![json!("first")])
            }),
        );
        let result = group.run().outcome().await;
        assert_eq!(result.values.len(), 2);
        assert_eq!(group.items_completed(), 2);
    }

    #[tokio::test]
    async fn test_auto_clear_group_runs_again() {
        let group = Group::builder().name("reusable").auto_clear(true).build();
        group.create_task("one", TaskFn::returning(|_| Ok(vec![json!(1)])));
        let first = group.run().outcome().await;
        assert_eq!(first.values, vec![json!([null, 1])]);
        assert_eq!(group.status(), Status::Passed);

        group.create_task("two", TaskFn::returning(|_| Ok(vec![json!(2)])));
        let second = group.run().outcome().await;
        assert_eq!(second.values, vec![json!([null, 2])]);
        assert_eq!(group.items_completed(), 1);
    }

    #[tokio::test]
    async fn test_group_destroy_tears_down_children() {
        let group = Group::new("owner");
        let child = group.create_task("child", TaskFn::returning(|_| Ok(vec![])));
        let destroyed = Arc::new(Mutex::new(Vec::new()));
        let d = Arc::clone(&destroyed);
        group.on(EventKind::Destroyed, move |_| lock(&d).push("group"));

        group.run().outcome().await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        assert_eq!(group.status(), Status::Destroyed);
        assert_eq!(child.status(), Status::Destroyed);
        assert_eq!(*lock(&destroyed), vec!["group"]);
    }

    #[tokio::test]
    async fn test_bus_is_shared_with_children() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let group = Group::builder().name("observed").bus(bus).build();
        group.create_task("child", TaskFn::returning(|_| Ok(vec![])));
        group.run().outcome().await;

        let mut units = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::Passed {
                units.push(ev.unit.as_deref().unwrap_or_default().to_string());
            }
        }
        assert_eq!(units, vec!["child", "observed"]);
    }

    #[tokio::test]
    async fn test_child_belongs_to_one_group() {
        let task = Task::builder()
            .name("shared")
            .method(TaskFn::returning(|_| Ok(vec![json!(1)])))
            .destroy_once_done(false)
            .build();
        let a = Group::builder().name("a").destroy_once_done(false).build();
        let b = Group::builder().name("b").destroy_once_done(false).build();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let e = Arc::clone(&errors);
        b.on(EventKind::Error, move |ev| {
            if let Some(err) = ev.error() {
                lock(&e).push(err.clone());
            }
        });

        a.add_task(task.clone());
        b.add_task(task.clone());
        assert_eq!(
            *lock(&errors),
            vec![TaskError::AlreadyOwned {
                name: "b".into(),
                item: "shared".into()
            }]
        );
        assert_eq!(b.items_total(), 0);

        let ra = a.run().outcome().await;
        let rb = b.run().outcome().await;
        assert_eq!(ra, TaskResult::ok(vec![json!([null, 1])]));
        assert_eq!(rb, TaskResult::ok(vec![]));
        assert_eq!(task.status(), Status::Passed);
    }

    #[tokio::test]
    async fn test_same_child_added_twice_runs_once() {
        let group = Group::builder().name("twice").destroy_once_done(false).build();
        let task = Task::new("dup", TaskFn::returning(|_| Ok(vec![json!(7)])));
        group.add_task(task.clone()).add_task(task.clone());
        assert_eq!(group.items_total(), 1);

        let result = group.run().outcome().await;
        assert_eq!(result, TaskResult::ok(vec![json!([null, 7])]));
        assert_eq!(group.status(), Status::Passed);
        assert_eq!(group.items_completed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_error_kept_when_siblings_fail() {
        let group = Group::builder().name("failing").destroy_once_done(false).build();
        let failed = Arc::new(Mutex::new(0usize));
        let f = Arc::clone(&failed);
        group.on(EventKind::Failed, move |_| *lock(&f) += 1);

        group.create_task("a", TaskFn::returning(|_| Err(TaskError::fail("a"))));
        group.create_task(
            "b",
            TaskFn::future(|_ctx| async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Err(TaskError::fail("b"))
            }),
        );

        let result = group.run().outcome().await;
        assert_eq!(result.error, Some(TaskError::fail("a")));
        assert_eq!(
            result.values,
            vec![json!(["execution failed: a"]), json!(["execution failed: b"])]
        );
        assert_eq!(group.status(), Status::Failed);
        assert_eq!(*lock(&failed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_group_runs_children_one_at_a_time() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let group = Group::builder().name("sync").sync(true).build();
        assert_eq!(group.config().concurrency_limit(), Some(1));
        group.create_task("slow", delayed(&order, "slow", 1000));
        group.create_task("fast", delayed(&order, "fast", 500));

        let started = tokio::time::Instant::now();
        let result = group.run().outcome().await;
        assert!(result.error.is_none());
        assert_eq!(*lock(&order), vec!["slow", "fast"]);
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_when_done_survives_auto_clear() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let group = Group::builder().name("repeat").auto_clear(true).build();
        let h = Arc::clone(&hits);
        group.when_done(move |result| lock(&h).push(result.values.len()));

        group.create_task("one", TaskFn::returning(|_| Ok(vec![json!(1)])));
        group.run().outcome().await;
        assert_eq!(*lock(&hits), vec![1]);

        group.create_task("two", TaskFn::returning(|_| Ok(vec![json!(2)])));
        group.run().outcome().await;
        assert_eq!(*lock(&hits), vec![1, 1]);
    }
}
