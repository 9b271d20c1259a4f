use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use super::config::{Config, OnError};
use super::registry;
use super::unit::Core;
use super::{Group, Task, UnitKind};
use crate::events::{Bus, EventKind, UnitEvent};
use crate::tasks::{TaskFn, TaskResult};

static UNIT_SEQ: AtomicU64 = AtomicU64::new(1);

fn default_name(kind: UnitKind) -> String {
    format!("{kind} {}", UNIT_SEQ.fetch_add(1, Ordering::Relaxed))
}

type EventFn = Arc<dyn Fn(&UnitEvent) + Send + Sync>;
type DoneFn = Arc<dyn Fn(TaskResult) + Send + Sync>;

/// Listeners collected by a builder, attached when the unit is built.
#[derive(Default)]
struct Bindings {
    on: Vec<(EventKind, EventFn)>,
    once: Vec<(EventKind, EventFn)>,
    once_done: Vec<Box<dyn FnOnce(TaskResult) + Send>>,
    when_done: Vec<DoneFn>,
}

impl Bindings {
    fn attach(self, core: &Core) {
        for (kind, f) in self.on {
            core.emitter.on(kind, move |ev| f(ev));
        }
        for (kind, f) in self.once {
            core.emitter.once(kind, move |ev| f(ev));
        }
        for f in self.once_done {
            registry::once_done(core, f);
        }
        for f in self.when_done {
            registry::when_done(core, move |r| f(r));
        }
    }
}

macro_rules! shared_setters {
    () => {
        /// Replaces the whole configuration. Call before the field setters.
        pub fn config(mut self, config: Config) -> Self {
            self.config = config;
            self
        }

        pub fn sync(mut self, on: bool) -> Self {
            self.config.sync = on;
            self
        }

        pub fn domain(mut self, on: bool) -> Self {
            self.config.domain = on;
            self
        }

        pub fn destroy_once_done(mut self, on: bool) -> Self {
            self.config.destroy_once_done = on;
            self
        }

        pub fn error_on_excess_completions(mut self, on: bool) -> Self {
            self.config.error_on_excess_completions = on;
            self
        }

        /// Publishes every event of the unit on `bus`.
        pub fn bus(mut self, bus: Bus) -> Self {
            self.config.bus = Some(bus);
            self
        }

        /// Attaches `f` for every `kind` event.
        pub fn on<F>(mut self, kind: EventKind, f: F) -> Self
        where
            F: Fn(&UnitEvent) + Send + Sync + 'static,
        {
            self.bindings.on.push((kind, Arc::new(f)));
            self
        }

        /// Attaches `f` for the first `kind` event.
        pub fn once<F>(mut self, kind: EventKind, f: F) -> Self
        where
            F: Fn(&UnitEvent) + Send + Sync + 'static,
        {
            self.bindings.once.push((kind, Arc::new(f)));
            self
        }

        pub fn once_done<F>(mut self, f: F) -> Self
        where
            F: FnOnce(TaskResult) + Send + 'static,
        {
            self.bindings.once_done.push(Box::new(f));
            self
        }

        /// Alias of `once_done`.
        pub fn done<F>(self, f: F) -> Self
        where
            F: FnOnce(TaskResult) + Send + 'static,
        {
            self.once_done(f)
        }

        /// Alias of `once_done`.
        pub fn next<F>(self, f: F) -> Self
        where
            F: FnOnce(TaskResult) + Send + 'static,
        {
            self.once_done(f)
        }

        pub fn when_done<F>(mut self, f: F) -> Self
        where
            F: Fn(TaskResult) + Send + Sync + 'static,
        {
            self.bindings.when_done.push(Arc::new(f));
            self
        }
    };
}

/// Builder for [`Task`].
///
/// Listeners given to the builder are attached before the task is returned, so they
/// observe every event, including the ones of an immediate `run()`.
#[derive(Default)]
pub struct TaskBuilder {
    name: Option<String>,
    method: Option<TaskFn>,
    config: Config,
    bindings: Bindings,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the task name. Defaults to `"task N"`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the callable.
    pub fn method(mut self, method: TaskFn) -> Self {
        self.method = Some(method);
        self
    }

    /// Arguments handed to the callable.
    pub fn args(mut self, args: Vec<Value>) -> Self {
        self.config.args = args;
        self
    }

    /// Honor values returned by `ambi` callables.
    pub fn ambi(mut self, on: bool) -> Self {
        self.config.ambi = on;
        self
    }

    shared_setters!();

    pub fn build(self) -> Task {
        let name = self.name.unwrap_or_else(|| default_name(UnitKind::Task));
        let task = Task::from_parts(name, self.method, self.config);
        self.bindings.attach(task.core());
        task
    }
}

/// Builder for [`Group`].
#[derive(Default)]
pub struct GroupBuilder {
    name: Option<String>,
    config: Config,
    bindings: Bindings,
}

impl GroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the group name. Defaults to `"group N"`.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Maximum simultaneously running children (`0` = unlimited).
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.config.concurrency = limit;
        self
    }

    /// Allow re-running the group once it completed.
    pub fn auto_clear(mut self, on: bool) -> Self {
        self.config.auto_clear = on;
        self
    }

    pub fn on_error(mut self, on_error: OnError) -> Self {
        self.config.on_error = on_error;
        self
    }

    pub fn store_result(mut self, on: bool) -> Self {
        self.config.store_result = on;
        self
    }

    pub fn accept_while_running(mut self, on: bool) -> Self {
        self.config.accept_while_running = on;
        self
    }

    /// Defaults for tasks created with [`Group::create_task`].
    pub fn nested_task(mut self, config: Config) -> Self {
        self.config.nested_task = Some(Box::new(config));
        self
    }

    /// Defaults for groups created with [`Group::create_group`].
    pub fn nested_group(mut self, config: Config) -> Self {
        self.config.nested_group = Some(Box::new(config));
        self
    }

    shared_setters!();

    pub fn build(self) -> Group {
        let name = self.name.unwrap_or_else(|| default_name(UnitKind::Group));
        let group = Group::from_parts(name, self.config);
        self.bindings.attach(group.core());
        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Emit;

    #[test]
    fn test_default_names_are_numbered_per_kind() {
        let a = TaskBuilder::new().build();
        let b = GroupBuilder::new().build();
        assert!(a.name().starts_with("task "));
        assert!(b.name().starts_with("group "));
        assert_ne!(a.name()[5..], b.name()[6..]);
    }

    #[test]
    fn test_builder_listeners_are_attached() {
        let task = TaskBuilder::new()
            .name("t")
            .on(EventKind::Running, |_| {})
            .once(EventKind::Running, |_| {})
            .when_done(|_| {})
            .build();
        assert_eq!(task.listener_count(EventKind::Running), 2);
        assert_eq!(task.listener_count(EventKind::Done), 1);
    }

    #[test]
    fn test_config_then_field_setters() {
        let group = GroupBuilder::new()
            .config(Config {
                store_result: false,
                ..Config::default()
            })
            .concurrency(2)
            .on_error(OnError::Exit)
            .build();
        assert!(!group.config().store_result);
        assert_eq!(group.config().concurrency_limit(), Some(2));
        assert_eq!(group.config().on_error, OnError::Exit);
    }
}
