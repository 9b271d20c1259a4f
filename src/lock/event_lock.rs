use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::oneshot;
use tracing::trace;

use super::EventNames;
use crate::core::{Emitter, Group, GroupBuilder, ListenerId, lock};
use crate::error::{LockError, TaskError};
use crate::tasks::{TaskContext, TaskFn};

type Waiter = Box<dyn FnOnce() + Send>;

/// Transition announced as `<name>:<phase>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Locked,
    Unlocked,
    Started,
    Finished,
}

impl Phase {
    pub fn as_label(&self) -> &'static str {
        match self {
            Phase::Locked => "locked",
            Phase::Unlocked => "unlocked",
            Phase::Started => "started",
            Phase::Finished => "finished",
        }
    }

    /// Full notification name for `name`, e.g. `"db:locked"`.
    pub fn event(&self, name: &str) -> String {
        format!("{name}:{}", self.as_label())
    }
}

#[derive(Default)]
struct Record {
    locked: bool,
    finished: bool,
    waiters: VecDeque<Waiter>,
}

/// Handed to completion-style handlers when their event is emitted.
struct Dispatch {
    data: Value,
    group: Group,
}

struct Shared {
    records: Mutex<HashMap<String, Record>>,
    emitter: Emitter<String, ()>,
    handlers: Emitter<String, Dispatch>,
}

/// Mutual exclusion keyed by event name.
///
/// Cheap to clone; clones share the same lock table. Continuations run synchronously:
/// either inside the call that acquired the lock, or inside the `unlock` that handed
/// it over.
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use taskflow::EventLock;
///
/// let events = EventLock::new();
/// let log = Arc::new(Mutex::new(Vec::new()));
///
/// let l = Arc::clone(&log);
/// events.lock("db", move || l.lock().unwrap().push("first"));
/// let l = Arc::clone(&log);
/// events.lock("db", move || l.lock().unwrap().push("second"));
/// assert_eq!(*log.lock().unwrap(), vec!["first"]);
///
/// events.unlock("db", || {});
/// assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
/// assert!(events.is_locked("db"));
/// ```
#[derive(Clone)]
pub struct EventLock {
    inner: Arc<Shared>,
}

impl Default for EventLock {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Shared {
                records: Mutex::new(HashMap::new()),
                emitter: Emitter::new(),
                handlers: Emitter::new(),
            }),
        }
    }

    fn notify(&self, name: &str, phase: Phase) {
        trace!(event = %name, phase = phase.as_label(), "lock transition");
        self.inner.emitter.emit(&phase.event(name), &());
    }

    /// Acquires `name`, then calls `next`. Queues `next` (FIFO) while `name` is held.
    pub fn lock<F>(&self, name: &str, next: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.lock_boxed(name, Box::new(next));
        self
    }

    fn lock_boxed(&self, name: &str, next: Waiter) {
        let acquired = {
            let mut records = lock(&self.inner.records);
            let rec = records.entry(name.to_string()).or_default();
            if rec.locked {
                rec.waiters.push_back(next);
                None
            } else {
                rec.locked = true;
                Some(next)
            }
        };
        match acquired {
            Some(next) => {
                self.notify(name, Phase::Locked);
                next();
            }
            None => trace!(event = %name, "lock queued"),
        }
    }

    /// Releases `name`, then calls `next`.
    ///
    /// If callers are queued on `name`, the first one takes the lock over before `next`
    /// runs.
    pub fn unlock<F>(&self, name: &str, next: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handoff = {
            let mut records = lock(&self.inner.records);
            let rec = records.entry(name.to_string()).or_default();
            match rec.waiters.pop_front() {
                Some(waiter) => {
                    rec.locked = true;
                    Some(waiter)
                }
                None => {
                    rec.locked = false;
                    None
                }
            }
        };
        self.notify(name, Phase::Unlocked);
        if let Some(waiter) = handoff {
            self.notify(name, Phase::Locked);
            waiter();
        }
        next();
        self
    }

    /// Locks `name` and marks the phase as not finished.
    pub fn start<F>(&self, name: &str, next: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        let this = self.clone();
        let owned = name.to_string();
        self.lock(name, move || {
            if let Some(rec) = lock(&this.inner.records).get_mut(&owned) {
                rec.finished = false;
            }
            this.notify(&owned, Phase::Started);
            next();
        })
    }

    /// Marks the phase as finished and unlocks `name`.
    pub fn finish<F>(&self, name: &str, next: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        lock(&self.inner.records)
            .entry(name.to_string())
            .or_default()
            .finished = true;
        let this = self.clone();
        let owned = name.to_string();
        self.unlock(name, move || {
            this.notify(&owned, Phase::Finished);
            next();
        })
    }

    /// Alias of [`EventLock::finish`].
    pub fn finished<F>(&self, name: &str, next: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.finish(name, next)
    }

    pub fn is_locked(&self, name: &str) -> bool {
        lock(&self.inner.records)
            .get(name)
            .is_some_and(|rec| rec.locked)
    }

    pub fn is_finished(&self, name: &str) -> bool {
        lock(&self.inner.records)
            .get(name)
            .is_some_and(|rec| rec.finished)
    }

    /// Calls `f` now if `name` is free, otherwise on its next `unlocked` notification.
    pub fn once_unlocked<F>(&self, name: &str, f: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        let ready = {
            let records = lock(&self.inner.records);
            let locked = records.get(name).is_some_and(|rec| rec.locked);
            if locked {
                self.inner
                    .emitter
                    .once_fn(Phase::Unlocked.event(name), move |_| f());
                None
            } else {
                Some(f)
            }
        };
        if let Some(f) = ready {
            f();
        }
        self
    }

    /// Calls `f` now if `name` has finished, otherwise on its next `finished` notification.
    pub fn once_finished<F>(&self, name: &str, f: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        let ready = {
            let records = lock(&self.inner.records);
            let finished = records.get(name).is_some_and(|rec| rec.finished);
            if finished {
                Some(f)
            } else {
                self.inner
                    .emitter
                    .once_fn(Phase::Finished.event(name), move |_| f());
                None
            }
        };
        if let Some(f) = ready {
            f();
        }
        self
    }

    /// Calls `f` on every `finished` notification of `name`, and now if it already finished.
    pub fn when_finished<F>(&self, name: &str, f: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let listener = Arc::clone(&f);
        let (id, finished) = {
            let records = lock(&self.inner.records);
            let id = self
                .inner
                .emitter
                .on(Phase::Finished.event(name), move |_| listener());
            (id, records.get(name).is_some_and(|rec| rec.finished))
        };
        if finished {
            f();
        }
        id
    }

    /// Subscribes to a raw notification such as `"db:started"`.
    pub fn when<F>(&self, event: impl Into<String>, f: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.emitter.on(event.into(), move |_| f())
    }

    /// Detaches a listener registered with [`EventLock::when`],
    /// [`EventLock::when_finished`] or [`EventLock::handle`].
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.emitter.off(id) || self.inner.handlers.off(id)
    }

    /// Registers a completion-style handler for `event`.
    ///
    /// The handler receives the emitted data and a [`TaskContext`] it must complete.
    /// It is only run by [`EventLock::emit_parallel`] and [`EventLock::emit_serial`].
    pub fn handle<F>(&self, event: impl Into<String>, f: F) -> ListenerId
    where
        F: Fn(&Value, TaskContext) + Send + Sync + 'static,
    {
        let event = event.into();
        let f = Arc::new(f);
        self.inner.handlers.on(event.clone(), move |dispatch: &Dispatch| {
            let f = Arc::clone(&f);
            let data = dispatch.data.clone();
            dispatch.group.create_task(
                format!("{event} handler"),
                TaskFn::callback(move |ctx| f(&data, ctx)),
            );
        })
    }

    /// Runs every handler of `event` at once; `next` gets the first error once all
    /// of them completed.
    ///
    /// # Example
    /// ```
    /// use serde_json::json;
    /// use taskflow::EventLock;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let events = EventLock::new();
    /// events.handle("save", |data, ctx| ctx.ok(vec![data.clone()]));
    ///
    /// let (tx, rx) = tokio::sync::oneshot::channel();
    /// events.emit_parallel("save", json!({"id": 1}), move |res| {
    ///     let _ = tx.send(res);
    /// });
    /// assert!(rx.await.unwrap().is_ok());
    /// # }
    /// ```
    pub fn emit_parallel<F>(&self, event: &str, data: Value, next: F) -> &Self
    where
        F: FnOnce(Result<(), TaskError>) + Send + 'static,
    {
        self.emit_through(Group::builder(), event, data, next)
    }

    /// Runs the handlers of `event` one after another, in registration order.
    pub fn emit_serial<F>(&self, event: &str, data: Value, next: F) -> &Self
    where
        F: FnOnce(Result<(), TaskError>) + Send + 'static,
    {
        self.emit_through(Group::builder().sync(true), event, data, next)
    }

    fn emit_through<F>(&self, builder: GroupBuilder, event: &str, data: Value, next: F) -> &Self
    where
        F: FnOnce(Result<(), TaskError>) + Send + 'static,
    {
        let group = builder.name(format!("{event} handlers")).build();
        let dispatch = Dispatch {
            data,
            group: group.clone(),
        };
        self.inner.handlers.emit(&event.to_string(), &dispatch);
        trace!(event = %event, handlers = group.items_total(), "emitting to handlers");
        group.once_done(move |result| {
            next(match result.error {
                Some(e) => Err(e),
                None => Ok(()),
            })
        });
        group.run();
        self
    }

    /// Locks every name in `names`; `next(Ok(()))` runs once all of them are held.
    ///
    /// A malformed set is reported to `next` immediately and nothing is locked.
    pub fn block<F>(&self, names: impl Into<EventNames>, next: F) -> &Self
    where
        F: FnOnce(Result<(), LockError>) + Send + 'static,
    {
        self.for_each_name(names.into(), next, |this, name, done| {
            this.lock(name, done);
        });
        self
    }

    /// Unlocks every name in `names`; `next(Ok(()))` runs once all of them are released.
    pub fn unblock<F>(&self, names: impl Into<EventNames>, next: F) -> &Self
    where
        F: FnOnce(Result<(), LockError>) + Send + 'static,
    {
        self.for_each_name(names.into(), next, |this, name, done| {
            this.unlock(name, done);
        });
        self
    }

    fn for_each_name<F, Op>(&self, names: EventNames, next: F, op: Op)
    where
        F: FnOnce(Result<(), LockError>) + Send + 'static,
        Op: Fn(&Self, &str, Box<dyn FnOnce() + Send>),
    {
        let names = match names.validate() {
            Ok(names) => names,
            Err(e) => {
                next(Err(e));
                return;
            }
        };
        let pending = Arc::new(AtomicUsize::new(names.len()));
        let next = Arc::new(Mutex::new(Some(next)));
        for name in &names {
            let pending = Arc::clone(&pending);
            let next = Arc::clone(&next);
            op(
                self,
                name,
                Box::new(move || {
                    if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                        if let Some(next) = lock(&next).take() {
                            next(Ok(()));
                        }
                    }
                }),
            );
        }
    }

    /// Waits until `name` is held by the caller.
    ///
    /// Dropping the returned future after the lock was granted leaves `name` locked;
    /// pair every completed `acquire` with [`EventLock::release`].
    pub async fn acquire(&self, name: &str) {
        let (tx, rx) = oneshot::channel();
        self.lock(name, move || {
            let _ = tx.send(());
        });
        let _ = rx.await;
    }

    /// Releases `name` acquired with [`EventLock::acquire`].
    pub fn release(&self, name: &str) {
        self.unlock(name, || {});
    }
}

impl fmt::Debug for EventLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = lock(&self.inner.records);
        let mut locked: Vec<&str> = records
            .iter()
            .filter(|(_, rec)| rec.locked)
            .map(|(name, _)| name.as_str())
            .collect();
        locked.sort_unstable();
        f.debug_struct("EventLock").field("locked", &locked).finish()
    }
}
