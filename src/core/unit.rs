//! # Shared unit core: state machine, emission and completion.
//!
//! [`Core`] is composed into both tasks and groups. It owns the lifecycle state, the
//! listener registry and the optional bus, and implements the parts of the contract
//! that are identical for both kinds of unit:
//!
//! ```text
//! run()      created ─► pending     (emit pending, schedule fire on next tick)
//! fire       pending ─► running     (emit running)
//! complete   running ─► passed|failed
//!              emit passed|failed(error)
//!              emit completed(result) ─► done(result)
//!              clear transient error
//!              destroy() if destroy_once_done
//! complete   exited  ─► emit error(ExcessCompletion)   (unless disabled)
//! destroy    after done: status=destroyed, emit destroyed, drop listeners, release()
//! ```
//!
//! ## Rules
//! - The state lock is never held while listeners run.
//! - Exactly one completion transitions the unit; the check and the transition happen
//!   under the same lock acquisition.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::config::Config;
use super::emitter::Emitter;
use super::registry;
use super::status::{Status, UnitKind};
use super::lock;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind, UnitEvent};
use crate::tasks::TaskResult;

/// Mutable lifecycle state.
#[derive(Debug)]
pub(crate) struct CoreState {
    pub(crate) status: Status,
    /// First error observed; cleared once the completion has been emitted.
    pub(crate) error: Option<TaskError>,
    /// `None` until a completion is captured; empty again after a reset.
    pub(crate) result: Option<TaskResult>,
    /// Set once a group has taken the unit as a child.
    pub(crate) owned: bool,
}

impl CoreState {
    /// Result to hand to late `once_done`/`when_done` registrations, if the unit already completed.
    pub(crate) fn recorded(&self) -> Option<TaskResult> {
        match self.status {
            Status::Passed | Status::Failed => Some(self.result.clone().unwrap_or_default()),
            Status::Destroyed => self.result.clone(),
            _ => None,
        }
    }
}

/// State, listeners and configuration shared by tasks and groups.
pub(crate) struct Core {
    name: String,
    kind: UnitKind,
    config: Config,
    bus: Mutex<Option<Bus>>,
    pub(crate) state: Mutex<CoreState>,
    pub(crate) emitter: Emitter<EventKind, UnitEvent>,
}

impl Core {
    pub(crate) fn new(name: String, kind: UnitKind, mut config: Config) -> Self {
        let bus = config.bus.take();
        Self {
            name,
            kind,
            config,
            bus: Mutex::new(bus),
            state: Mutex::new(CoreState {
                status: Status::Created,
                error: None,
                result: None,
                owned: false,
            }),
            emitter: Emitter::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn kind(&self) -> UnitKind {
        self.kind
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn status(&self) -> Status {
        lock(&self.state).status
    }

    pub(crate) fn error(&self) -> Option<TaskError> {
        lock(&self.state).error.clone()
    }

    pub(crate) fn result(&self) -> Option<TaskResult> {
        lock(&self.state).result.clone()
    }

    pub(crate) fn bus(&self) -> Option<Bus> {
        lock(&self.bus).clone()
    }

    /// Sets `bus` unless the unit already publishes somewhere.
    pub(crate) fn attach_bus(&self, bus: Bus) {
        let mut slot = lock(&self.bus);
        if slot.is_none() {
            *slot = Some(bus);
        }
    }

    /// Emits `ev`, deriving `done` from `completed` and `error`.
    pub(crate) fn emit(&self, ev: UnitEvent) {
        let delivered = self.dispatch(&ev);
        match ev {
            UnitEvent::Completed(result) => {
                self.dispatch(&UnitEvent::Done(result));
            }
            UnitEvent::Error(error) => {
                let done = self.dispatch(&UnitEvent::Done(TaskResult::failed(error.clone())));
                if !delivered && !done {
                    warn!(
                        unit = %self.name,
                        kind = %self.kind,
                        label = error.as_label(),
                        error = %error,
                        "error event without listeners"
                    );
                }
            }
            _ => {}
        }
    }

    fn dispatch(&self, ev: &UnitEvent) -> bool {
        if let Some(bus) = self.bus() {
            bus.publish(Event::from_unit(&self.name, self.kind, ev));
        }
        self.emitter.emit(&ev.kind(), ev)
    }

    /// `created ─► pending`. Emits an error and returns `false` from any other state.
    pub(crate) fn begin_run(&self) -> bool {
        let rejected = {
            let mut st = lock(&self.state);
            if st.status == Status::Created {
                st.status = Status::Pending;
                None
            } else {
                Some(st.status)
            }
        };
        match rejected {
            None => {
                debug!(unit = %self.name, kind = %self.kind, "pending");
                self.emit(UnitEvent::Pending);
                true
            }
            Some(status) => {
                self.emit(UnitEvent::Error(TaskError::InvalidRunStatus {
                    name: self.name.clone(),
                    status,
                }));
                false
            }
        }
    }

    /// Takes the unit as a child of `group`.
    ///
    /// Checked and recorded under one lock acquisition, so a unit can only ever be
    /// claimed once, and only while it is `created`.
    pub(crate) fn claim(&self, group: &str) -> Result<(), TaskError> {
        let mut st = lock(&self.state);
        if st.status != Status::Created {
            return Err(TaskError::NotCreated {
                name: group.to_string(),
                item: self.name.clone(),
                status: st.status,
            });
        }
        if st.owned {
            return Err(TaskError::AlreadyOwned {
                name: group.to_string(),
                item: self.name.clone(),
            });
        }
        st.owned = true;
        Ok(())
    }

    /// `pending ─► running`. Returns `false` if the unit left `pending` in the meantime.
    pub(crate) fn begin_execution(&self) -> bool {
        {
            let mut st = lock(&self.state);
            if st.status != Status::Pending {
                return false;
            }
            st.status = Status::Running;
        }
        debug!(unit = %self.name, kind = %self.kind, "running");
        self.emit(UnitEvent::Running);
        true
    }

    /// Returns a completed unit to `created` with an empty result and no error.
    pub(crate) fn reset(&self) {
        let mut st = lock(&self.state);
        st.status = Status::Created;
        st.error = None;
        st.result = Some(TaskResult::default());
    }
}

/// Hooks a unit provides on top of its [`Core`].
pub(crate) trait Lifecycle: Send + Sync + 'static {
    fn core(&self) -> &Core;

    /// Releases what the unit owns beyond the core (isolation scope, children).
    fn release(&self);
}

/// Records `result` (first completion only) and finishes the unit.
pub(crate) fn complete<L: Lifecycle>(unit: &Arc<L>, result: TaskResult) {
    settle(unit, Some(result));
}

fn settle<L: Lifecycle>(unit: &Arc<L>, result: Option<TaskResult>) {
    let core = unit.core();
    let exit = {
        let mut st = lock(&core.state);
        if st.status.is_exited() {
            None
        } else {
            if let Some(result) = result {
                if st.error.is_none() {
                    st.error = result.error.clone();
                }
                st.result = Some(result);
            }
            st.status = if st.error.is_some() {
                Status::Failed
            } else {
                Status::Passed
            };
            Some((st.status, st.error.clone(), st.result.clone().unwrap_or_default()))
        }
    };

    let Some((status, error, result)) = exit else {
        if core.config().error_on_excess_completions {
            core.emit(UnitEvent::Error(TaskError::ExcessCompletion {
                name: core.name().to_string(),
            }));
        } else {
            debug!(unit = %core.name(), kind = %core.kind(), "excess completion ignored");
        }
        return;
    };

    debug!(unit = %core.name(), kind = %core.kind(), %status, "exited");
    match error {
        Some(e) => core.emit(UnitEvent::Failed(e)),
        None => core.emit(UnitEvent::Passed),
    }
    core.emit(UnitEvent::Completed(result));
    lock(&core.state).error = None;

    if core.config().destroy_once_done {
        destroy(unit);
    }
}

/// Destroys the unit once its completion is known. Idempotent.
pub(crate) fn destroy<L: Lifecycle>(unit: &Arc<L>) {
    let me = Arc::clone(unit);
    registry::once_done(unit.core(), move |_| teardown(&me));
}

fn teardown<L: Lifecycle>(unit: &Arc<L>) {
    let core = unit.core();
    {
        let mut st = lock(&core.state);
        if st.status == Status::Destroyed {
            return;
        }
        st.status = Status::Destroyed;
    }
    debug!(unit = %core.name(), kind = %core.kind(), "destroyed");
    core.emit(UnitEvent::Destroyed);
    core.emitter.remove_all();
    unit.release();
}
