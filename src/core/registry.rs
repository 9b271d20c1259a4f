//! # Deferred completion registry.
//!
//! Lets callers subscribe to a unit's completion whether or not it already happened:
//! - still running: the listener is attached to `done`
//! - already completed (or destroyed after completing): the listener is invoked on the
//!   next tick with the stored result, never inside the caller's stack
//!
//! The completion check and the attachment happen under the state lock, so a
//! completion racing with the registration is never missed.

use std::future::Future;

use tokio::sync::oneshot;

use super::lock;
use super::status::Status;
use super::tick;
use super::unit::Core;
use crate::error::TaskError;
use crate::events::{EventKind, UnitEvent};
use crate::tasks::TaskResult;

fn done_payload(ev: &UnitEvent) -> TaskResult {
    ev.result().cloned().unwrap_or_else(|| match ev.error() {
        Some(e) => TaskResult::failed(e.clone()),
        None => TaskResult::default(),
    })
}

/// Invokes `f` once with the unit's result.
pub(crate) fn once_done<F>(core: &Core, f: F)
where
    F: FnOnce(TaskResult) + Send + 'static,
{
    let recorded = {
        let st = lock(&core.state);
        match st.recorded() {
            Some(result) => Some(result),
            None => {
                core.emitter
                    .once_fn(EventKind::Done, move |ev| f(done_payload(ev)));
                return;
            }
        }
    };
    if let Some(result) = recorded {
        if let Err(e) = tick::defer(move || f(result)) {
            core.emit(UnitEvent::Error(e));
        }
    }
}

/// Invokes `f` with the unit's result on every future `done`, and once more on the
/// next tick if the unit already completed.
pub(crate) fn when_done<F>(core: &Core, f: F)
where
    F: Fn(TaskResult) + Send + Sync + Clone + 'static,
{
    let recorded = {
        let st = lock(&core.state);
        let listener = f.clone();
        core.emitter
            .on(EventKind::Done, move |ev| listener(done_payload(ev)));
        st.recorded()
    };
    if let Some(result) = recorded {
        if let Err(e) = tick::defer(move || f(result)) {
            core.emit(UnitEvent::Error(e));
        }
    }
}

/// Future resolving with the unit's result.
///
/// Resolves with [`TaskError::Destroyed`] if the unit is torn down without ever
/// delivering a result.
pub(crate) fn outcome(core: &Core) -> impl Future<Output = TaskResult> + Send + 'static {
    let (tx, rx) = oneshot::channel();
    let name = core.name().to_string();
    let torn_down = {
        let st = lock(&core.state);
        st.status == Status::Destroyed && st.result.is_none()
    };
    if !torn_down {
        once_done(core, move |result| {
            let _ = tx.send(result);
        });
    }
    async move {
        rx.await
            .unwrap_or_else(|_| TaskResult::failed(TaskError::Destroyed { name }))
    }
}
