//! # Named-event lock.
//!
//! [`EventLock`] is a mutual-exclusion primitive keyed by event name. It serializes
//! paired phases ("start" acquires, "finish" releases) and lets other components wait
//! for one or many named transitions.
//!
//! Every transition is announced as `<name>:<phase>` (see [`Phase`]):
//!
//! ```text
//! lock(n)    unlocked ─► locked      emit n:locked,   next()
//!            locked   ─► queue next  (FIFO per name)
//! unlock(n)  locked   ─► unlocked    emit n:unlocked, hand over to first waiter, next()
//! start(n)   lock(n) ─► finished=false, emit n:started,  next()
//! finish(n)  finished=true ─► unlock(n) ─► emit n:finished, next()
//! block(ns)  lock every name; next(Ok) once all are held
//! unblock(ns) unlock every name; next(Ok) once all are released
//! ```
//!
//! Handlers registered with [`EventLock::handle`] complete through a
//! [`TaskContext`](crate::TaskContext). `emit_parallel` runs them all at once and
//! `emit_serial` one after another, both as children of a [`Group`](crate::Group);
//! `next` gets the first error.

mod event_lock;
mod names;

pub use event_lock::{EventLock, Phase};
pub use names::EventNames;
