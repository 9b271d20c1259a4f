//! Unit events: vocabulary, payloads and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`UnitEvent`] the vocabulary and typed payloads seen by direct listeners
//! - [`Event`] flattened record with sequence/timestamp for bus observers
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`

mod bus;
mod event;

pub use bus::{Bus, DEFAULT_BUS_CAPACITY};
pub use event::{Event, EventKind, UnitEvent};
