//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and the
//! built-in [`LogWriter`]. Subscribers observe units asynchronously through the
//! [`Bus`](crate::events::Bus); direct listeners ([`Emit`](crate::Emit)) remain the
//! synchronous path.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Task / Group ── publish(Event) ──► Bus ──► SubscriberSet::listen
//!                                                  │
//!                                                  ├──► [queue S1] ─► worker ─► on_event()
//!                                                  ├──► [queue S2] ─► worker ─► on_event()
//!                                                  └──► [queue SN] ─► worker ─► on_event()
//!                                                          │
//!                                                   LogWriter  Metrics  Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use taskflow::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::Failed {
//!             // increment failure counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
