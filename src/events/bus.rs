//! # Event bus for broadcasting unit events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. When a bus is set in a
//! unit's [`Config`](crate::Config), every event the unit emits is also published
//! here, so observers can follow a whole task tree without registering listeners
//! on each unit.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Subscribers:
//!   Task 1  ──┐
//!   Task 2  ──┼──────► Bus ───────► SubscriberSet listener ────► Subscribe::on_event
//!   Group   ──┘  (broadcast chan)   (or any bus.subscribe())
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Default ring buffer size.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Broadcast channel for unit events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately (send clones internally).
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active subscribers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_publish_reaches_receivers_in_order() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::Pending));
        bus.publish(Event::new(EventKind::Running));

        let a = rx.recv().await.map(|e| e.kind).ok();
        let b = rx.recv().await.map(|e| e.kind).ok();
        assert_eq!(a, Some(EventKind::Pending));
        assert_eq!(b, Some(EventKind::Running));
        assert_eq!(bus.receiver_count(), 1);
    }

    #[test]
    fn test_publish_without_receivers_is_noop() {
        let bus = Bus::default();
        bus.publish(Event::new(EventKind::Passed));
        assert_eq!(bus.receiver_count(), 0);
    }
}
