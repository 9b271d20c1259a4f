//! # Listener registry keyed by event name.
//!
//! [`Emitter`] is the publish/subscribe primitive behind units and the named-event
//! lock. Listeners are called synchronously, in registration order, by `emit`.
//!
//! ## Rules
//! - The internal lock is **never** held while a listener runs, so listeners may
//!   register, remove or emit again.
//! - `once` listeners are removed before they are invoked.
//! - A listener registered during an `emit` is not invoked by that same `emit`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use super::lock;
use crate::events::{EventKind, UnitEvent};

static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identifies a registered listener so it can be removed with [`Emit::off`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        ListenerId(LISTENER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

type Listener<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Entry<P> {
    id: ListenerId,
    once: bool,
    f: Listener<P>,
}

/// Synchronous listener registry.
pub(crate) struct Emitter<K, P> {
    listeners: Mutex<HashMap<K, Vec<Entry<P>>>>,
}

impl<K, P> Emitter<K, P>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn on<F>(&self, key: K, f: F) -> ListenerId
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.insert(key, false, Arc::new(f))
    }

    pub(crate) fn once<F>(&self, key: K, f: F) -> ListenerId
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.insert(key, true, Arc::new(f))
    }

    /// Registers a one-shot `FnOnce` listener.
    pub(crate) fn once_fn<F>(&self, key: K, f: F) -> ListenerId
    where
        F: FnOnce(&P) + Send + 'static,
    {
        let slot = Mutex::new(Some(f));
        self.once(key, move |p| {
            if let Some(f) = lock(&slot).take() {
                f(p);
            }
        })
    }

    fn insert(&self, key: K, once: bool, f: Listener<P>) -> ListenerId {
        let id = ListenerId::next();
        lock(&self.listeners)
            .entry(key)
            .or_default()
            .push(Entry { id, once, f });
        id
    }

    pub(crate) fn off(&self, id: ListenerId) -> bool {
        let mut map = lock(&self.listeners);
        for entries in map.values_mut() {
            if let Some(pos) = entries.iter().position(|e| e.id == id) {
                entries.remove(pos);
                return true;
            }
        }
        false
    }

    pub(crate) fn remove_all(&self) {
        lock(&self.listeners).clear();
    }

    pub(crate) fn listener_count(&self, key: &K) -> usize {
        lock(&self.listeners).get(key).map_or(0, Vec::len)
    }

    /// Invokes the listeners registered for `key`. Returns `false` if there were none.
    pub(crate) fn emit(&self, key: &K, payload: &P) -> bool {
        let snapshot: Vec<Listener<P>> = {
            let mut map = lock(&self.listeners);
            let Some(entries) = map.get_mut(key) else {
                return false;
            };
            let snapshot = entries.iter().map(|e| Arc::clone(&e.f)).collect();
            entries.retain(|e| !e.once);
            snapshot
        };
        if snapshot.is_empty() {
            return false;
        }
        for f in snapshot {
            f(payload);
        }
        true
    }
}

/// Subscribe/unsubscribe/publish capability shared by [`Task`](crate::Task) and [`Group`](crate::Group).
pub trait Emit {
    /// Attaches `f` for every future `kind` event.
    fn on<F>(&self, kind: EventKind, f: F) -> ListenerId
    where
        F: Fn(&UnitEvent) + Send + Sync + 'static;

    /// Attaches `f` for the next `kind` event only.
    fn once<F>(&self, kind: EventKind, f: F) -> ListenerId
    where
        F: Fn(&UnitEvent) + Send + Sync + 'static;

    /// Detaches a listener. Returns `false` if it was not attached.
    fn off(&self, id: ListenerId) -> bool;

    /// Detaches every listener.
    fn remove_all_listeners(&self);

    /// Number of listeners attached for `kind`.
    fn listener_count(&self, kind: EventKind) -> usize;

    /// Publishes `event` to the unit's listeners (and bus, if any).
    ///
    /// This does not change the unit's state.
    fn emit(&self, event: UnitEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let emitter: Emitter<&'static str, u32> = Emitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let seen = Arc::clone(&seen);
            emitter.on("ev", move |p: &u32| lock(&seen).push(format!("{tag}{p}")));
        }
        assert!(emitter.emit(&"ev", &1));
        assert_eq!(*lock(&seen), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn test_once_fires_a_single_time() {
        let emitter: Emitter<&'static str, ()> = Emitter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        emitter.once("ev", move |_| {
            h.fetch_add(1, AtomicOrdering::SeqCst);
        });
        emitter.emit(&"ev", &());
        emitter.emit(&"ev", &());
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(emitter.listener_count(&"ev"), 0);
    }

    #[test]
    fn test_off_and_remove_all() {
        let emitter: Emitter<&'static str, ()> = Emitter::new();
        let id = emitter.on("a", |_| {});
        emitter.on("b", |_| {});
        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        assert!(!emitter.emit(&"a", &()));
        emitter.remove_all();
        assert_eq!(emitter.listener_count(&"b"), 0);
    }

    #[test]
    fn test_listener_may_reenter_emitter() {
        let emitter: Arc<Emitter<&'static str, ()>> = Arc::new(Emitter::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let (e, h) = (Arc::clone(&emitter), Arc::clone(&hits));
        emitter.once("outer", move |_| {
            let h = Arc::clone(&h);
            e.on("inner", move |_| {
                h.fetch_add(1, AtomicOrdering::SeqCst);
            });
            e.emit(&"inner", &());
        });
        emitter.emit(&"outer", &());
        assert_eq!(hits.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_once_fn_accepts_fn_once() {
        let emitter: Emitter<&'static str, u8> = Emitter::new();
        let owned = String::from("moved");
        let out = Arc::new(Mutex::new(None));
        let o = Arc::clone(&out);
        emitter.once_fn("ev", move |p: &u8| {
            *lock(&o) = Some(format!("{owned}{p}"));
        });
        emitter.emit(&"ev", &7);
        assert_eq!(lock(&out).as_deref(), Some("moved7"));
    }
}
