//! Change Notification Bus
//!
//! Typed publish/subscribe keyed by collection. Every repository write
//! publishes one `ChangeEvent`; listeners re-read the collection they
//! care about. A `Subscription` unsubscribes when dropped.

use std::sync::{Arc, Mutex, Weak};

use crate::domain::CollectionKey;

/// "This collection was rewritten"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: CollectionKey,
}

type Listener = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

struct Entry {
    id: u64,
    /// `None` listens to every collection
    filter: Option<CollectionKey>,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Cloneable handle; clones share the same listeners
#[derive(Clone, Default)]
pub struct ChangeBus {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to one collection
    pub fn subscribe(&self, key: CollectionKey, listener: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Subscription {
        self.register(Some(key), Arc::new(listener))
    }

    /// Listen to every collection
    pub fn subscribe_all(&self, listener: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Subscription {
        self.register(None, Arc::new(listener))
    }

    fn register(&self, filter: Option<CollectionKey>, listener: Listener) -> Subscription {
        let mut registry = match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push(Entry { id, filter, listener });
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver an event to matching listeners. Listeners run outside the
    /// registry lock, so they may subscribe or drop subscriptions.
    pub fn publish(&self, event: ChangeEvent) {
        let listeners: Vec<Listener> = match self.registry.lock() {
            Ok(registry) => registry
                .entries
                .iter()
                .filter(|e| e.filter.map_or(true, |k| k == event.key))
                .map(|e| Arc::clone(&e.listener))
                .collect(),
            Err(_) => return,
        };
        log::debug!("Change on '{}' -> {} listener(s)", event.key, listeners.len());
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn notify(&self, key: CollectionKey) {
        self.publish(ChangeEvent { key });
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().map(|r| r.entries.len()).unwrap_or(0)
    }
}

/// Keeps a listener registered; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut registry) = registry.lock() {
                registry.entries.retain(|e| e.id != self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_keyed_delivery() {
        let bus = ChangeBus::new();
        let tickets = Arc::new(AtomicUsize::new(0));
        let everything = Arc::new(AtomicUsize::new(0));

        let t = Arc::clone(&tickets);
        let _a = bus.subscribe(CollectionKey::Tickets, move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        });
        let e = Arc::clone(&everything);
        let _b = bus.subscribe_all(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

        bus.notify(CollectionKey::Tickets);
        bus.notify(CollectionKey::Providers);

        assert_eq!(tickets.load(Ordering::SeqCst), 1);
        assert_eq!(everything.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let h = Arc::clone(&hits);
            let _sub = bus.subscribe(CollectionKey::Tasks, move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            });
            assert_eq!(bus.listener_count(), 1);
        }
        assert_eq!(bus.listener_count(), 0);
        bus.notify(CollectionKey::Tasks);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_may_subscribe_during_publish() {
        let bus = ChangeBus::new();
        let inner_bus = bus.clone();
        let _sub = bus.subscribe(CollectionKey::Tasks, move |_| {
            let _nested = inner_bus.subscribe(CollectionKey::Tasks, |_| {});
        });
        bus.notify(CollectionKey::Tasks);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_exact_payload() {
        let bus = ChangeBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _sub = bus.subscribe_all(move |event| s.lock().unwrap().push(*event));
        bus.notify(CollectionKey::RejectedNotes);
        assert_eq!(*seen.lock().unwrap(), vec![ChangeEvent { key: CollectionKey::RejectedNotes }]);
    }
}
