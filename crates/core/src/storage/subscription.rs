//! Listener registry and subscription handles

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::debug;

pub(crate) type Listener = Arc<dyn Fn(&str) + Send + Sync>;

struct ListenerEntry {
    id: u64,
    key: String,
    active: Arc<AtomicBool>,
    callback: Listener,
}

/// Ordered registry of listeners, shared between a store and its subscriptions
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    entries: Vec<ListenerEntry>,
}

pub(crate) type SharedRegistry = Arc<Mutex<ListenerRegistry>>;

impl ListenerRegistry {
    fn register(&mut self, key: &str, callback: Listener) -> (u64, Arc<AtomicBool>) {
        let id = self.next_id;
        self.next_id += 1;
        let active = Arc::new(AtomicBool::new(true));
        self.entries.push(ListenerEntry {
            id,
            key: key.to_string(),
            active: Arc::clone(&active),
            callback,
        });
        (id, active)
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|entry| entry.id != id);
    }

    /// Listeners for `key` in registration order
    pub(crate) fn snapshot(&self, key: &str) -> Vec<(Arc<AtomicBool>, Listener)> {
        self.entries
            .iter()
            .filter(|entry| entry.key == key)
            .map(|entry| (Arc::clone(&entry.active), Arc::clone(&entry.callback)))
            .collect()
    }

    pub(crate) fn count(&self, key: &str) -> usize {
        self.entries.iter().filter(|entry| entry.key == key).count()
    }
}

pub(crate) fn subscribe(registry: &SharedRegistry, key: &str, callback: Listener) -> Subscription {
    let (id, active) = registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .register(key, callback);
    debug!("Listener {} subscribed to '{}'", id, key);

    Subscription {
        id,
        key: key.to_string(),
        active,
        registry: Arc::downgrade(registry),
    }
}

/// Invoke every active listener for `key`.
///
/// Iterates over a snapshot taken before the first call, so listeners may
/// subscribe, cancel or write to the store from inside their callback. A
/// listener cancelled mid-dispatch is skipped.
pub(crate) fn dispatch(registry: &SharedRegistry, key: &str) {
    let listeners = registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .snapshot(key);

    for (active, callback) in listeners {
        if active.load(Ordering::SeqCst) {
            callback(key);
        }
    }
}

/// A registration for change notifications on one key.
///
/// Dropping the handle cancels it.
#[must_use = "dropping a Subscription cancels it"]
pub struct Subscription {
    id: u64,
    key: String,
    active: Arc<AtomicBool>,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    /// Stop receiving notifications. Safe to call more than once.
    pub fn cancel(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(self.id);
        }
        debug!("Listener {} unsubscribed from '{}'", self.id, self.key);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// The key this subscription listens on
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_listener(counter: &Arc<AtomicUsize>) -> Listener {
        let counter = Arc::clone(counter);
        Arc::new(move |_key: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_only_matching_key() {
        let registry = SharedRegistry::default();
        let tasks = Arc::new(AtomicUsize::new(0));
        let other = Arc::new(AtomicUsize::new(0));
        let _a = subscribe(&registry, "tasks", counting_listener(&tasks));
        let _b = subscribe(&registry, "settings", counting_listener(&other));

        dispatch(&registry, "tasks");

        assert_eq!(tasks.load(Ordering::SeqCst), 1);
        assert_eq!(other.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let registry = SharedRegistry::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let subscription = subscribe(&registry, "tasks", counting_listener(&counter));

        subscription.cancel();
        subscription.cancel();
        dispatch(&registry, "tasks");

        assert!(!subscription.is_active());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(registry.lock().unwrap().count("tasks"), 0);
    }

    #[test]
    fn test_drop_cancels() {
        let registry = SharedRegistry::default();
        let counter = Arc::new(AtomicUsize::new(0));
        drop(subscribe(&registry, "tasks", counting_listener(&counter)));

        dispatch(&registry, "tasks");
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_after_registry_dropped() {
        let registry = SharedRegistry::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let subscription = subscribe(&registry, "tasks", counting_listener(&counter));
        drop(registry);

        subscription.cancel();
        assert!(!subscription.is_active());
    }
}
