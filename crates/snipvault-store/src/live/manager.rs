use crate::repo::OrderBy;
use snipvault_core::Snippet;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Observer callback; receives the full ordered snapshot
pub type SnapshotCallback = Box<dyn Fn(&[Snippet]) + Send + Sync>;

struct Subscriber {
    order: OrderBy,
    callback: Arc<SnapshotCallback>,
}

/// Registry of live-query observers
///
/// The manager only fans snapshots out; producing them and sequencing
/// deliveries is the store's job. Snapshots arrive in the display
/// ordering; a subscriber's query descriptor may ask for a different key,
/// in which case its copy is re-sorted before delivery.
#[derive(Default)]
pub struct SubscriptionManager {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
}

impl SubscriptionManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register an observer; the handle deregisters it on drop
    pub fn subscribe(
        self: &Arc<Self>,
        order: OrderBy,
        callback: SnapshotCallback,
    ) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock_registry(&self.subscribers).insert(
            id,
            Subscriber {
                order,
                callback: Arc::new(callback),
            },
        );
        SubscriptionHandle {
            manager: Arc::downgrade(self),
            id,
        }
    }

    /// Deliver a snapshot (in `UpdatedAt` order) to every subscriber
    ///
    /// Callbacks run outside the registry lock, so a callback may itself
    /// subscribe or unsubscribe.
    pub fn notify(&self, snapshot: &[Snippet]) {
        let targets: Vec<(OrderBy, Arc<SnapshotCallback>)> = lock_registry(&self.subscribers)
            .values()
            .map(|s| (s.order, s.callback.clone()))
            .collect();
        for (order, callback) in targets {
            deliver(order, &callback, snapshot);
        }
    }

    /// Deliver a snapshot to a single subscriber (the initial delivery)
    pub fn notify_one(&self, handle: &SubscriptionHandle, snapshot: &[Snippet]) {
        let target = lock_registry(&self.subscribers)
            .get(&handle.id)
            .map(|s| (s.order, s.callback.clone()));
        if let Some((order, callback)) = target {
            deliver(order, &callback, snapshot);
        }
    }

    /// Number of registered observers
    pub fn subscriber_count(&self) -> usize {
        lock_registry(&self.subscribers).len()
    }

    fn remove(&self, id: u64) {
        lock_registry(&self.subscribers).remove(&id);
    }
}

/// RAII handle for a live-query subscription
///
/// Unsubscribing is the only cancellation primitive in the store; dropping
/// the handle has the same effect as calling [`SubscriptionHandle::unsubscribe`].
pub struct SubscriptionHandle {
    manager: Weak<SubscriptionManager>,
    id: u64,
}

impl SubscriptionHandle {
    /// Deregister this observer
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.remove(self.id);
        }
    }
}

fn deliver(order: OrderBy, callback: &SnapshotCallback, snapshot: &[Snippet]) {
    if order == OrderBy::UpdatedAt {
        callback(snapshot);
    } else {
        let mut reordered = snapshot.to_vec();
        order.sort(&mut reordered);
        callback(&reordered);
    }
}

fn lock_registry<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(id: &str) -> Snippet {
        Snippet::new(
            id.to_string(),
            "Title".to_string(),
            "rust".to_string(),
            "code".to_string(),
        )
    }

    #[test]
    fn test_notify_reaches_all_subscribers() {
        let manager = SubscriptionManager::new();
        let seen_a = Arc::new(Mutex::new(0usize));
        let seen_b = Arc::new(Mutex::new(0usize));

        let a = seen_a.clone();
        let _ha = manager.subscribe(
            OrderBy::UpdatedAt,
            Box::new(move |snap| {
                *a.lock().unwrap() = snap.len();
            }),
        );
        let b = seen_b.clone();
        let _hb = manager.subscribe(
            OrderBy::UpdatedAt,
            Box::new(move |snap| {
                *b.lock().unwrap() = snap.len();
            }),
        );

        manager.notify(&[snippet("1"), snippet("2")]);
        assert_eq!(*seen_a.lock().unwrap(), 2);
        assert_eq!(*seen_b.lock().unwrap(), 2);
    }

    #[test]
    fn test_dropped_handle_stops_deliveries() {
        let manager = SubscriptionManager::new();
        let calls = Arc::new(Mutex::new(0usize));

        let c = calls.clone();
        let handle = manager.subscribe(
            OrderBy::UpdatedAt,
            Box::new(move |_| {
                *c.lock().unwrap() += 1;
            }),
        );
        manager.notify(&[]);
        assert_eq!(*calls.lock().unwrap(), 1);

        handle.unsubscribe();
        assert_eq!(manager.subscriber_count(), 0);
        manager.notify(&[]);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_notify_one_targets_only_that_handle() {
        let manager = SubscriptionManager::new();
        let seen_a = Arc::new(Mutex::new(0usize));
        let seen_b = Arc::new(Mutex::new(0usize));

        let a = seen_a.clone();
        let ha = manager.subscribe(
            OrderBy::UpdatedAt,
            Box::new(move |_| {
                *a.lock().unwrap() += 1;
            }),
        );
        let b = seen_b.clone();
        let _hb = manager.subscribe(
            OrderBy::UpdatedAt,
            Box::new(move |_| {
                *b.lock().unwrap() += 1;
            }),
        );

        manager.notify_one(&ha, &[]);
        assert_eq!(*seen_a.lock().unwrap(), 1);
        assert_eq!(*seen_b.lock().unwrap(), 0);
    }

    #[test]
    fn test_created_at_descriptor_reorders_deliveries() {
        let manager = SubscriptionManager::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let _h = manager.subscribe(
            OrderBy::CreatedAt,
            Box::new(move |snap| {
                *sink.lock().unwrap() = snap.iter().map(|s| s.id.clone()).collect();
            }),
        );

        // "old" was created first but updated last
        let mut old = snippet("old");
        old.created_at -= chrono::Duration::seconds(60);
        let new = snippet("new");

        // Snapshot arrives in UpdatedAt order: old (just updated) first
        manager.notify(&[old, new]);
        assert_eq!(*seen.lock().unwrap(), vec!["new".to_string(), "old".to_string()]);
    }
}
