use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

/// Exclusive lease over one key, released on drop.
pub struct Lease {
    _guard: OwnedMutexGuard<()>,
}

/// Per-key mutual-exclusion leases.
///
/// Used for two different policies:
/// - `try_acquire` rejects a second concurrent holder, which is how a
///   second in-flight purchase by the same buyer fails fast before any
///   ledger call.
/// - `acquire` waits for the current holder, which is how treasury funding
///   calls are serialized to avoid nonce collisions at the ledger layer.
///
/// Slots with no outstanding lease are pruned on the next acquire, so the
/// map does not grow with the history of keys.
pub struct LeaseMap<K> {
    slots: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone> LeaseMap<K> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &K) -> Arc<tokio::sync::Mutex<()>> {
        let mut slots = self.slots.lock().expect("lock poisoned");
        // A slot referenced only by the map has no lease outstanding.
        slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Take the lease if it is free, `None` if another holder has it.
    pub fn try_acquire(&self, key: &K) -> Option<Lease> {
        self.slot(key)
            .try_lock_owned()
            .ok()
            .map(|guard| Lease { _guard: guard })
    }

    /// Wait for the lease.
    pub async fn acquire(&self, key: &K) -> Lease {
        let guard = self.slot(key).lock_owned().await;
        Lease { _guard: guard }
    }

    /// Number of live slots, for tests.
    pub fn len(&self) -> usize {
        self.slots.lock().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash + Clone> Default for LeaseMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn second_try_acquire_is_rejected() {
        let leases = LeaseMap::new();
        let held = leases.try_acquire(&"key").unwrap();
        assert!(leases.try_acquire(&"key").is_none());
        drop(held);
        assert!(leases.try_acquire(&"key").is_some());
    }

    #[tokio::test]
    async fn different_keys_are_independent() {
        let leases = LeaseMap::new();
        let _a = leases.try_acquire(&"a").unwrap();
        assert!(leases.try_acquire(&"b").is_some());
    }

    #[tokio::test]
    async fn acquire_waits_for_release() {
        let leases = Arc::new(LeaseMap::new());
        let held = leases.acquire(&"treasury").await;

        let waiter = {
            let leases = Arc::clone(&leases);
            tokio::spawn(async move {
                let _lease = leases.acquire(&"treasury").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(held);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should acquire after release")
            .unwrap();
    }

    #[tokio::test]
    async fn released_slots_are_pruned() {
        let leases = LeaseMap::new();
        for key in ["a", "b", "c"] {
            let lease = leases.try_acquire(&key).unwrap();
            drop(lease);
        }
        // The next acquire sweeps the dead slots.
        let _lease = leases.try_acquire(&"d").unwrap();
        assert_eq!(leases.len(), 1);
    }
}
