//! Per-key asynchronous mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A map of per-key async mutexes.
///
/// Guards the read-modify-write cycles on per-member JSON state (lockout,
/// menu tracker) so two concurrent requests for the same member cannot
/// interleave and lose an update. Entries are created on first use and kept
/// for the process lifetime; the key space is bounded by the member table.
#[derive(Debug, Default)]
pub struct KeyedMutex {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl KeyedMutex {
    /// Creates an empty lock map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, waiting if another task holds it.
    pub async fn lock(&self, key: i64) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = Arc::new(KeyedMutex::new());
        let counter = Arc::new(AtomicI64::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock(7).await;
                let seen = counter.load(Ordering::SeqCst);
                tokio::task::yield_now().await;
                counter.store(seen + 1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        // Without the lock the read-yield-write cycles would collide.
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyedMutex::new();
        let _first = locks.lock(1).await;
        // A second key must be immediately acquirable while the first is held.
        let _second = locks.lock(2).await;
    }
}
