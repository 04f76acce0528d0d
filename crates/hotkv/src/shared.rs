//! Thread-safe handle over a single cache instance
//!
//! The caches carry no synchronization of their own. `SharedCache` puts one
//! lock around one cache and counts hits, misses, inserts and evictions.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::lfu::LfuCache;
use crate::lru::LruCache;
use crate::stats::{CacheStats, PushOutcome};
use crate::traits::Cache;

/// Shared LRU cache
pub type SharedLru<K, V> = SharedCache<K, V, LruCache<K, V>>;

/// Shared LFU cache
pub type SharedLfu<K, V> = SharedCache<K, V, LfuCache<K, V>>;

/// Cloneable, lock-guarded cache with statistics
pub struct SharedCache<K, V, C> {
    /// Guarded cache; `get` takes the write lock because hits reorder
    cache: Arc<RwLock<C>>,

    /// Cache statistics
    stats: Arc<CacheStats>,

    /// Cache capacity
    capacity: usize,

    marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, C> Clone for SharedCache<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            stats: Arc::clone(&self.stats),
            capacity: self.capacity,
            marker: PhantomData,
        }
    }
}

impl<K, V, C> SharedCache<K, V, C>
where
    C: Cache<K, V>,
{
    /// Wrap a cache
    pub fn new(cache: C) -> Self {
        let capacity = cache.capacity();
        Self {
            cache: Arc::new(RwLock::new(cache)),
            stats: Arc::new(CacheStats::new()),
            capacity,
            marker: PhantomData,
        }
    }

    /// Look up a key, returning a clone of its value
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let mut cache = self.cache.write();
        let value = cache.get(key).cloned();
        self.stats.record_lookup(value.is_some());
        value
    }

    /// Insert or update a key
    pub fn put(&self, key: K, value: V) {
        self.push(key, value);
    }

    /// Insert or update a key, returning the evicted entry
    pub fn push(&self, key: K, value: V) -> Option<(K, V)> {
        let mut cache = self.cache.write();
        let cached = cache.contains(&key);
        let before = cache.len();
        let evicted = cache.push(key, value);

        let outcome = if cached {
            PushOutcome::Updated
        } else if evicted.is_some() {
            PushOutcome::Evicted
        } else if cache.len() > before {
            PushOutcome::Inserted
        } else {
            PushOutcome::Rejected
        };
        self.stats.record_push(outcome);
        evicted
    }

    /// Check whether a key is cached without counting an access
    pub fn contains(&self, key: &K) -> bool {
        self.cache.read().contains(key)
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the cache and reset statistics
    pub fn clear(&self) {
        let mut cache = self.cache.write();
        debug!(len = cache.len(), "clearing shared cache");
        cache.clear();
        self.stats.reset();
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Run a closure with exclusive access to the cache
    pub fn with<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.cache.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsSnapshot;
    use std::thread;

    #[test]
    fn test_shared_hit_and_miss() {
        let cache: SharedLru<u64, Vec<u8>> = SharedCache::new(LruCache::new(10));

        cache.put(1, b"test data".to_vec());
        assert_eq!(cache.get(&1), Some(b"test data".to_vec()));
        assert_eq!(cache.get(&2), None);

        let stats = cache.stats().snapshot();
        assert_eq!((stats.hits, stats.misses), (1, 1));
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.hit_ratio(), 0.5);
    }

    #[test]
    fn test_shared_eviction_counted() {
        let cache = SharedCache::new(LruCache::new(2));

        cache.put(0, "data 0");
        cache.put(1, "data 1");
        assert_eq!(cache.push(2, "data 2"), Some((0, "data 0")));

        assert_eq!(cache.len(), 2);
        let stats = cache.stats().snapshot();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.inserts, 3);
        assert_eq!(stats.updates, 0);
    }

    #[test]
    fn test_shared_update_is_not_insert() {
        let cache = SharedCache::new(LfuCache::new(2));

        cache.put("k", 1);
        cache.put("k", 2);

        let stats = cache.stats().snapshot();
        assert_eq!((stats.inserts, stats.updates), (1, 1));
        assert_eq!(cache.get(&"k"), Some(2));
        assert_eq!(cache.with(|c| c.frequency(&"k")), Some(3));
    }

    #[test]
    fn test_shared_zero_capacity_lfu() {
        let cache = SharedCache::new(LfuCache::new(0));

        cache.put(1, 1);
        let stats = cache.stats().snapshot();
        assert_eq!((stats.inserts, stats.rejected), (0, 1));
        assert!(!cache.contains(&1));
    }

    #[test]
    fn test_shared_clear() {
        let cache = SharedCache::new(LruCache::new(10));

        cache.put(0, 0);
        cache.put(1, 1);
        cache.get(&0);
        cache.clear();

        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = SharedCache::new(LruCache::new(64));

        thread::scope(|scope| {
            for t in 0..4u64 {
                let cache = cache.clone();
                scope.spawn(move || {
                    for i in 0..500u64 {
                        let key = (t * 1_000 + i) % 200;
                        if i % 3 == 0 {
                            cache.get(&key);
                        } else {
                            cache.put(key, i);
                        }
                    }
                });
            }
        });

        assert!(cache.len() <= 64);
        cache.with(|c| c.check_invariants()).unwrap();
        let stats = cache.stats().snapshot();
        assert_eq!(stats.lookups(), 4 * 167);
        assert_eq!(stats.pushes(), 4 * 333);
        assert_eq!(stats.inserts - stats.evictions, cache.len() as u64);
    }
}
