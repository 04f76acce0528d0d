//! LRU (Least Recently Used) cache implementation
//!
//! Uses an arena-backed order list for O(1) eviction.

use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;
use tracing::trace;

use crate::error::{Error, Result};
use crate::list::{Arena, NodeId, OrderList, PREALLOCATE_LIMIT};
use crate::traits::Cache;

/// Node payload in the LRU order list
struct Entry<K, V> {
    key: K,
    value: V,
}

/// LRU cache with fixed capacity
pub struct LruCache<K, V> {
    map: HashMap<K, NodeId, RandomState>,
    arena: Arena<Entry<K, V>>,
    order: OrderList,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// # Panics
    /// Panics if `capacity` is 0. Use [`LruCache::try_new`] for a fallible
    /// constructor.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self::build(capacity)
    }

    /// Create a new LRU cache, rejecting a zero capacity
    pub fn try_new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        Ok(Self::build(capacity))
    }

    fn build(capacity: usize) -> Self {
        // two extra slots for the sentinels
        let mut arena = Arena::with_capacity(capacity.saturating_add(2));
        let order = arena.new_list();
        Self {
            map: HashMap::with_capacity_and_hasher(
                capacity.min(PREALLOCATE_LIMIT),
                RandomState::new(),
            ),
            arena,
            order,
            capacity,
        }
    }

    /// Get a value from the cache, marking it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.map.get(key)?;
        self.touch(id);
        self.arena.get(id).map(|entry| &entry.value)
    }

    /// Get a value without changing its recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.map.get(key)?;
        self.arena.get(id).map(|entry| &entry.value)
    }

    /// Insert a key-value pair into the cache
    pub fn put(&mut self, key: K, value: V) {
        self.push(key, value);
    }

    /// Insert a key-value pair, returning the entry evicted to make room
    pub fn push(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&id) = self.map.get(&key) {
            // Update existing
            if let Some(entry) = self.arena.get_mut(id) {
                entry.value = value;
            }
            self.touch(id);
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.evict()
        } else {
            None
        };

        let id = self.arena.alloc(Entry {
            key: key.clone(),
            value,
        });
        self.order.push_front(&mut self.arena, id);
        self.map.insert(key, id);

        evicted
    }

    /// Check whether a key is cached
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.map.clear();
        self.arena.clear();
        self.order = self.arena.new_list();
    }

    /// Iterate from most to least recently used
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.order
            .iter(&self.arena)
            .map(|(_, entry)| (&entry.key, &entry.value))
    }

    /// Verify that the index, the arena and the order list agree
    pub fn check_invariants(&self) -> Result<()> {
        self.order.check_invariants(&self.arena)?;

        if self.map.len() != self.order.len() || self.arena.len() != self.order.len() {
            return Err(Error::invariant(format!(
                "map {} arena {} list {} sizes differ",
                self.map.len(),
                self.arena.len(),
                self.order.len()
            )));
        }
        if self.map.len() > self.capacity {
            return Err(Error::invariant("size exceeds capacity"));
        }
        for (id, entry) in self.order.iter(&self.arena) {
            if self.map.get(&entry.key) != Some(&id) {
                return Err(Error::invariant("list node not indexed by its key"));
            }
        }
        Ok(())
    }

    fn touch(&mut self, id: NodeId) {
        if self.order.front(&self.arena) == Some(id) {
            return; // Already at front
        }
        self.order.remove(&mut self.arena, id);
        self.order.push_front(&mut self.arena, id);
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let id = self.order.pop_back(&mut self.arena)?;
        let entry = self.arena.free(id)?;
        self.map.remove(&entry.key);
        trace!(len = self.map.len(), capacity = self.capacity, "lru eviction");
        Some((entry.key, entry.value))
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        LruCache::get(self, key)
    }

    fn push(&mut self, key: K, value: V) -> Option<(K, V)> {
        LruCache::push(self, key, value)
    }

    fn contains(&self, key: &K) -> bool {
        LruCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LruCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        LruCache::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_lru_basic() {
        let mut cache = LruCache::new(2);

        cache.put(1, "a");
        cache.put(2, "b");

        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&2), Some(&"b"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = LruCache::new(2);

        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c"); // Should evict 1

        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&"b"));
        assert_eq!(cache.get(&3), Some(&"c"));
    }

    #[test]
    fn test_lru_update() {
        let mut cache = LruCache::new(2);

        cache.put(1, "a");
        cache.put(2, "b");
        cache.get(&1); // Move 1 to front
        cache.put(3, "c"); // Should evict 2

        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some(&"c"));
    }

    #[test]
    fn test_lru_reference_scenario() {
        let mut cache = LruCache::new(2);

        cache.put(1, 100);
        cache.put(2, 200);
        assert_eq!(cache.get(&1), Some(&100));

        assert_eq!(cache.push(3, 300), Some((2, 200)));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some(&300));

        assert_eq!(cache.push(4, 400), Some((1, 100)));
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&3), Some(&300));
        assert_eq!(cache.get(&4), Some(&400));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_put_existing_refreshes_recency() {
        let mut cache = LruCache::new(2);

        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(1, "z"); // 1 is now newest

        assert_eq!(cache.push(3, "c"), Some((2, "b")));
        assert_eq!(cache.peek(&1), Some(&"z"));
    }

    #[test]
    fn test_lru_peek_keeps_order() {
        let mut cache = LruCache::new(2);

        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.peek(&1), Some(&"a"));

        assert_eq!(cache.push(3, "c"), Some((1, "a")));
    }

    #[test]
    fn test_lru_iter_order() {
        let mut cache = LruCache::new(3);

        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c");
        cache.get(&1);

        let keys: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 3, 2]);
    }

    #[test]
    fn test_lru_clear() {
        let mut cache = LruCache::new(3);

        cache.put(1, "a");
        cache.put(2, "b");
        cache.clear();

        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        cache.put(3, "c");
        assert_eq!(cache.get(&3), Some(&"c"));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_overwrite() {
        let mut cache = LruCache::new(2);

        cache.put(1, "a");
        cache.put(1, "b"); // Overwrite

        assert_eq!(cache.get(&1), Some(&"b"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_size_stays_at_capacity() {
        let mut cache = LruCache::new(4);

        for i in 0..100 {
            cache.put(i, i * 10);
            assert_eq!(cache.len(), (i + 1).min(4));
        }
        cache.check_invariants().unwrap();
    }

    #[test]
    fn test_lru_string_keys() {
        let mut cache = LruCache::new(2);

        cache.put("alpha".to_string(), 1);
        cache.put("beta".to_string(), 2);
        cache.get(&"alpha".to_string());
        cache.put("gamma".to_string(), 3);

        assert!(cache.contains(&"alpha".to_string()));
        assert!(!cache.contains(&"beta".to_string()));
    }

    #[test]
    fn test_lru_try_new_zero() {
        assert!(matches!(
            LruCache::<u32, u32>::try_new(0),
            Err(Error::ZeroCapacity)
        ));
    }

    #[test]
    fn test_lru_unbounded_capacity_allocates_lazily() {
        let mut cache = LruCache::try_new(usize::MAX).unwrap();
        assert_eq!(cache.capacity(), usize::MAX);

        for i in 0..10_000u32 {
            cache.put(i, i);
        }
        assert_eq!(cache.len(), 10_000);
        assert_eq!(cache.get(&0), Some(&0));
        cache.check_invariants().unwrap();
    }

    #[test]
    #[should_panic(expected = "Capacity must be greater than 0")]
    fn test_lru_new_zero_panics() {
        let _ = LruCache::<u32, u32>::new(0);
    }

    /// Reference model: keys ordered oldest first.
    fn model_touch(model: &mut Vec<(u8, u32)>, key: u8) -> Option<u32> {
        let pos = model.iter().position(|(k, _)| *k == key)?;
        let entry = model.remove(pos);
        model.push(entry);
        Some(entry.1)
    }

    proptest! {
        #[test]
        fn prop_matches_recency_model(
            capacity in 1usize..8,
            ops in prop::collection::vec((any::<bool>(), 0u8..16, any::<u32>()), 0..300)
        ) {
            let mut cache = LruCache::new(capacity);
            let mut model: Vec<(u8, u32)> = Vec::new();

            for (is_put, key, value) in ops {
                if is_put {
                    let expected = if model_touch(&mut model, key).is_some() {
                        model.last_mut().unwrap().1 = value;
                        None
                    } else {
                        let evicted = if model.len() == capacity {
                            Some(model.remove(0))
                        } else {
                            None
                        };
                        model.push((key, value));
                        evicted
                    };
                    prop_assert_eq!(cache.push(key, value), expected);
                } else {
                    let expected = model_touch(&mut model, key);
                    prop_assert_eq!(cache.get(&key).copied(), expected);
                }
                prop_assert!(cache.len() <= capacity);
                prop_assert!(cache.check_invariants().is_ok());
            }

            let order: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
            let expected: Vec<_> = model.iter().rev().copied().collect();
            prop_assert_eq!(order, expected);
        }
    }
}
