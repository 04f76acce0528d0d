//! LFU (Least Frequently Used) cache implementation
//!
//! Keeps one order list per access frequency, all sharing a single node
//! arena, plus the smallest frequency that currently has entries. Eviction
//! takes the least recently touched node of the lowest frequency.
//!
//! ```text
//!   min_frequency = 1
//!   1 ─► [k4] ◄──► [k2]        (k2 is the next victim)
//!   3 ─► [k1]
//! ```
//!
//! A hit moves the node from list `f` to list `f + 1`. If that empties the
//! list at `min_frequency`, the minimum rises by exactly one, because the node
//! just landed in `f + 1`. Empty lists are released so storage stays bounded
//! by capacity.

use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;
use tracing::trace;

use crate::error::{Error, Result};
use crate::list::{Arena, NodeId, OrderList, PREALLOCATE_LIMIT};
use crate::traits::Cache;

struct Entry<K, V> {
    key: K,
    value: V,
    frequency: u64,
}

/// LFU cache with fixed capacity
///
/// A capacity of 0 is allowed: every `put` is a no-op and every `get` misses.
pub struct LfuCache<K, V> {
    map: HashMap<K, NodeId, RandomState>,
    buckets: HashMap<u64, OrderList, RandomState>,
    arena: Arena<Entry<K, V>>,
    min_frequency: u64,
    capacity: usize,
}

impl<K, V> LfuCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LFU cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(
                capacity.min(PREALLOCATE_LIMIT),
                RandomState::new(),
            ),
            buckets: HashMap::with_hasher(RandomState::new()),
            arena: Arena::with_capacity(capacity),
            min_frequency: 0,
            capacity,
        }
    }

    /// Get a value, counting one access
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let id = *self.map.get(key)?;
        self.bump(id);
        self.arena.get(id).map(|entry| &entry.value)
    }

    /// Get a value without counting an access
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
        if self.capacity == 0 {
            return None;
        }

        if let Some(&id) = self.map.get(&key) {
            if let Some(entry) = self.arena.get_mut(id) {
                entry.value = value;
            }
            self.bump(id);
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
            frequency: 1,
        });
        self.attach(id, 1);
        self.map.insert(key, id);
        self.min_frequency = 1;

        evicted
    }

    /// Check whether a key is cached
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Access count of a cached key
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.map.get(key)?;
        self.arena.get(id).map(|entry| entry.frequency)
    }

    /// Smallest access count among cached keys, `None` when empty
    pub fn min_frequency(&self) -> Option<u64> {
        if self.map.is_empty() {
            None
        } else {
            Some(self.min_frequency)
        }
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
        self.buckets.clear();
        self.arena.clear();
        self.min_frequency = 0;
    }

    /// Verify frequency buckets, the key index and `min_frequency` agree
    pub fn check_invariants(&self) -> Result<()> {
        let mut linked = 0;
        for (&frequency, list) in &self.buckets {
            list.check_invariants(&self.arena)?;
            if list.is_empty() {
                return Err(Error::invariant(format!(
                    "empty list kept for frequency {}",
                    frequency
                )));
            }
            for (id, entry) in list.iter(&self.arena) {
                if entry.frequency != frequency {
                    return Err(Error::invariant(format!(
                        "node with frequency {} stored in list {}",
                        entry.frequency, frequency
                    )));
                }
                if self.map.get(&entry.key) != Some(&id) {
                    return Err(Error::invariant("list node not indexed by its key"));
                }
            }
            linked += list.len();
        }

        if linked != self.map.len() || self.arena.len() != self.map.len() {
            return Err(Error::invariant(format!(
                "map {} arena {} linked {} sizes differ",
                self.map.len(),
                self.arena.len(),
                linked
            )));
        }
        if self.map.len() > self.capacity {
            return Err(Error::invariant("size exceeds capacity"));
        }
        if let Some(&lowest) = self.buckets.keys().min() {
            if lowest != self.min_frequency {
                return Err(Error::invariant(format!(
                    "min_frequency {} but lowest populated frequency is {}",
                    self.min_frequency, lowest
                )));
            }
        }
        Ok(())
    }

    /// Move a node from its frequency list to the next one up
    fn bump(&mut self, id: NodeId) {
        let frequency = match self.arena.get(id) {
            Some(entry) => entry.frequency,
            None => return,
        };

        let emptied = match self.buckets.get_mut(&frequency) {
            Some(list) => {
                list.remove(&mut self.arena, id);
                list.is_empty()
            }
            None => return,
        };
        if emptied {
            self.release(frequency);
            if frequency == self.min_frequency {
                self.min_frequency += 1;
            }
        }

        if let Some(entry) = self.arena.get_mut(id) {
            entry.frequency = frequency + 1;
        }
        self.attach(id, frequency + 1);
    }

    fn attach(&mut self, id: NodeId, frequency: u64) {
        let arena = &mut self.arena;
        let list = self
            .buckets
            .entry(frequency)
            .or_insert_with(|| arena.new_list());
        list.push_front(arena, id);
    }

    fn release(&mut self, frequency: u64) {
        if let Some(list) = self.buckets.remove(&frequency) {
            self.arena.release_list(list);
        }
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let frequency = self.min_frequency;
        let list = self.buckets.get_mut(&frequency)?;
        let id = list.pop_back(&mut self.arena)?;
        let emptied = list.is_empty();
        if emptied {
            self.release(frequency);
        }

        let entry = self.arena.free(id)?;
        self.map.remove(&entry.key);
        trace!(frequency, len = self.map.len(), "lfu eviction");
        Some((entry.key, entry.value))
    }
}

impl<K, V> Cache<K, V> for LfuCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        LfuCache::get(self, key)
    }

    fn push(&mut self, key: K, value: V) -> Option<(K, V)> {
        LfuCache::push(self, key, value)
    }

    fn contains(&self, key: &K) -> bool {
        LfuCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LfuCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        LfuCache::clear(self)
    }
}
