//! Open-addressing hash table with linear probing
//!
//! Removed keys leave a tombstone so later probes keep walking past them.
//! Tombstones count toward the grow threshold, which keeps at least one
//! empty slot in every probe sequence; any resize drops them.

use std::borrow::Borrow;
use std::mem;

use tracing::debug;

use super::{TableConfig, MAXIMUM_INITIAL_CAPACITY};
use crate::error::{Error, Result};

#[derive(Debug)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(K, V),
}

/// Linear-probing hash table over FNV-hashed byte keys
#[derive(Debug)]
pub struct ProbingTable<K, V> {
    slots: Vec<Slot<K, V>>,
    len: usize,
    tombstones: usize,
    config: TableConfig,
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

impl<K, V> ProbingTable<K, V>
where
    K: AsRef<[u8]> + Eq,
{
    /// Create a table with the default policy
    ///
    /// # Panics
    /// Panics if `capacity` exceeds [`MAXIMUM_INITIAL_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity <= MAXIMUM_INITIAL_CAPACITY,
            "Capacity must not exceed {}",
            MAXIMUM_INITIAL_CAPACITY
        );
        let config = TableConfig::default();
        Self {
            slots: empty_slots(capacity.max(config.minimum_capacity)),
            len: 0,
            tombstones: 0,
            config,
        }
    }

    /// Create a table with the default policy, rejecting oversized capacities
    pub fn try_new(capacity: usize) -> Result<Self> {
        Self::with_config(capacity, TableConfig::default())
    }

    /// Create a table with a custom policy
    ///
    /// Linear probing needs free slots, so `maximum_threshold` must be below 1.
    pub fn with_config(capacity: usize, config: TableConfig) -> Result<Self> {
        config.validate()?;
        if config.maximum_threshold >= 1.0 {
            return Err(Error::InvalidThreshold {
                minimum: config.minimum_threshold,
                maximum: config.maximum_threshold,
            });
        }
        Ok(Self {
            slots: empty_slots(config.initial_capacity(capacity)?),
            len: 0,
            tombstones: 0,
            config,
        })
    }

    /// Insert or overwrite a key, returning the previous value
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(index) = self.find(&key) {
            if let Slot::Occupied(_, current) = &mut self.slots[index] {
                return Some(mem::replace(current, value));
            }
        }

        let index = self.free_slot(key.as_ref());
        if matches!(self.slots[index], Slot::Tombstone) {
            self.tombstones -= 1;
        }
        self.slots[index] = Slot::Occupied(key, value);
        self.len += 1;

        let capacity = self.capacity();
        if self.config.should_grow(self.len, capacity) {
            self.resize(capacity * 2);
        } else if self.config.should_grow(self.len + self.tombstones, capacity) {
            // mostly tombstones: rebuild in place
            self.resize(capacity);
        }
        None
    }

    /// Look up a key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        match &self.slots[self.find(key)?] {
            Slot::Occupied(_, value) => Some(value),
            _ => None,
        }
    }

    /// Look up a key for in-place mutation
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        let index = self.find(key)?;
        match &mut self.slots[index] {
            Slot::Occupied(_, value) => Some(value),
            _ => None,
        }
    }

    /// Check whether a key is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        self.find(key).is_some()
    }

    /// Remove a key, returning its value
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        let index = self.find(key)?;
        let value = match mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied(_, value) => value,
            other => {
                self.slots[index] = other;
                return None;
            }
        };
        self.len -= 1;
        self.tombstones += 1;

        if self.config.should_shrink(self.len, self.capacity()) {
            self.resize(self.config.shrunk_capacity(self.capacity()));
        }
        Some(value)
    }

    /// Remove a key, reporting whether it was present
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        self.remove(key).is_some()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// `len / capacity`
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Sizing policy in effect
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Iterate over entries in slot order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(key, value) => Some((key, value)),
            _ => None,
        })
    }

    /// Verify counts and that every key is reachable from its home slot
    pub fn check_invariants(&self) -> Result<()> {
        let occupied = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(..)))
            .count();
        let tombstones = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Tombstone))
            .count();
        if occupied != self.len || tombstones != self.tombstones {
            return Err(Error::invariant(format!(
                "len {} tombstones {} but slots hold {} and {}",
                self.len, self.tombstones, occupied, tombstones
            )));
        }
        if self.capacity() < self.config.minimum_capacity {
            return Err(Error::invariant("capacity below floor"));
        }
        if self.config.should_grow(self.len + self.tombstones, self.capacity()) {
            return Err(Error::invariant("occupancy above grow threshold"));
        }
        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied(key, _) = slot {
                if self.find(key) != Some(index) {
                    return Err(Error::invariant(format!(
                        "key in slot {} is not reachable by probing",
                        index
                    )));
                }
            }
        }
        Ok(())
    }

    /// Slot index holding `key`, if present
    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        let capacity = self.capacity();
        let home = self.config.hash.bucket(key.as_ref(), capacity);
        for step in 0..capacity {
            let index = (home + step) % capacity;
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Occupied(stored, _) => {
                    let stored: &Q = stored.borrow();
                    if stored == key {
                        return Some(index);
                    }
                }
            }
        }
        None
    }

    /// First tombstone or empty slot on the probe path of `bytes`
    fn free_slot(&self, bytes: &[u8]) -> usize {
        let capacity = self.capacity();
        let home = self.config.hash.bucket(bytes, capacity);
        (0..capacity)
            .map(|step| (home + step) % capacity)
            .find(|&index| !matches!(self.slots[index], Slot::Occupied(..)))
            .unwrap_or(home)
    }

    fn resize(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(self.config.minimum_capacity);
        let old_capacity = self.capacity();
        let old = mem::replace(&mut self.slots, empty_slots(new_capacity));
        self.tombstones = 0;

        for slot in old {
            if let Slot::Occupied(key, value) = slot {
                let index = self.free_slot(key.as_ref());
                self.slots[index] = Slot::Occupied(key, value);
            }
        }

        debug!(
            from = old_capacity,
            to = new_capacity,
            len = self.len,
            "probing table resized"
        );
    }
}
