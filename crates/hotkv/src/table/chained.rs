//! Chained hash table with automatic grow/shrink
//!
//! Each bucket heads a singly-linked chain. New keys go to the head of their
//! chain; updates overwrite in place without reordering.

use std::borrow::Borrow;
use std::fmt;
use std::mem;

use tracing::debug;

use super::{TableConfig, MAXIMUM_INITIAL_CAPACITY};
use crate::error::{Error, Result};

type Link<K, V> = Option<Box<Entry<K, V>>>;

struct Entry<K, V> {
    key: K,
    value: V,
    next: Link<K, V>,
}

/// Separate-chaining hash table over FNV-hashed byte keys
pub struct HashTable<K, V> {
    buckets: Vec<Link<K, V>>,
    len: usize,
    config: TableConfig,
}

fn key_matches<K, Q>(stored: &K, key: &Q) -> bool
where
    K: Borrow<Q>,
    Q: ?Sized + Eq,
{
    let stored: &Q = stored.borrow();
    stored == key
}

fn empty_buckets<K, V>(capacity: usize) -> Vec<Link<K, V>> {
    (0..capacity).map(|_| None).collect()
}

impl<K, V> HashTable<K, V>
where
    K: AsRef<[u8]> + Eq,
{
    /// Create a table with the default policy
    ///
    /// `capacity` is clamped up to the default floor of 16.
    ///
    /// # Panics
    /// Panics if `capacity` exceeds [`MAXIMUM_INITIAL_CAPACITY`]. Use
    /// [`HashTable::try_new`] for a fallible constructor.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity <= MAXIMUM_INITIAL_CAPACITY,
            "Capacity must not exceed {}",
            MAXIMUM_INITIAL_CAPACITY
        );
        let config = TableConfig::default();
        Self {
            buckets: empty_buckets(capacity.max(config.minimum_capacity)),
            len: 0,
            config,
        }
    }

    /// Create a table with the default policy, rejecting oversized capacities
    pub fn try_new(capacity: usize) -> Result<Self> {
        Self::with_config(capacity, TableConfig::default())
    }

    /// Create a table with a custom policy
    pub fn with_config(capacity: usize, config: TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            buckets: empty_buckets(config.initial_capacity(capacity)?),
            len: 0,
            config,
        })
    }

    /// Insert or overwrite a key, returning the previous value
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let index = self.bucket_of(key.as_ref());

        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(entry) = cursor {
            if entry.key == key {
                return Some(mem::replace(&mut entry.value, value));
            }
            cursor = entry.next.as_deref_mut();
        }

        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Entry { key, value, next }));
        self.len += 1;

        if self.config.should_grow(self.len, self.capacity()) {
            self.resize(self.capacity() * 2);
        }
        None
    }

    /// Look up a key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        let index = self.bucket_of(key.as_ref());
        let mut cursor = self.buckets[index].as_deref();
        while let Some(entry) = cursor {
            if key_matches(&entry.key, key) {
                return Some(&entry.value);
            }
            cursor = entry.next.as_deref();
        }
        None
    }

    /// Look up a key for in-place mutation
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        let index = self.bucket_of(key.as_ref());
        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(entry) = cursor {
            if key_matches(&entry.key, key) {
                return Some(&mut entry.value);
            }
            cursor = entry.next.as_deref_mut();
        }
        None
    }

    /// Check whether a key is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        self.get(key).is_some()
    }

    /// Remove a key, returning its value
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + AsRef<[u8]> + Eq,
    {
        let index = self.bucket_of(key.as_ref());

        let mut link = &mut self.buckets[index];
        while link
            .as_ref()
            .is_some_and(|entry| !key_matches(&entry.key, key))
        {
            link = &mut link.as_mut()?.next;
        }
        let mut removed = link.take()?;
        *link = removed.next.take();
        self.len -= 1;

        if self.config.should_shrink(self.len, self.capacity()) {
            self.resize(self.config.shrunk_capacity(self.capacity()));
        }
        Some(removed.value)
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

    /// Current number of buckets
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// `len / capacity`
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Sizing policy in effect
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Drop every entry and return to the floor capacity
    pub fn clear(&mut self) {
        self.unlink_all();
        self.buckets = empty_buckets(self.config.minimum_capacity);
        self.len = 0;
    }

    /// Iterate over entries in bucket order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets.iter().flat_map(|head| Chain {
            cursor: head.as_deref(),
        })
    }

    /// Verify sizes, bucket placement and the load-factor ceiling
    pub fn check_invariants(&self) -> Result<()> {
        let capacity = self.capacity();
        if capacity < self.config.minimum_capacity {
            return Err(Error::invariant(format!(
                "capacity {} below floor {}",
                capacity, self.config.minimum_capacity
            )));
        }

        let mut counted = 0;
        for (index, head) in self.buckets.iter().enumerate() {
            let chain: Vec<&K> = Chain {
                cursor: head.as_deref(),
            }
            .map(|(k, _)| k)
            .collect();
            for (pos, &key) in chain.iter().enumerate() {
                if self.bucket_of(key.as_ref()) != index {
                    return Err(Error::invariant(format!(
                        "entry in bucket {} hashes elsewhere",
                        index
                    )));
                }
                if chain[..pos].contains(&key) {
                    return Err(Error::invariant(format!(
                        "duplicate key in bucket {}",
                        index
                    )));
                }
            }
            counted += chain.len();
        }

        if counted != self.len {
            return Err(Error::invariant(format!(
                "len {} but {} chained entries",
                self.len, counted
            )));
        }
        if self.config.should_grow(self.len, capacity) {
            return Err(Error::invariant("load factor above grow threshold"));
        }
        Ok(())
    }

    fn bucket_of(&self, bytes: &[u8]) -> usize {
        self.config.hash.bucket(bytes, self.capacity())
    }

    /// Relink every entry into a fresh bucket array
    fn resize(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(self.config.minimum_capacity);
        let old_capacity = self.capacity();
        let mut buckets = empty_buckets(new_capacity);

        for head in mem::take(&mut self.buckets) {
            let mut cursor = head;
            while let Some(mut entry) = cursor {
                cursor = entry.next.take();
                let index = self.config.hash.bucket(entry.key.as_ref(), new_capacity);
                entry.next = buckets[index].take();
                buckets[index] = Some(entry);
            }
        }

        self.buckets = buckets;
        debug!(
            from = old_capacity,
            to = new_capacity,
            len = self.len,
            "hash table resized"
        );
    }
}

impl<K, V> HashTable<K, V> {
    fn unlink_all(&mut self) {
        // iterative so long chains cannot overflow the stack on drop
        for head in self.buckets.iter_mut() {
            let mut cursor = head.take();
            while let Some(mut entry) = cursor {
                cursor = entry.next.take();
            }
        }
    }
}

impl<K, V> Drop for HashTable<K, V> {
    fn drop(&mut self) {
        self.unlink_all();
    }
}

impl<K, V> fmt::Debug for HashTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTable")
            .field("len", &self.len)
            .field("capacity", &self.buckets.len())
            .field("config", &self.config)
            .finish()
    }
}

struct Chain<'a, K, V> {
    cursor: Option<&'a Entry<K, V>>,
}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.cursor?;
        self.cursor = entry.next.as_deref();
        Some((&entry.key, &entry.value))
    }
}
