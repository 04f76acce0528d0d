//! Common surface shared by the capacity-bounded caches

/// A fixed-capacity key-value cache with an eviction policy
///
/// `get` is not idempotent with respect to policy state: every hit counts as
/// an access. Repeated hits return the same value.
pub trait Cache<K, V> {
    /// Look up a key, recording the access
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Insert or update a key, returning the entry evicted to make room
    fn push(&mut self, key: K, value: V) -> Option<(K, V)>;

    /// Check whether a key is cached without recording an access
    fn contains(&self, key: &K) -> bool;

    /// Number of cached entries
    fn len(&self) -> usize;

    /// Maximum number of cached entries
    fn capacity(&self) -> usize;

    /// Drop every entry
    fn clear(&mut self);

    /// Insert or update a key, discarding any evicted entry
    fn put(&mut self, key: K, value: V) {
        self.push(key, value);
    }

    /// Check if the cache is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
