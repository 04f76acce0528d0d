//! Access counters kept by [`SharedCache`](crate::SharedCache)
//!
//! Counters are bumped while the cache lock is held, one per lookup and one
//! per push, so a snapshot taken after the writers finish adds up:
//! `hits + misses` is the number of lookups and
//! `inserts + updates + rejected` the number of pushes.

use std::sync::atomic::{AtomicU64, Ordering};

/// What a single push did to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushOutcome {
    /// Key was already cached; value replaced in place
    Updated,
    /// New key stored without displacing anything
    Inserted,
    /// New key stored after evicting another
    Evicted,
    /// Nothing stored (zero-capacity LFU)
    Rejected,
}

/// Lock-free counters for one shared cache
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    evictions: AtomicU64,
    rejected: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Lookups that found their key
    pub hits: u64,
    /// Lookups that missed
    pub misses: u64,
    /// Pushes that stored a new key, evicting or not
    pub inserts: u64,
    /// Pushes that overwrote a cached key
    pub updates: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    /// Pushes that stored nothing
    pub rejected: u64,
}

impl StatsSnapshot {
    /// `hits + misses`
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Every push, stored or not
    pub fn pushes(&self) -> u64 {
        self.inserts + self.updates + self.rejected
    }

    /// `hits / lookups`, 0.0 before the first lookup
    pub fn hit_ratio(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    /// Share of inserts that had to evict
    pub fn eviction_ratio(&self) -> f64 {
        match self.inserts {
            0 => 0.0,
            inserts => self.evictions as f64 / inserts as f64,
        }
    }
}

impl CacheStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_lookup(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_push(&self, outcome: PushOutcome) {
        match outcome {
            PushOutcome::Updated => {
                self.updates.fetch_add(1, Ordering::Relaxed);
            }
            PushOutcome::Inserted => {
                self.inserts.fetch_add(1, Ordering::Relaxed);
            }
            PushOutcome::Evicted => {
                self.inserts.fetch_add(1, Ordering::Relaxed);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
            PushOutcome::Rejected => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Copy every counter
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.inserts,
            &self.updates,
            &self.evictions,
            &self.rejected,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
