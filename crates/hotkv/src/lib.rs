//! # hotkv
//!
//! In-memory key-value structures with O(1) amortized operations.
//!
//! ## Architecture
//! - **Order list**: sentinel-bounded doubly-linked list over an index arena
//! - **LRU**: one order list, evicts the least recently touched key
//! - **LFU**: one order list per access frequency plus a tracked minimum,
//!   evicts the least recently touched key of the lowest frequency
//! - **Hash tables**: FNV-1a hashed, chained or linearly probed, doubling
//!   and halving on load factor
//! - **Shared**: optional one-lock wrapper with hit/miss statistics
//!
//! ```
//! use hotkv::{HashTable, LfuCache, LruCache};
//!
//! let mut lru = LruCache::new(2);
//! lru.put(1, 100);
//! lru.put(2, 200);
//! lru.get(&1);
//! lru.put(3, 300); // evicts 2
//! assert_eq!(lru.get(&2), None);
//!
//! let mut lfu = LfuCache::new(2);
//! lfu.put(1, 1);
//! lfu.put(2, 2);
//! lfu.get(&1);
//! lfu.put(3, 3); // evicts 2, the only key still at frequency 1
//! assert_eq!(lfu.get(&2), None);
//!
//! let mut table = HashTable::new(16);
//! table.set("one".to_string(), "1");
//! assert_eq!(table.get("one"), Some(&"1"));
//! assert!(table.delete("one"));
//! ```

#![warn(missing_docs)]

mod error;
pub mod fnv;
mod lfu;
pub mod list;
mod lru;
mod shared;
mod stats;
pub mod table;
mod traits;

pub use error::{Error, Result};
pub use fnv::HashWidth;
pub use lfu::LfuCache;
pub use lru::LruCache;
pub use shared::{SharedCache, SharedLfu, SharedLru};
pub use stats::{CacheStats, StatsSnapshot};
pub use table::{HashTable, ProbingTable, TableConfig};
pub use traits::Cache;
