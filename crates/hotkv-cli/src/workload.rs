//! Seeded synthetic workloads

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use hotkv::{Cache, HashTable, LfuCache, LruCache, ProbingTable, SharedCache};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

/// Structure a workload runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// Least-recently-used cache
    Lru,
    /// Least-frequently-used cache
    Lfu,
    /// Chained hash table
    Table,
    /// Linear-probing hash table
    Probing,
}

/// Workload parameters
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    pub policy: Policy,
    pub capacity: usize,
    pub ops: usize,
    pub keys: u64,
    pub read_ratio: f64,
    pub delete_ratio: f64,
    pub hot_ratio: f64,
    pub seed: u64,
}

impl WorkloadConfig {
    fn validate(&self) -> Result<()> {
        if self.keys == 0 {
            bail!("key space must not be empty");
        }
        for (name, ratio) in [
            ("read-ratio", self.read_ratio),
            ("delete-ratio", self.delete_ratio),
            ("hot-ratio", self.hot_ratio),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                bail!("{} must be within 0.0..=1.0, got {}", name, ratio);
            }
        }
        Ok(())
    }
}

/// Summary of one workload run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub policy: Option<Policy>,
    pub seed: u64,
    pub ops: usize,
    pub reads: u64,
    pub writes: u64,
    pub deletes: u64,
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
    pub hit_ratio: f64,
    pub final_len: usize,
    pub final_capacity: usize,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
}

impl Report {
    pub fn print(&self) {
        println!("📊 WORKLOAD REPORT");
        if let Some(policy) = self.policy {
            println!("   Policy:        {:?}", policy);
        }
        println!("   Seed:          {}", self.seed);
        println!("   Operations:    {}", self.ops);
        println!(
            "   Reads/Writes:  {} / {} ({} deletes)",
            self.reads, self.writes, self.deletes
        );
        println!("   Hits/Misses:   {} / {}", self.hits, self.misses);
        println!("   Hit Ratio:     {:.4}", self.hit_ratio);
        println!(
            "   Inserts:       {} ({} updates)",
            self.inserts, self.updates
        );
        println!("   Evictions:     {}", self.evictions);
        println!(
            "   Final Size:    {} (capacity {})",
            self.final_len, self.final_capacity
        );
        println!(
            "   Elapsed:       {:.2} ms ({:.0} ops/sec)",
            self.elapsed_ms, self.ops_per_sec
        );
    }
}

/// One generated access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Get(u64),
    Put(u64, u64),
}

struct Generator {
    rng: StdRng,
    keys: u64,
    hot_keys: u64,
    read_ratio: f64,
    delete_ratio: f64,
    hot_ratio: f64,
}

impl Generator {
    fn new(config: &WorkloadConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            keys: config.keys,
            hot_keys: (config.keys / 5).max(1),
            read_ratio: config.read_ratio,
            delete_ratio: config.delete_ratio,
            hot_ratio: config.hot_ratio,
        }
    }

    fn key(&mut self) -> u64 {
        if self.rng.gen_bool(self.hot_ratio) {
            self.rng.gen_range(0..self.hot_keys)
        } else {
            self.rng.gen_range(0..self.keys)
        }
    }

    fn next_op(&mut self) -> Op {
        let key = self.key();
        if self.rng.gen_bool(self.read_ratio) {
            Op::Get(key)
        } else {
            Op::Put(key, self.rng.gen())
        }
    }

    /// Whether a table write becomes a delete of the same key
    fn write_deletes(&mut self) -> bool {
        self.rng.gen_bool(self.delete_ratio)
    }
}

/// Run the configured workload to completion
pub fn run(config: &WorkloadConfig) -> Result<Report> {
    config.validate()?;
    info!(
        policy = ?config.policy,
        capacity = config.capacity,
        ops = config.ops,
        seed = config.seed,
        "starting workload"
    );

    let started = Instant::now();
    let mut report = match config.policy {
        Policy::Lru => {
            let cache = LruCache::try_new(config.capacity)
                .context("LRU capacity must be greater than 0")?;
            run_cache(config, cache)
        }
        Policy::Lfu => run_cache(config, LfuCache::new(config.capacity)),
        Policy::Table => {
            let table = HashTable::try_new(config.capacity).context("invalid table capacity")?;
            run_table(config, ChainedTarget(table))
        }
        Policy::Probing => {
            let table =
                ProbingTable::try_new(config.capacity).context("invalid table capacity")?;
            run_table(config, ProbingTarget(table))
        }
    }?;

    let elapsed = started.elapsed();
    report.policy = Some(config.policy);
    report.seed = config.seed;
    report.ops = config.ops;
    report.elapsed_ms = elapsed.as_secs_f64() * 1_000.0;
    report.ops_per_sec = if elapsed.as_secs_f64() > 0.0 {
        config.ops as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };
    report.hit_ratio = if report.hits + report.misses == 0 {
        0.0
    } else {
        report.hits as f64 / (report.hits + report.misses) as f64
    };

    info!(
        hits = report.hits,
        misses = report.misses,
        evictions = report.evictions,
        "workload finished"
    );
    Ok(report)
}

fn run_cache<C>(config: &WorkloadConfig, cache: C) -> Result<Report>
where
    C: Cache<u64, u64>,
{
    let shared = SharedCache::new(cache);
    let mut generator = Generator::new(config);
    let mut report = Report::default();

    for _ in 0..config.ops {
        match generator.next_op() {
            Op::Get(key) => {
                report.reads += 1;
                shared.get(&key);
            }
            Op::Put(key, value) => {
                report.writes += 1;
                shared.put(key, value);
            }
        }
    }

    let stats = shared.stats().snapshot();
    report.hits = stats.hits;
    report.misses = stats.misses;
    report.inserts = stats.inserts;
    report.updates = stats.updates;
    report.evictions = stats.evictions;
    report.final_len = shared.len();
    report.final_capacity = shared.capacity();
    debug!(
        rejected = stats.rejected,
        eviction_ratio = stats.eviction_ratio(),
        "cache workload counters"
    );
    Ok(report)
}

/// Minimal surface shared by both table kinds for the workload loop
trait TableTarget {
    fn get(&self, key: &str) -> bool;
    /// Returns true when the key was already present
    fn set(&mut self, key: String, value: u64) -> bool;
    fn delete(&mut self, key: &str) -> bool;
    fn len(&self) -> usize;
    fn capacity(&self) -> usize;
    fn check(&self) -> hotkv::Result<()>;
}

struct ChainedTarget(HashTable<String, u64>);
struct ProbingTarget(ProbingTable<String, u64>);

impl TableTarget for ChainedTarget {
    fn get(&self, key: &str) -> bool {
        self.0.get(key).is_some()
    }
    fn set(&mut self, key: String, value: u64) -> bool {
        self.0.set(key, value).is_some()
    }
    fn delete(&mut self, key: &str) -> bool {
        self.0.delete(key)
    }
    fn len(&self) -> usize {
        self.0.len()
    }
    fn capacity(&self) -> usize {
        self.0.capacity()
    }
    fn check(&self) -> hotkv::Result<()> {
        self.0.check_invariants()
    }
}

impl TableTarget for ProbingTarget {
    fn get(&self, key: &str) -> bool {
        self.0.get(key).is_some()
    }
    fn set(&mut self, key: String, value: u64) -> bool {
        self.0.set(key, value).is_some()
    }
    fn delete(&mut self, key: &str) -> bool {
        self.0.delete(key)
    }
    fn len(&self) -> usize {
        self.0.len()
    }
    fn capacity(&self) -> usize {
        self.0.capacity()
    }
    fn check(&self) -> hotkv::Result<()> {
        self.0.check_invariants()
    }
}

fn run_table<T: TableTarget>(config: &WorkloadConfig, mut table: T) -> Result<Report> {
    let mut generator = Generator::new(config);
    let mut report = Report::default();
    let mut peak_capacity = table.capacity();

    for _ in 0..config.ops {
        match generator.next_op() {
            Op::Get(key) => {
                report.reads += 1;
                if table.get(&format!("key_{}", key)) {
                    report.hits += 1;
                } else {
                    report.misses += 1;
                }
            }
            Op::Put(key, _) if generator.write_deletes() => {
                report.writes += 1;
                if table.delete(&format!("key_{}", key)) {
                    report.deletes += 1;
                }
            }
            Op::Put(key, value) => {
                report.writes += 1;
                if table.set(format!("key_{}", key), value) {
                    report.updates += 1;
                } else {
                    report.inserts += 1;
                }
                peak_capacity = peak_capacity.max(table.capacity());
            }
        }
    }

    table.check().context("table invariants failed after workload")?;
    report.final_len = table.len();
    report.final_capacity = table.capacity();
    debug!(peak_capacity, "table workload counters");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(policy: Policy) -> WorkloadConfig {
        WorkloadConfig {
            policy,
            capacity: 64,
            ops: 5_000,
            keys: 500,
            read_ratio: 0.7,
            delete_ratio: 0.3,
            hot_ratio: 0.8,
            seed: 7,
        }
    }

    #[test]
    fn test_workload_lru() {
        let report = run(&config(Policy::Lru)).unwrap();
        assert_eq!(report.reads + report.writes, 5_000);
        assert_eq!(report.hits + report.misses, report.reads);
        assert!(report.final_len <= 64);
        assert!(report.evictions > 0);
    }

    #[test]
    fn test_workload_cache_counters_add_up() {
        for policy in [Policy::Lru, Policy::Lfu] {
            let report = run(&config(policy)).unwrap();
            assert_eq!(report.deletes, 0);
            assert_eq!(report.inserts + report.updates, report.writes);
            assert_eq!(
                report.inserts - report.evictions,
                report.final_len as u64
            );
        }
    }

    #[test]
    fn test_workload_table_deletes_come_from_writes() {
        let report = run(&config(Policy::Table)).unwrap();
        assert!(report.deletes > 0);
        assert!(report.inserts + report.updates + report.deletes <= report.writes);
        assert!(report.inserts >= report.final_len as u64);
    }

    #[test]
    fn test_workload_lfu() {
        let report = run(&config(Policy::Lfu)).unwrap();
        assert_eq!(report.hits + report.misses, report.reads);
        assert!(report.final_len <= 64);
    }

    #[test]
    fn test_workload_tables() {
        for policy in [Policy::Table, Policy::Probing] {
            let report = run(&config(policy)).unwrap();
            assert_eq!(report.reads + report.writes, 5_000);
            assert!(report.final_len <= 500);
            assert!(report.final_capacity >= 16);
            assert_eq!(report.evictions, 0);
        }
    }

    #[test]
    fn test_workload_is_reproducible() {
        let first = run(&config(Policy::Lfu)).unwrap();
        let second = run(&config(Policy::Lfu)).unwrap();
        assert_eq!(first.hits, second.hits);
        assert_eq!(first.evictions, second.evictions);
    }

    #[test]
    fn test_workload_rejects_bad_input() {
        let mut bad = config(Policy::Lru);
        bad.capacity = 0;
        assert!(run(&bad).is_err());

        let mut bad = config(Policy::Table);
        bad.read_ratio = 1.5;
        assert!(run(&bad).is_err());

        let mut bad = config(Policy::Lfu);
        bad.keys = 0;
        assert!(run(&bad).is_err());

        for policy in [Policy::Table, Policy::Probing] {
            let mut bad = config(policy);
            bad.capacity = usize::MAX;
            assert!(run(&bad).is_err());
        }

        let mut unbounded = config(Policy::Lru);
        unbounded.capacity = usize::MAX;
        let report = run(&unbounded).unwrap();
        assert_eq!(report.evictions, 0);
    }

    #[test]
    fn test_report_serializes() {
        let report = run(&config(Policy::Table)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["policy"], "table");
        assert_eq!(json["ops"], 5_000);
    }
}
