//! Reference scenarios with their expected results

use anyhow::{bail, Result};
use clap::ValueEnum;
use hotkv::{HashTable, LfuCache, LruCache};
use tracing::{info, warn};

/// Which scenario set to replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioKind {
    /// LRU capacity 2, keys 1 through 4
    Lru,
    /// LFU capacity 2, frequency-driven eviction
    Lfu,
    /// Chained hash table grow/shrink runs
    Table,
    /// Everything
    All,
}

/// One observed result next to what it should have been
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub label: String,
    pub got: String,
    pub expected: String,
}

impl Step {
    fn new(label: impl Into<String>, got: impl ToString, expected: impl ToString) -> Self {
        Self {
            label: label.into(),
            got: got.to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn passed(&self) -> bool {
        self.got == self.expected
    }
}

fn shown<T: ToString>(value: Option<&T>) -> String {
    value.map_or_else(|| "not found".to_string(), ToString::to_string)
}

pub fn lru_steps() -> Vec<Step> {
    let mut cache = LruCache::new(2);
    let mut steps = Vec::new();

    cache.put(1, 100);
    cache.put(2, 200);
    steps.push(Step::new("get 1", shown(cache.get(&1)), "100"));

    cache.put(3, 300); // evicts 2
    steps.push(Step::new("get 2", shown(cache.get(&2)), "not found"));
    steps.push(Step::new("get 3", shown(cache.get(&3)), "300"));

    cache.put(4, 400); // evicts 1
    steps.push(Step::new("get 1", shown(cache.get(&1)), "not found"));
    steps.push(Step::new("get 3", shown(cache.get(&3)), "300"));
    steps.push(Step::new("get 4", shown(cache.get(&4)), "400"));

    steps
}

pub fn lfu_steps() -> Vec<Step> {
    let mut steps = Vec::new();

    let mut cache = LfuCache::new(2);
    cache.put(1, 1);
    cache.put(2, 2);
    steps.push(Step::new("get 1", shown(cache.get(&1)), "1"));
    cache.put(3, 3); // evicts 2
    steps.push(Step::new("get 2", shown(cache.get(&2)), "not found"));
    steps.push(Step::new("get 3", shown(cache.get(&3)), "3"));

    let mut cache = LfuCache::new(2);
    cache.put(1, 10);
    cache.put(2, 20);
    steps.push(Step::new("get 1", shown(cache.get(&1)), "10"));
    steps.push(Step::new("get 1", shown(cache.get(&1)), "10"));
    cache.put(3, 30); // evicts 2
    steps.push(Step::new("get 2", shown(cache.get(&2)), "not found"));
    steps.push(Step::new("get 3", shown(cache.get(&3)), "30"));
    steps.push(Step::new("get 1", shown(cache.get(&1)), "10"));
    cache.put(4, 40); // evicts 3
    steps.push(Step::new("get 3", shown(cache.get(&3)), "not found"));
    steps.push(Step::new("get 4", shown(cache.get(&4)), "40"));
    steps.push(Step::new("get 1", shown(cache.get(&1)), "10"));

    let mut empty = LfuCache::new(0);
    empty.put(1, 1);
    steps.push(Step::new("zero capacity get 1", shown(empty.get(&1)), "not found"));

    steps
}

pub fn table_steps() -> Vec<Step> {
    let mut ht: HashTable<String, String> = HashTable::new(16);
    let mut steps = Vec::new();

    ht.set("one".into(), "1".into());
    ht.set("two".into(), "2".into());
    ht.set("three".into(), "3".into());
    steps.push(Step::new("one", shown(ht.get("one")), "1"));
    steps.push(Step::new("two", shown(ht.get("two")), "2"));
    steps.push(Step::new("three", shown(ht.get("three")), "3"));
    steps.push(Step::new("four", shown(ht.get("four")), "not found"));

    ht.set("one".into(), "100".into());
    steps.push(Step::new("one updated", shown(ht.get("one")), "100"));

    ht.delete("two");
    steps.push(Step::new("two after delete", shown(ht.get("two")), "not found"));
    ht.set("two".into(), "222".into());
    steps.push(Step::new("two re-inserted", shown(ht.get("two")), "222"));

    for i in 0..50 {
        ht.set(format!("collision_{}", i), i.to_string());
    }
    let collisions_ok =
        (0..50).all(|i| ht.get(format!("collision_{}", i).as_str()) == Some(&i.to_string()));
    steps.push(Step::new("collision test", collisions_ok, true));

    let large = 10_000;
    for i in 0..large {
        ht.set(format!("key_{}", i), i.to_string());
    }
    let grown_ok =
        (0..large).all(|i| ht.get(format!("key_{}", i).as_str()) == Some(&i.to_string()));
    steps.push(Step::new("large insert", grown_ok, true));
    let grown_capacity = ht.capacity();

    for i in 0..large - 100 {
        ht.delete(format!("key_{}", i).as_str());
    }
    let shrunk_ok = (large - 100..large)
        .all(|i| ht.get(format!("key_{}", i).as_str()) == Some(&i.to_string()));
    steps.push(Step::new("shrink integrity", shrunk_ok, true));
    steps.push(Step::new(
        "capacity shrank within floor",
        ht.capacity() < grown_capacity && ht.capacity() >= 16,
        true,
    ));

    steps.push(Step::new(
        "delete non-existent",
        ht.delete("does_not_exist"),
        false,
    ));

    let random_keys: Vec<String> = (0..5000).map(|i| format!("rand_{}", i)).collect();
    for (i, key) in random_keys.iter().enumerate() {
        ht.set(key.clone(), i.to_string());
    }
    let stress_ok = random_keys.iter().all(|k| ht.contains_key(k.as_str()));
    steps.push(Step::new("random stress", stress_ok, true));
    for key in &random_keys {
        ht.delete(key.as_str());
    }
    let all_deleted = random_keys.iter().all(|k| !ht.contains_key(k.as_str()));
    steps.push(Step::new("delete all", all_deleted, true));

    ht.set(String::new(), "empty".into());
    steps.push(Step::new("empty string key", shown(ht.get("")), "empty"));
    ht.set("0".into(), "zero".into());
    steps.push(Step::new("zero key", shown(ht.get("0")), "zero"));

    steps.push(Step::new(
        "table invariants",
        ht.check_invariants().is_ok(),
        true,
    ));
    info!(len = ht.len(), capacity = ht.capacity(), "table scenario finished");

    steps
}

fn report(name: &str, steps: &[Step]) -> usize {
    println!("===== {} =====", name);
    let mut failures = 0;
    for step in steps {
        if step.passed() {
            println!("  {:<32} {}", step.label, step.got);
        } else {
            failures += 1;
            warn!(label = %step.label, got = %step.got, expected = %step.expected, "scenario mismatch");
            println!(
                "  {:<32} {} (expected {})",
                step.label, step.got, step.expected
            );
        }
    }
    failures
}

pub fn run(kind: ScenarioKind) -> Result<()> {
    let mut failures = 0;

    if matches!(kind, ScenarioKind::Lru | ScenarioKind::All) {
        failures += report("LRU CACHE", &lru_steps());
    }
    if matches!(kind, ScenarioKind::Lfu | ScenarioKind::All) {
        failures += report("LFU CACHE", &lfu_steps());
    }
    if matches!(kind, ScenarioKind::Table | ScenarioKind::All) {
        failures += report("HASH TABLE", &table_steps());
    }

    if failures > 0 {
        bail!("{} scenario step(s) failed", failures);
    }
    info!("all scenario steps passed");
    Ok(())
}
