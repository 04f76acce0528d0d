use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hotkv::{HashTable, LfuCache, LruCache, ProbingTable};

fn bench_lru_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_hit", |b| {
        let mut cache = LruCache::new(1000);
        for i in 0..1000u64 {
            cache.put(i, i);
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.get(&(counter % 1000)));
            counter += 1;
        });
    });

    group.bench_function("put_evict", |b| {
        let mut cache = LruCache::new(100);
        let mut counter = 0u64;
        b.iter(|| {
            cache.put(black_box(counter), counter);
            counter += 1;
        });
    });

    group.finish();
}

fn bench_lfu_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("lfu");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_read_50_write", |b| {
        let mut cache = LfuCache::new(1000);
        for i in 0..1000u64 {
            cache.put(i, i);
        }

        let mut counter = 0u64;
        b.iter(|| {
            if counter.is_multiple_of(2) {
                black_box(cache.get(&(counter % 1500)));
            } else {
                cache.put(counter % 1500, counter);
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_table_set_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("table");
    group.sample_size(30);

    for size in [1_000usize, 10_000] {
        let keys: Vec<String> = (0..size).map(|i| format!("key_{}", i)).collect();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("chained_fill", size), &keys, |b, keys| {
            b.iter(|| {
                let mut table = HashTable::new(16);
                for (i, key) in keys.iter().enumerate() {
                    table.set(key.as_str(), i);
                }
                black_box(table.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("probing_fill", size), &keys, |b, keys| {
            b.iter(|| {
                let mut table = ProbingTable::new(16);
                for (i, key) in keys.iter().enumerate() {
                    table.set(key.as_str(), i);
                }
                black_box(table.len())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_lru_get_hit,
    bench_lfu_mixed,
    bench_table_set_get
);
criterion_main!(benches);
