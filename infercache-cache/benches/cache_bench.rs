//! Criterion benchmarks for infercache: key derivation, ledger touch/evict, cache get/set.

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use infercache_cache::{make_key, Ledger, NoopObserver, TtlCache};

fn quiet_cache(capacity: usize) -> TtlCache {
    TtlCache::builder()
        .capacity(capacity)
        .observer(Arc::new(NoopObserver))
        .build()
        .unwrap()
}

fn bench_make_key(c: &mut Criterion) {
    let prompt = "Summarize the following support ticket in two sentences. ".repeat(16);
    let mut g = c.benchmark_group("key");
    g.throughput(Throughput::Bytes(prompt.len() as u64));
    g.bench_function("make_key", |b| {
        b.iter(|| black_box(make_key("tenant-a", "gpt-4o", &prompt)).unwrap());
    });
    g.finish();
}

fn bench_ledger(c: &mut Criterion) {
    let mut g = c.benchmark_group("ledger");
    g.throughput(Throughput::Elements(1));
    g.bench_function("touch_existing", |b| {
        let mut ledger = Ledger::with_capacity(1024);
        for k in 0..1024u32 {
            ledger.touch(&k);
        }
        let mut k = 0u32;
        b.iter(|| {
            k = (k + 1) % 1024;
            black_box(ledger.touch(&k));
        });
    });
    g.bench_function("touch_then_evict", |b| {
        b.iter_batched(
            || {
                let mut ledger = Ledger::with_capacity(1024);
                for k in 0..1024u32 {
                    ledger.touch(&k);
                }
                ledger
            },
            |mut ledger| {
                ledger.touch(&5000);
                black_box(ledger.evict_least_recent()).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
    g.finish();
}

fn bench_cache(c: &mut Criterion) {
    let cache = quiet_cache(4096);
    let keys: Vec<_> = (0..4096)
        .map(|i| make_key("tenant-a", "gpt-4o", &format!("prompt {i}")).unwrap())
        .collect();
    for key in &keys {
        cache.set_key(*key, vec![0u8; 256], Duration::from_secs(3600)).unwrap();
    }

    let mut g = c.benchmark_group("cache");
    g.throughput(Throughput::Elements(1));
    let mut i = 0usize;
    g.bench_function("get_hit", |b| {
        b.iter(|| {
            i = (i + 1) % keys.len();
            black_box(cache.get_key(&keys[i]));
        });
    });
    g.bench_function("set_overwrite", |b| {
        b.iter(|| {
            i = (i + 1) % keys.len();
            cache.set_key(keys[i], vec![1u8; 256], Duration::from_secs(3600)).unwrap();
        });
    });
    let mut n = 0u64;
    g.bench_function("set_with_eviction", |b| {
        b.iter(|| {
            n += 1;
            cache
                .set("tenant-b", "gpt-4o", &format!("fresh {n}"), vec![2u8; 256], 3600)
                .unwrap();
        });
    });
    g.finish();
}

criterion_group!(benches, bench_make_key, bench_ledger, bench_cache);
criterion_main!(benches);
