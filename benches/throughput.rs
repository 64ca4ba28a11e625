//! Throughput benchmarks: boundcache policies against each other, with one
//! Moka run per group as an outside reference.
//!
//! boundcache caches are unsynchronized, so the single-threaded groups use
//! them directly and the concurrent group puts each policy behind a
//! `parking_lot::Mutex`, the same way the memoization layer does.
//!
//! Run with:
//!     cargo bench --bench throughput

use boundcache::{Cache, CacheBuilder, Policy};
use criterion::measurement::WallTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkGroup, Criterion, Throughput};
use moka::sync::Cache as MokaCache;
use parking_lot::Mutex;
use std::sync::Barrier;
use std::time::{Duration, Instant};

/// Number of entries each cache is pre-filled with and its logical capacity.
const CAP: u64 = 10_000;

/// Operations executed per criterion iteration (hot-loop size).
const OPS: u64 = 1_000;

const TTL: Duration = Duration::from_secs(600);

/// Runs `$body` once per policy, with `$cache` bound to a fresh cache.
macro_rules! each_policy {
    ($group:expr, |$cache:ident| $body:expr) => {{
        run_policy($group, "fifo", CacheBuilder::new(CAP).fifo(), |$cache| $body);
        run_policy($group, "lru", CacheBuilder::new(CAP).lru(), |$cache| $body);
        run_policy($group, "mru", CacheBuilder::new(CAP).mru(), |$cache| $body);
        run_policy($group, "lfu", CacheBuilder::new(CAP).lfu(), |$cache| $body);
        run_policy($group, "random", CacheBuilder::new(CAP).random(), |$cache| $body);
        run_policy($group, "ttl", CacheBuilder::new(CAP).ttl(TTL), |$cache| $body);
    }};
}

fn run_policy<P, F>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    name: &str,
    mut cache: Cache<u64, u64, P>,
    mut body: F,
) where
    P: Policy<u64>,
    F: FnMut(&mut Cache<u64, u64, P>),
{
    group.bench_function(name, |b| b.iter(|| body(&mut cache)));
}

fn prefill<P: Policy<u64>>(cache: &mut Cache<u64, u64, P>) {
    for i in 0..CAP {
        let _ = cache.insert(i, i);
    }
}

// ---------------------------------------------------------------------------
// Group 1: get_hit
// ---------------------------------------------------------------------------
// All keys are present → measures pure read throughput with no eviction.
// The first iteration fills the cache; criterion's warm-up absorbs it.

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit");
    group.throughput(Throughput::Elements(OPS));

    each_policy!(&mut group, |cache| {
        if cache.is_empty() {
            prefill(cache);
        }
        for i in 0..OPS {
            black_box(cache.get(black_box(&i)));
        }
    });

    let moka: MokaCache<u64, u64> = MokaCache::new(CAP);
    for i in 0..CAP {
        moka.insert(i, i);
    }
    group.bench_function("moka", |b| {
        b.iter(|| {
            for i in 0..OPS {
                black_box(moka.get(black_box(&i)));
            }
        })
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Group 2: insert_evicting
// ---------------------------------------------------------------------------
// Always-new keys: every insert past the first CAP evicts exactly one entry.

fn bench_insert_evicting(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_evicting");
    group.throughput(Throughput::Elements(OPS));

    each_policy!(&mut group, |cache| {
        let base = cache.evictions() + cache.len() as u64;
        for k in base..base + OPS {
            let _ = cache.insert(black_box(k), black_box(k));
        }
    });

    group.bench_function("moka", |b| {
        let cache: MokaCache<u64, u64> = MokaCache::new(CAP);
        let mut key = 0u64;
        b.iter(|| {
            for _ in 0..OPS {
                cache.insert(black_box(key), black_box(key));
                key = key.wrapping_add(1);
            }
        })
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Group 3: mixed_80r_20w
// ---------------------------------------------------------------------------
// 80 % reads, 20 % writes, working set = 2× capacity (produces eviction).
// Keys cycle with a prime step to vary the access pattern.

fn bench_mixed_80r_20w(c: &mut Criterion) {
    const WORKING_SET: u64 = CAP * 2;
    const STEP: u64 = 7_919; // prime

    let mut group = c.benchmark_group("mixed_80r_20w");
    group.throughput(Throughput::Elements(OPS));

    each_policy!(&mut group, |cache| {
        for i in 0..OPS {
            let k = i.wrapping_mul(STEP) % WORKING_SET;
            if i % 5 == 0 {
                let _ = cache.insert(black_box(k), black_box(k));
            } else {
                black_box(cache.get(black_box(&k)));
            }
        }
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Group 4: concurrent_mixed, 8 threads, 50 % reads / 50 % writes
// ---------------------------------------------------------------------------

const THREADS: usize = 8;
const OPS_PER_THREAD: u64 = 2_000;

/// Spawns THREADS workers hammering one mutex-guarded cache and returns the
/// slowest worker's wall time.
fn run_contended<P: Policy<u64>>(cache: &Mutex<Cache<u64, u64, P>>) -> Duration {
    let barrier = Barrier::new(THREADS);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    let start = Instant::now();
                    let base = t as u64 * OPS_PER_THREAD;
                    for j in 0..OPS_PER_THREAD {
                        let k = base.wrapping_add(j * 7_919) % (CAP * 2);
                        let mut guard = cache.lock();
                        if j % 2 == 0 {
                            let _ = guard.insert(k, k);
                        } else {
                            black_box(guard.get(&k));
                        }
                    }
                    start.elapsed()
                })
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| h.join().ok())
            .max()
            .unwrap_or_default()
    })
}

fn bench_concurrent_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_8t_50r_50w");
    group.throughput(Throughput::Elements(THREADS as u64 * OPS_PER_THREAD));

    let lru = Mutex::new(CacheBuilder::new(CAP).lru());
    group.bench_function("lru_mutex", |b| {
        b.iter_custom(|iters| (0..iters).map(|_| run_contended(&lru)).sum())
    });

    let lfu = Mutex::new(CacheBuilder::new(CAP).lfu());
    group.bench_function("lfu_mutex", |b| {
        b.iter_custom(|iters| (0..iters).map(|_| run_contended(&lfu)).sum())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_get_hit,
    bench_insert_evicting,
    bench_mixed_80r_20w,
    bench_concurrent_mixed,
);
criterion_main!(benches);
