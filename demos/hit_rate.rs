//! Hit-rate comparison of every boundcache policy, with Moka and QuickCache
//! as reference points.
//!
//! The same Zipf(s=1.0) trace is replayed against each cache, cold, in
//! "online" mode: a miss inserts the key.  A final section runs the trace
//! through a memoized function to show the counters it keeps.
//!
//! Run with:
//!     RUST_LOG=boundcache=debug cargo run --example hit_rate --release

use boundcache::func::lru_cache;
use boundcache::keys::Args;
use boundcache::{Cache, CacheBuilder, Policy};
use moka::sync::Cache as MokaCache;
use quick_cache::sync::Cache as QuickCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Cache capacity (number of unique entries each cache may hold).
const CAP: usize = 10_000;
/// Key universe size.  CAP is 10 % of POOL → moderately hard workload.
const POOL: usize = 100_000;
/// Number of accesses in the trace.
const TRACE: usize = 500_000;

// ---------------------------------------------------------------------------
// Zipf(s=1.0) sampler
//
// Inverse-CDF: P(X ≤ k) ≈ ln(k) / ln(N), so k = N^u with u ~ Uniform(0, 1].
// ---------------------------------------------------------------------------

fn generate_trace(seed: u64, pool: usize, len: usize) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let u: f64 = 1.0 - rng.gen::<f64>();
            let k = (pool as f64).powf(u) as usize;
            k.saturating_sub(1).min(pool - 1)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Runners
// ---------------------------------------------------------------------------

fn run_policy<P: Policy<usize>>(
    mut cache: Cache<usize, usize, P>,
    trace: &[usize],
) -> (usize, Duration) {
    let start = Instant::now();
    let mut hits = 0usize;
    for &key in trace {
        if cache.get(&key).is_some() {
            hits += 1;
        } else if let Err(err) = cache.insert(key, key) {
            tracing::warn!(%err, key, "insert rejected");
        }
    }
    info!(evictions = cache.evictions(), resident = cache.len(), "run finished");
    (hits, start.elapsed())
}

fn run_moka(trace: &[usize]) -> (usize, Duration) {
    let cache: MokaCache<usize, usize> = MokaCache::new(CAP as u64);
    let start = Instant::now();
    let mut hits = 0usize;
    for &key in trace {
        if cache.get(&key).is_some() {
            hits += 1;
        } else {
            cache.insert(key, key);
        }
    }
    (hits, start.elapsed())
}

fn run_quick_cache(trace: &[usize]) -> (usize, Duration) {
    let cache: QuickCache<usize, usize> = QuickCache::new(CAP);
    let start = Instant::now();
    let mut hits = 0usize;
    for &key in trace {
        if cache.get(&key).is_some() {
            hits += 1;
        } else {
            cache.insert(key, key);
        }
    }
    (hits, start.elapsed())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("boundcache: hit rate by eviction policy");
    println!();
    println!("  Distribution : Zipf(s = 1.0)");
    println!("  Key universe : {POOL:>10} unique keys");
    println!(
        "  Capacity     : {CAP:>10} entries  ({:.0}% of universe)",
        CAP as f64 / POOL as f64 * 100.0
    );
    println!("  Trace length : {TRACE:>10} accesses");
    println!();
    let trace = generate_trace(0xDEAD_BEEF_1234_5678, POOL, TRACE);

    let col_cache = 14usize;
    let col_hits = 10usize;
    let col_rate = 10usize;
    let col_time = 12usize;

    println!(
        "{:<col_cache$} {:>col_hits$} {:>col_rate$} {:>col_time$}",
        "Cache", "Hits", "Hit Rate", "Time (ms)"
    );
    println!("{}", "─".repeat(col_cache + col_hits + col_rate + col_time + 3));

    let print_row = |name: &str, (hits, elapsed): (usize, Duration)| {
        println!(
            "{:<col_cache$} {:>col_hits$} {:>9.2}% {:>col_time$}",
            name,
            hits,
            hits as f64 / TRACE as f64 * 100.0,
            elapsed.as_millis(),
        );
    };

    let cap = CAP as u64;
    print_row("FIFO", run_policy(CacheBuilder::new(cap).fifo(), &trace));
    print_row("LRU", run_policy(CacheBuilder::new(cap).lru(), &trace));
    print_row("MRU", run_policy(CacheBuilder::new(cap).mru(), &trace));
    print_row("LFU", run_policy(CacheBuilder::new(cap).lfu(), &trace));
    print_row("Random", run_policy(CacheBuilder::new(cap).random(), &trace));
    print_row(
        "TTL (10 min)",
        run_policy(CacheBuilder::new(cap).ttl(Duration::from_secs(600)), &trace),
    );
    print_row("Moka", run_moka(&trace));
    print_row("QuickCache", run_quick_cache(&trace));

    println!();
    let memo = lru_cache(Some(cap), false).wrap(|args: &Args| args.positional().len());
    for &key in trace.iter().take(50_000) {
        memo.call(&Args::new().arg(key));
    }
    let stats = memo.stats();
    println!(
        "Memoized LRU over the first 50k calls: {} hits, {} misses, {:.2}% hit rate, {} evictions",
        stats.hits,
        stats.misses,
        stats.hit_rate * 100.0,
        stats.evictions
    );
}
