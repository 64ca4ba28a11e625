use boundcache::func::{lfu_cache, lru_cache, rr_cache_with, ttl_cache_with_timer, DEFAULT_MAXSIZE};
use boundcache::keys::{Arg, Args, ArgsKey, HashKey};
use boundcache::policy::random::{Candidates, FnChooser};
use boundcache::timer::ManualTimer;
use boundcache::{memoize, FifoCache, LruCache};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::time::Duration;

fn first_int(args: &Args) -> i128 {
    match args.positional().first() {
        Some(Arg::Int(i)) => *i,
        _ => -1,
    }
}

// ---------------------------------------------------------------------------
// Hits and misses
// ---------------------------------------------------------------------------

#[test]
fn repeated_calls_hit() {
    let calls = AtomicUsize::new(0);
    let fib = memoize(LruCache::new(64), HashKey).wrap(|n: &u64| {
        calls.fetch_add(1, Ordering::SeqCst);
        (0..*n).fold((0u64, 1u64), |(a, b), _| (b, a + b)).0
    });
    for _ in 0..10 {
        assert_eq!(fib.call(&50), 12_586_269_025);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let info = fib.cache_info();
    assert_eq!((info.hits, info.misses), (9, 1));
    assert_eq!(info.capacity, Some(64));
    assert_eq!(info.current_size, 1);
}

#[test]
fn keyword_order_shares_an_entry() {
    let f = lru_cache(DEFAULT_MAXSIZE, false).wrap(|a: &Args| a.keywords().len());
    f.call(&Args::new().kwarg("a", 1).kwarg("b", 2));
    f.call(&Args::new().kwarg("b", 2).kwarg("a", 1));
    assert_eq!(f.cache_info().hits, 1);
}

#[test]
fn lfu_preset_keeps_hot_arguments() {
    let f = lfu_cache(Some(2), false).wrap(first_int);
    let hot = Args::new().arg(1);
    f.call(&hot);
    f.call(&hot);
    f.call(&Args::new().arg(2));
    f.call(&Args::new().arg(3));
    assert!(f.with_cache(|c| c.contains_key(&hot.key().unwrap())));
}

#[test]
fn rr_preset_uses_injected_chooser() {
    let f = rr_cache_with(
        Some(2),
        FnChooser(|c: &Candidates<'_, ArgsKey>| c.len() - 1),
        false,
    )
    .wrap(first_int);
    for i in 0..10 {
        assert_eq!(f.call(&Args::new().arg(i)), i128::from(i));
    }
    assert_eq!(f.cache_info().current_size, 2);
    assert_eq!(f.stats().evictions, 8);
}

#[test]
fn ttl_preset_expires_results() {
    let timer = ManualTimer::new();
    let f = ttl_cache_with_timer(DEFAULT_MAXSIZE, Duration::from_secs(30), timer.clone(), true)
        .wrap(first_int);
    let args = Args::new().arg(7);
    f.call(&args);
    timer.advance(Duration::from_secs(29));
    f.call(&args);
    timer.advance(Duration::from_secs(1));
    f.call(&args);
    let info = f.cache_info();
    assert_eq!((info.hits, info.misses), (1, 2));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_calls_agree_and_counters_add_up() {
    const THREADS: usize = 8;
    const CALLS: usize = 500;

    let computed = AtomicUsize::new(0);
    let square = memoize(LruCache::new(16), HashKey).wrap(|n: &u64| {
        computed.fetch_add(1, Ordering::SeqCst);
        n * n
    });
    let barrier = Barrier::new(THREADS);

    std::thread::scope(|s| {
        for t in 0..THREADS {
            let square = &square;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for j in 0..CALLS {
                    let n = ((t + j) % 32) as u64;
                    assert_eq!(square.call(&n), n * n);
                }
            });
        }
    });

    let info = square.cache_info();
    assert_eq!(info.hits + info.misses, (THREADS * CALLS) as u64);
    assert_eq!(info.misses as usize, computed.load(Ordering::SeqCst));
    assert!(info.current_size <= 16);
}

#[test]
fn same_key_may_be_computed_more_than_once() {
    const THREADS: usize = 4;

    let computed = AtomicUsize::new(0);
    let barrier = Barrier::new(THREADS);
    let slow = memoize(FifoCache::new(4), HashKey).wrap(|n: &u32| {
        computed.fetch_add(1, Ordering::SeqCst);
        // Every thread misses before any of them stores.
        barrier.wait();
        n + 1
    });

    std::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| assert_eq!(slow.call(&41), 42));
        }
    });

    assert_eq!(computed.load(Ordering::SeqCst), THREADS);
    let info = slow.cache_info();
    assert_eq!(info.misses, THREADS as u64);
    assert_eq!(info.current_size, 1);
    assert_eq!(slow.call(&41), 42);
    assert_eq!(slow.cache_info().hits, 1);
}

#[test]
fn lock_is_not_held_during_the_call() {
    let slow = memoize(LruCache::new(8), HashKey).wrap(|n: &u32| {
        std::thread::sleep(Duration::from_millis(50));
        *n
    });
    std::thread::scope(|s| {
        s.spawn(|| slow.call(&1));
        std::thread::sleep(Duration::from_millis(10));
        // Would deadlock-wait on the slow call if the guard spanned it.
        let peeked = slow.with_cache(|c| c.len());
        assert_eq!(peeked, 0);
    });
    assert_eq!(slow.with_cache(|c| c.len()), 1);
}
