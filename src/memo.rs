//! Memoization: a function wrapped with a cache and a key function.
//!
//! The cache sits behind one `parking_lot::Mutex` per memoized function.  The
//! lock is held only to look a key up and, after a miss, to store the result;
//! the wrapped function always runs with the lock released, so a slow call
//! never blocks callers asking for other keys.
//!
//! There is no per-key deduplication.  Two threads missing on the same key at
//! the same time both run the function, and the later store overwrites the
//! earlier one.  For a pure function both results are equal, so callers only
//! pay for the duplicated work.
//!
//! ```
//! use boundcache::keys::HashKey;
//! use boundcache::{memoize, LruCache};
//!
//! let square = memoize(LruCache::new(16), HashKey).wrap(|n: &u64| n * n);
//! assert_eq!(square.call(&12), 144);
//! assert_eq!(square.call(&12), 144);
//! let info = square.cache_info();
//! assert_eq!((info.hits, info.misses), (1, 1));
//! ```

use std::hash::Hash;
use std::marker::PhantomData;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{Cache, UNBOUNDED};
use crate::keys::KeyFn;
use crate::metrics::stats::{Metrics, StatsCounter};
use crate::policy::Policy;

/// Counters and occupancy of a memoized function's cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheInfo {
    pub hits: u64,
    pub misses: u64,
    /// `None` when the cache is bounded only by expiry.
    pub capacity: Option<u64>,
    pub current_size: u64,
}

/// A cache paired with a key function, waiting for the function to wrap.
pub struct Memoize<K, V, P, KF> {
    cache: Cache<K, V, P>,
    key_fn: KF,
}

/// Pairs `cache` with `key_fn`; call [`Memoize::wrap`] to get the memoized
/// function.
pub fn memoize<K, V, P, KF>(cache: Cache<K, V, P>, key_fn: KF) -> Memoize<K, V, P, KF> {
    Memoize { cache, key_fn }
}

impl<K, V, P, KF> Memoize<K, V, P, KF> {
    pub fn wrap<A, R, F>(self, func: F) -> Memoized<A, K, V, P, KF, F>
    where
        A: ?Sized,
        KF: KeyFn<A, Key = K>,
        F: Fn(&A) -> R,
    {
        Memoized {
            func,
            key_fn: self.key_fn,
            cache: Mutex::new(self.cache),
            stats: StatsCounter::new(),
            _args: PhantomData,
        }
    }
}

/// A function whose results are cached by key.
///
/// `call` wraps infallible functions, `try_call` wraps functions returning
/// `Result`; only `Ok` values are cached and errors reach the caller
/// untouched.
pub struct Memoized<A: ?Sized, K, V, P, KF, F> {
    func: F,
    key_fn: KF,
    cache: Mutex<Cache<K, V, P>>,
    stats: StatsCounter,
    _args: PhantomData<fn(&A)>,
}

impl<A, K, V, P, KF, F> Memoized<A, K, V, P, KF, F>
where
    A: ?Sized,
    K: Hash + Eq + Clone + Send + 'static,
    V: Clone + 'static,
    P: Policy<K>,
    KF: KeyFn<A, Key = K>,
{
    pub fn call(&self, args: &A) -> V
    where
        F: Fn(&A) -> V,
    {
        let Some(key) = self.derive_key(args) else {
            self.stats.record_bypass();
            return (self.func)(args);
        };
        if let Some(value) = self.lookup(&key) {
            return value;
        }
        let value = (self.func)(args);
        self.store(key, value.clone());
        value
    }

    pub fn try_call<E>(&self, args: &A) -> Result<V, E>
    where
        F: Fn(&A) -> Result<V, E>,
    {
        let Some(key) = self.derive_key(args) else {
            self.stats.record_bypass();
            return (self.func)(args);
        };
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }
        let value = (self.func)(args)?;
        self.store(key, value.clone());
        Ok(value)
    }

    pub fn cache_info(&self) -> CacheInfo {
        let metrics = self.stats.snapshot();
        let cache = self.cache.lock();
        let capacity = cache.capacity();
        CacheInfo {
            hits: metrics.hits,
            misses: metrics.misses,
            capacity: (capacity != UNBOUNDED).then_some(capacity),
            current_size: cache.current_size(),
        }
    }

    /// Empties the cache and resets the counters.
    pub fn cache_clear(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
        self.stats.reset();
    }

    pub fn stats(&self) -> Metrics {
        self.stats.snapshot()
    }

    /// Runs `f` with the cache lock held.
    pub fn with_cache<R>(&self, f: impl FnOnce(&mut Cache<K, V, P>) -> R) -> R {
        f(&mut self.cache.lock())
    }

    pub fn key_fn(&self) -> &KF {
        &self.key_fn
    }

    fn derive_key(&self, args: &A) -> Option<K> {
        match self.key_fn.key(args) {
            Ok(key) => Some(key),
            Err(err) => {
                debug!(%err, "calling through without the cache");
                None
            }
        }
    }

    fn lookup(&self, key: &K) -> Option<V> {
        let hit = {
            let mut cache = self.cache.lock();
            let before = cache.evictions();
            let hit = cache.get(key).cloned();
            self.stats.record_evictions(cache.evictions() - before);
            hit
        };
        self.stats.record_lookup(hit.is_some());
        hit
    }

    fn store(&self, key: K, value: V) {
        let mut cache = self.cache.lock();
        let before = cache.evictions();
        if let Err(err) = cache.insert(key, value) {
            debug!(%err, "result returned without being cached");
            self.stats.record_rejected();
        }
        self.stats.record_evictions(cache.evictions() - before);
    }
}
