use std::sync::atomic::{AtomicU64, Ordering};

/// Call counters for one memoized function.
///
/// Updated with relaxed atomics after the cache lock is released, so a
/// snapshot taken under concurrent calls may be a few calls behind; every
/// call still lands in exactly one of `hits` or `misses`.
pub struct StatsCounter {
    hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
    rejected: AtomicU64,
    evictions: AtomicU64,
}

impl StatsCounter {
    pub fn new() -> Self {
        StatsCounter {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bypasses: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// A call whose key was looked up in the cache.
    #[inline]
    pub fn record_lookup(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// A call that ran without the cache because no key could be derived.
    /// Counts as a miss.
    #[inline]
    pub fn record_bypass(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.bypasses.fetch_add(1, Ordering::Relaxed);
    }

    /// A computed result the cache refused to keep.
    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Entries the cache dropped while serving one call.
    #[inline]
    pub fn record_evictions(&self, count: u64) {
        if count > 0 {
            self.evictions.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.bypasses,
            &self.rejected,
            &self.evictions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> Metrics {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let calls = hits + misses;
        Metrics {
            hits,
            misses,
            bypasses: self.bypasses.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate: if calls == 0 {
                0.0
            } else {
                hits as f64 / calls as f64
            },
        }
    }
}

impl Default for StatsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters of a memoized function since creation or the last `cache_clear`.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Calls answered from the cache.
    pub hits: u64,
    /// Calls that ran the function, bypasses included.
    pub misses: u64,
    /// Calls whose arguments produced no usable key.
    pub bypasses: u64,
    /// Results returned to the caller but not stored (heavier than the cache).
    pub rejected: u64,
    /// Entries the cache dropped on its own, for capacity or expiry.
    pub evictions: u64,
    /// `hits / (hits + misses)`, or `0.0` before the first call.
    pub hit_rate: f64,
}

impl Metrics {
    /// Total calls made through the memoized function.
    pub fn calls(&self) -> u64 {
        self.hits + self.misses
    }
}
