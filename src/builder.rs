use std::hash::Hash;
use std::time::Duration;

use crate::cache::{
    Cache, FifoCache, LfuCache, LruCache, MruCache, RrCache, TtlCache, UNBOUNDED,
};
use crate::listener::{EvictionCause, EvictionListener, FnListener};
use crate::policy::fifo::FifoPolicy;
use crate::policy::lfu::LfuPolicy;
use crate::policy::lru::LruPolicy;
use crate::policy::mru::MruPolicy;
use crate::policy::random::{Chooser, RrPolicy};
use crate::policy::ttl::TtlPolicy;
use crate::policy::Policy;
use crate::timer::Timer;
use crate::weigher::{FnWeigher, UnitWeigher, Weigher};

/// Builder for configuring and constructing a [`Cache`].
///
/// Capacity, weigher and listener are set first; the terminal method picks
/// the eviction policy.
///
/// # Example
/// ```
/// use boundcache::{CacheBuilder, TtlCache};
/// use std::time::Duration;
///
/// let cache: TtlCache<String, String> = CacheBuilder::new(1_000)
///     .ttl(Duration::from_secs(60));
/// assert_eq!(cache.capacity(), 1_000);
/// ```
pub struct CacheBuilder<K, V> {
    capacity: u64,
    weigher: Box<dyn Weigher<K, V>>,
    listener: Option<Box<dyn EvictionListener<K, V>>>,
}

impl<K: 'static, V: 'static> CacheBuilder<K, V> {
    /// `capacity` is in weight units; with the default weigher that is a
    /// number of entries.  A capacity of 0 is allowed and rejects every
    /// store.
    pub fn new(capacity: u64) -> Self {
        CacheBuilder {
            capacity,
            weigher: Box::new(UnitWeigher),
            listener: None,
        }
    }

    /// No capacity bound.  Mostly useful together with [`ttl`](Self::ttl).
    pub fn unbounded() -> Self {
        Self::new(UNBOUNDED)
    }

    /// Register an eviction listener closure.
    ///
    /// The closure runs synchronously inside the operation that dropped the
    /// entry, for capacity evictions and expiry alike.
    pub fn eviction_listener<F>(mut self, f: F) -> Self
    where
        F: Fn(&K, &V, EvictionCause) + Send + Sync + 'static,
    {
        self.listener = Some(Box::new(FnListener(f)));
        self
    }

    /// Register an eviction listener via the [`EvictionListener`] trait.
    pub fn eviction_listener_impl<L: EvictionListener<K, V>>(mut self, l: L) -> Self {
        self.listener = Some(Box::new(l));
        self
    }

    /// Set a custom entry weigher via closure.
    ///
    /// # Example
    /// ```
    /// use boundcache::{CacheBuilder, LruCache};
    ///
    /// let cache: LruCache<String, Vec<u8>> = CacheBuilder::new(4096)
    ///     .weigher(|_k: &String, v: &Vec<u8>| v.len() as u64 + 1)
    ///     .lru();
    /// ```
    pub fn weigher<F>(mut self, f: F) -> Self
    where
        F: Fn(&K, &V) -> u64 + Send + Sync + 'static,
    {
        self.weigher = Box::new(FnWeigher(f));
        self
    }

    /// Set a weigher using any type that implements the [`Weigher`] trait.
    pub fn weigher_impl<W: Weigher<K, V>>(mut self, w: W) -> Self {
        self.weigher = Box::new(w);
        self
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: 'static,
{
    /// Builds a cache around any [`Policy`].
    pub fn build<P: Policy<K>>(self, policy: P) -> Cache<K, V, P> {
        Cache::from_parts(self.capacity, policy, self.weigher, self.listener)
    }

    pub fn fifo(self) -> FifoCache<K, V> {
        self.build(FifoPolicy::new())
    }

    pub fn lru(self) -> LruCache<K, V> {
        self.build(LruPolicy::new())
    }

    pub fn mru(self) -> MruCache<K, V> {
        self.build(MruPolicy::new())
    }

    pub fn lfu(self) -> LfuCache<K, V> {
        self.build(LfuPolicy::new())
    }

    /// Random replacement with an entropy-seeded chooser.
    pub fn random(self) -> RrCache<K, V> {
        self.build(RrPolicy::new())
    }

    /// Random replacement with a caller-supplied chooser.
    pub fn random_with<C: Chooser<K> + 'static>(self, chooser: C) -> RrCache<K, V> {
        self.build(RrPolicy::with_chooser(chooser))
    }

    /// Entries expire `ttl` after they were last stored; capacity evictions
    /// fall back to least-recently-used order.
    pub fn ttl(self, ttl: Duration) -> TtlCache<K, V> {
        self.build(TtlPolicy::new(ttl))
    }

    pub fn ttl_with_timer<T: Timer>(self, ttl: Duration, timer: T) -> TtlCache<K, V, T> {
        self.build(TtlPolicy::with_timer(ttl, timer))
    }
}
