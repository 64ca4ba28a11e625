use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use ahash::AHashMap;
use tracing::{debug, trace};

use crate::error::CacheError;
use crate::listener::{EvictionCause, EvictionListener};
use crate::policy::fifo::FifoPolicy;
use crate::policy::lfu::LfuPolicy;
use crate::policy::lru::LruPolicy;
use crate::policy::mru::MruPolicy;
use crate::policy::random::RrPolicy;
use crate::policy::ttl::TtlPolicy;
use crate::policy::Policy;
use crate::timer::{MonotonicTimer, Timer};
use crate::weigher::{UnitWeigher, Weigher};

/// Capacity of a cache bounded only by expiry (or not at all).
pub const UNBOUNDED: u64 = u64::MAX;

pub type FifoCache<K, V> = Cache<K, V, FifoPolicy<K>>;
pub type LruCache<K, V> = Cache<K, V, LruPolicy<K>>;
pub type MruCache<K, V> = Cache<K, V, MruPolicy<K>>;
pub type LfuCache<K, V> = Cache<K, V, LfuPolicy<K>>;
pub type RrCache<K, V> = Cache<K, V, RrPolicy<K>>;
pub type TtlCache<K, V, T = MonotonicTimer> = Cache<K, V, TtlPolicy<K, T>>;

struct Slot<V> {
    value: V,
    weight: u64,
}

/// A bounded key → value map whose eviction order is decided by `P`.
///
/// The cache tracks `current_size`, the sum of resident weights, and keeps
/// it at or below `capacity` after every operation.  Storing a key that
/// does not fit evicts victims chosen by the policy, one at a time, until
/// it does; a single entry heavier than the whole capacity is rejected with
/// [`CacheError::CapacityExceeded`] before anything is evicted.
///
/// `Cache` is not synchronized.  Share it between threads behind a lock,
/// or use [`memoize`](crate::memoize), which does exactly that.
///
/// # Example
/// ```
/// use boundcache::LruCache;
///
/// let mut cache: LruCache<&str, i32> = LruCache::new(2);
/// cache.insert("a", 1).unwrap();
/// cache.insert("b", 2).unwrap();
/// cache.get(&"a");
/// cache.insert("c", 3).unwrap(); // "b" is least recently used
/// assert!(!cache.contains_key(&"b"));
/// assert_eq!(cache.keys().copied().collect::<Vec<_>>(), vec!["a", "c"]);
/// ```
pub struct Cache<K, V, P> {
    entries: AHashMap<K, Slot<V>>,
    policy: P,
    weigher: Box<dyn Weigher<K, V>>,
    listener: Option<Box<dyn EvictionListener<K, V>>>,
    capacity: u64,
    current_size: u64,
    evictions: u64,
}

impl<K, V, P> Cache<K, V, P>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: 'static,
    P: Policy<K>,
{
    pub(crate) fn from_parts(
        capacity: u64,
        policy: P,
        weigher: Box<dyn Weigher<K, V>>,
        listener: Option<Box<dyn EvictionListener<K, V>>>,
    ) -> Self {
        Cache {
            entries: AHashMap::new(),
            policy,
            weigher,
            listener,
            capacity,
            current_size: 0,
            evictions: 0,
        }
    }

    /// A unit-weight cache driven by `policy`.
    pub fn with_policy(capacity: u64, policy: P) -> Self {
        Self::from_parts(capacity, policy, Box::new(UnitWeigher), None)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Returns the value for `key` and records the access with the policy.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.purge_expired();
        let slot = self.entries.get(key)?;
        self.policy.on_access(key);
        Some(&slot.value)
    }

    /// Returns the value for `key` without touching the eviction order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        if !self.policy.is_live(key) {
            return None;
        }
        self.entries.get(key).map(|slot| &slot.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key) && self.policy.is_live(key)
    }

    /// Weight charged for `key`, if resident.
    pub fn weight_of(&self, key: &K) -> Option<u64> {
        if !self.policy.is_live(key) {
            return None;
        }
        self.entries.get(key).map(|slot| slot.weight)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Stores `value` under `key`, weighed by the configured weigher.
    ///
    /// Returns the value it replaced, if any.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, CacheError> {
        let weight = self.weigher.weigh(&key, &value);
        self.insert_with_weight(key, value, weight)
    }

    /// Stores `value` under `key` with an explicit weight (`0` counts as `1`).
    ///
    /// A new key first evicts policy victims until it fits.  An existing key
    /// is replaced in place, counts as an access for the policy, and only
    /// evicts other keys if its weight grows.
    pub fn insert_with_weight(
        &mut self,
        key: K,
        value: V,
        weight: u64,
    ) -> Result<Option<V>, CacheError> {
        let weight = weight.max(1);
        self.purge_expired();
        if weight > self.capacity {
            debug!(weight, capacity = self.capacity, "rejecting entry heavier than the cache");
            return Err(CacheError::CapacityExceeded {
                weight,
                capacity: self.capacity,
            });
        }

        if let Some(old_weight) = self.entries.get(&key).map(|slot| slot.weight) {
            if weight > old_weight {
                self.make_room(weight - old_weight, Some(&key));
            }
            if let Some(slot) = self.entries.get_mut(&key) {
                let old = std::mem::replace(&mut slot.value, value);
                self.current_size = self.current_size - slot.weight + weight;
                slot.weight = weight;
                self.policy.on_update(&key);
                return Ok(Some(old));
            }
        }

        self.make_room(weight, None);
        self.entries.insert(key.clone(), Slot { value, weight });
        self.current_size = self.current_size.saturating_add(weight);
        self.policy.on_insert(&key);
        Ok(None)
    }

    /// Removes `key`, failing with [`CacheError::KeyNotFound`] if it is not
    /// resident.
    pub fn remove(&mut self, key: &K) -> Result<V, CacheError> {
        self.purge_expired();
        let slot = self.entries.remove(key).ok_or(CacheError::KeyNotFound)?;
        self.current_size -= slot.weight;
        self.policy.on_remove(key);
        Ok(slot.value)
    }

    /// Removes and returns `key`'s value if it is resident.
    pub fn pop(&mut self, key: &K) -> Option<V> {
        self.remove(key).ok()
    }

    /// Removes and returns the entry the policy would evict next.
    pub fn pop_victim(&mut self) -> Option<(K, V)> {
        self.purge_expired();
        let key = self.policy.evict(None)?;
        let slot = self.entries.remove(&key)?;
        self.current_size -= slot.weight;
        Some((key, slot.value))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.policy.clear();
        self.current_size = 0;
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len() - self.policy.expired().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Sum of the weights of live entries.
    pub fn current_size(&self) -> u64 {
        let stale: u64 = self
            .policy
            .expired()
            .filter_map(|key| self.entries.get(key))
            .map(|slot| slot.weight)
            .sum();
        self.current_size - stale
    }

    /// Entries dropped by the cache itself (capacity or expiry) so far.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Live keys in policy order.
    pub fn keys(&self) -> P::Iter<'_> {
        self.policy.iter()
    }

    /// Live values in policy order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Live entries in policy order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.policy
            .iter()
            .filter_map(move |key| self.entries.get(key).map(|slot| (key, &slot.value)))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Evicts victims until `incoming` more units fit.  `exclude` is never
    /// chosen.
    fn make_room(&mut self, incoming: u64, exclude: Option<&K>) {
        // A sum past `u64::MAX` is over any capacity, `UNBOUNDED` included.
        while self
            .current_size
            .checked_add(incoming)
            .map_or(true, |total| total > self.capacity)
        {
            let Some(victim) = self.policy.evict(exclude) else {
                break;
            };
            self.discard(victim, EvictionCause::Capacity);
        }
    }

    fn purge_expired(&mut self) -> usize {
        let mut purged = 0;
        while let Some(key) = self.policy.pop_expired() {
            self.discard(key, EvictionCause::Expired);
            purged += 1;
        }
        if purged > 0 {
            trace!(purged, remaining = self.entries.len(), "purged expired entries");
        }
        purged
    }

    /// Drops an entry the policy has already forgotten.
    fn discard(&mut self, key: K, cause: EvictionCause) -> Option<V> {
        let slot = self.entries.remove(&key)?;
        self.current_size -= slot.weight;
        self.evictions += 1;
        trace!(
            ?cause,
            weight = slot.weight,
            current_size = self.current_size,
            "entry evicted"
        );
        if let Some(listener) = &self.listener {
            listener.on_evict(&key, &slot.value, cause);
        }
        Some(slot.value)
    }
}

impl<K, V, P> Cache<K, V, P>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: 'static,
    P: Policy<K> + Default,
{
    /// A unit-weight cache holding at most `capacity` entries.
    pub fn new(capacity: u64) -> Self {
        Self::with_policy(capacity, P::default())
    }
}

// ---------------------------------------------------------------------------
// TTL surface
// ---------------------------------------------------------------------------

impl<K, V> Cache<K, V, TtlPolicy<K, MonotonicTimer>>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: 'static,
{
    /// Entries expire `ttl` after they were last stored.
    pub fn with_ttl(capacity: u64, ttl: Duration) -> Self {
        Self::with_policy(capacity, TtlPolicy::new(ttl))
    }

    /// A pure TTL cache: size is bounded only by expiry.
    pub fn unbounded_ttl(ttl: Duration) -> Self {
        Self::with_ttl(UNBOUNDED, ttl)
    }
}

impl<K, V, T> Cache<K, V, TtlPolicy<K, T>>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: 'static,
    T: Timer,
{
    pub fn with_ttl_and_timer(capacity: u64, ttl: Duration, timer: T) -> Self {
        Self::with_policy(capacity, TtlPolicy::with_timer(ttl, timer))
    }

    pub fn ttl(&self) -> Duration {
        self.policy.ttl()
    }

    pub fn timer(&self) -> &T {
        self.policy.timer()
    }

    /// Deadline of a live `key`, on the cache timer's scale.
    pub fn expires_at(&self, key: &K) -> Option<Duration> {
        if !self.contains_key(key) {
            return None;
        }
        self.policy.expires_at(key)
    }

    /// Time left before a live `key` expires.
    pub fn time_to_live(&self, key: &K) -> Option<Duration> {
        let at = self.expires_at(key)?;
        Some(at.saturating_sub(self.policy.now()))
    }

    /// Purges every entry whose deadline is at or before `time` (default:
    /// now) and returns them, earliest deadline first.
    pub fn expire(&mut self, time: Option<Duration>) -> Vec<(K, V)> {
        let time = time.unwrap_or_else(|| self.policy.now());
        let mut expired = Vec::new();
        while let Some(key) = self.policy.pop_expired_at(time) {
            if let Some(value) = self.discard(key.clone(), EvictionCause::Expired) {
                expired.push((key, value));
            }
        }
        if !expired.is_empty() {
            trace!(expired = expired.len(), "expired entries on request");
        }
        expired
    }
}

impl<K, V, P> fmt::Debug for Cache<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("resident", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("current_size", &self.current_size)
            .field("evictions", &self.evictions)
            .finish_non_exhaustive()
    }
}
