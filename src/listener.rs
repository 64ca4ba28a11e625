//! Eviction listener: a callback for entries the cache drops on its own.
//!
//! Explicit removals (`remove`, `pop`, `clear`) hand the value back to the
//! caller and are not reported.
//!
//! # Example
//! ```
//! use boundcache::listener::EvictionCause;
//! use boundcache::{CacheBuilder, FifoCache};
//! use std::sync::{Arc, Mutex};
//!
//! let log: Arc<Mutex<Vec<(u64, EvictionCause)>>> = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&log);
//!
//! let mut cache: FifoCache<u64, u64> = CacheBuilder::new(2)
//!     .eviction_listener(move |key: &u64, _value: &u64, cause| {
//!         sink.lock().unwrap().push((*key, cause));
//!     })
//!     .fifo();
//!
//! cache.insert(1, 10).unwrap();
//! cache.insert(2, 20).unwrap();
//! cache.insert(3, 30).unwrap();
//! assert_eq!(*log.lock().unwrap(), vec![(1, EvictionCause::Capacity)]);
//! ```

/// Why the cache dropped an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EvictionCause {
    /// Chosen by the eviction policy to make room for a store.
    Capacity,
    /// Its time-to-live ran out.
    Expired,
}

/// Invoked synchronously, inside the cache operation that dropped the
/// entry.  The cache is mutably borrowed at that point, so a listener
/// cannot call back into it.
pub trait EvictionListener<K, V>: Send + Sync + 'static {
    fn on_evict(&self, key: &K, value: &V, cause: EvictionCause);
}

/// An [`EvictionListener`] backed by a closure.
///
/// Created via [`CacheBuilder::eviction_listener`](crate::CacheBuilder::eviction_listener).
pub struct FnListener<F>(pub F);

impl<K, V, F> EvictionListener<K, V> for FnListener<F>
where
    F: Fn(&K, &V, EvictionCause) + Send + Sync + 'static,
{
    fn on_evict(&self, key: &K, value: &V, cause: EvictionCause) {
        (self.0)(key, value, cause)
    }
}
