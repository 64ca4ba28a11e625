//! Entry weigher: the capacity cost of one resident entry.
//!
//! A cache enforces `current_size = Σ weight(entry) ≤ capacity`.  With the
//! default [`UnitWeigher`] every entry costs one unit and `capacity` is an
//! item count; a custom weigher turns `capacity` into a budget (bytes, rows,
//! tokens, ...).
//!
//! # Example
//! ```
//! use boundcache::{CacheBuilder, LruCache};
//!
//! // Budget of 1 KiB of payload.
//! let mut cache: LruCache<u32, Vec<u8>> = CacheBuilder::new(1024)
//!     .weigher(|_key: &u32, value: &Vec<u8>| value.len() as u64)
//!     .lru();
//! cache.insert(1, vec![0; 600]).unwrap();
//! cache.insert(2, vec![0; 600]).unwrap(); // displaces key 1
//! assert_eq!(cache.len(), 1);
//! ```

/// Computes the weight of a cache entry.
///
/// Weights are positive: a returned `0` is counted as `1` so that no entry
/// can sit in the cache for free.
pub trait Weigher<K, V>: Send + Sync + 'static {
    fn weigh(&self, key: &K, value: &V) -> u64;
}

/// Every entry weighs exactly one unit.  The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitWeigher;

impl<K, V> Weigher<K, V> for UnitWeigher {
    #[inline]
    fn weigh(&self, _key: &K, _value: &V) -> u64 {
        1
    }
}

/// A weigher backed by a closure.
///
/// Created via [`CacheBuilder::weigher`](crate::CacheBuilder::weigher).
pub struct FnWeigher<F>(pub F);

impl<K, V, F> Weigher<K, V> for FnWeigher<F>
where
    F: Fn(&K, &V) -> u64 + Send + Sync + 'static,
{
    #[inline]
    fn weigh(&self, key: &K, value: &V) -> u64 {
        (self.0)(key, value).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_weigher_ignores_value() {
        assert_eq!(Weigher::<u8, String>::weigh(&UnitWeigher, &1, &"x".repeat(64)), 1);
    }

    #[test]
    fn zero_weight_is_clamped() {
        let w = FnWeigher(|_k: &u8, _v: &u8| 0);
        assert_eq!(w.weigh(&0, &0), 1);
    }
}
