//! Eviction policies.
//!
//! A policy owns only ordering metadata; values, weights and the capacity
//! budget belong to [`Cache`](crate::Cache).  The cache reports every
//! structural change through the `on_*` hooks and asks [`Policy::evict`]
//! for victims while it is over budget.

mod order;

pub mod fifo;
pub mod lfu;
pub mod lru;
pub mod mru;
pub mod random;
pub mod ttl;

use std::hash::Hash;

pub use order::OrderIter;

/// Victim-selection and ordering rule for a [`Cache`](crate::Cache).
///
/// Policies are driven single-threadedly by their cache; they need to be
/// `Send` so a cache can move behind a lock, but never `Sync`.
pub trait Policy<K: Hash + Eq + 'static>: Send {
    /// Iterator over resident keys in policy order.
    type Iter<'a>: Iterator<Item = &'a K>
    where
        Self: 'a;

    /// A new key was stored.
    fn on_insert(&mut self, key: &K);

    /// An existing key was stored again (value and/or weight replaced).
    fn on_update(&mut self, key: &K);

    /// A resident key was read.
    fn on_access(&mut self, key: &K);

    /// A key left the cache other than through [`evict`](Policy::evict) or
    /// [`pop_expired`](Policy::pop_expired).
    fn on_remove(&mut self, key: &K);

    /// Chooses a victim, forgets it and returns it.
    ///
    /// `exclude` is never chosen; it names the key whose re-store is making
    /// room for itself.  Returns `None` when no other candidate exists.
    fn evict(&mut self, exclude: Option<&K>) -> Option<K>;

    /// Resident keys in policy order (next victim first where that is
    /// defined).
    fn iter(&self) -> Self::Iter<'_>;

    /// Forgets every key.
    fn clear(&mut self);

    /// Whether `key` is still visible.  Only expiring policies say no.
    fn is_live(&self, _key: &K) -> bool {
        true
    }

    /// Forgets and returns one key whose lifetime has ended, earliest
    /// deadline first.
    fn pop_expired(&mut self) -> Option<K> {
        None
    }

    /// Keys whose lifetime has ended but that have not been purged yet.
    fn expired(&self) -> Box<dyn Iterator<Item = &K> + '_> {
        Box::new(std::iter::empty())
    }
}
