use std::hash::Hash;

use super::order::{OrderIter, OrderList};
use super::Policy;

/// Least-recently-used: every read and every store moves the key to the
/// recent end; the victim comes from the stale end.
///
/// The recency order is an index-arena doubly linked list, so touching any
/// key and popping the victim are both O(1).
pub struct LruPolicy<K> {
    order: OrderList<K>,
}

impl<K: Hash + Eq + Clone> LruPolicy<K> {
    pub fn new() -> Self {
        LruPolicy {
            order: OrderList::new(),
        }
    }

    /// The key that would be evicted next.
    pub fn peek_victim(&self) -> Option<&K> {
        self.order.front()
    }
}

impl<K: Hash + Eq + Clone> Default for LruPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone + Send + 'static> Policy<K> for LruPolicy<K> {
    type Iter<'a> = OrderIter<'a, K>;

    fn on_insert(&mut self, key: &K) {
        self.order.push_back(key.clone());
    }

    fn on_update(&mut self, key: &K) {
        self.order.move_to_back(key);
    }

    fn on_access(&mut self, key: &K) {
        self.order.move_to_back(key);
    }

    fn on_remove(&mut self, key: &K) {
        self.order.remove(key);
    }

    fn evict(&mut self, exclude: Option<&K>) -> Option<K> {
        self.order.pop_front_except(exclude)
    }

    fn iter(&self) -> OrderIter<'_, K> {
        self.order.iter()
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}
