use std::hash::Hash;

use super::order::{OrderIter, OrderList};
use super::Policy;

/// Most-recently-used: recency is tracked exactly as in
/// [`LruPolicy`](super::lru::LruPolicy), but the victim is the key touched
/// last.  Suits cyclic scans where the newest item is the least likely to
/// be needed again soon.
pub struct MruPolicy<K> {
    order: OrderList<K>,
}

impl<K: Hash + Eq + Clone> MruPolicy<K> {
    pub fn new() -> Self {
        MruPolicy {
            order: OrderList::new(),
        }
    }

    /// The key that would be evicted next.
    pub fn peek_victim(&self) -> Option<&K> {
        self.order.back()
    }
}

impl<K: Hash + Eq + Clone> Default for MruPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone + Send + 'static> Policy<K> for MruPolicy<K> {
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
        self.order.pop_back_except(exclude)
    }

    fn iter(&self) -> OrderIter<'_, K> {
        self.order.iter()
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_most_recent() {
        let mut p: MruPolicy<&str> = MruPolicy::new();
        p.on_insert(&"a");
        p.on_insert(&"b");
        p.on_access(&"a");
        assert_eq!(p.peek_victim(), Some(&"a"));
        assert_eq!(p.evict(None), Some("a"));
        assert_eq!(p.evict(None), Some("b"));
    }

    #[test]
    fn excluded_key_falls_back_to_next_recent() {
        let mut p: MruPolicy<&str> = MruPolicy::new();
        p.on_insert(&"a");
        p.on_insert(&"b");
        p.on_update(&"a");
        assert_eq!(p.evict(Some(&"a")), Some("b"));
    }
}
