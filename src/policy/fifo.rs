use std::hash::Hash;

use super::order::{OrderIter, OrderList};
use super::Policy;

/// First-in, first-out: the oldest insertion is evicted, regardless of how
/// often or how recently it was read.  Re-storing a key keeps its place.
pub struct FifoPolicy<K> {
    order: OrderList<K>,
}

impl<K: Hash + Eq + Clone> FifoPolicy<K> {
    pub fn new() -> Self {
        FifoPolicy {
            order: OrderList::new(),
        }
    }
}

impl<K: Hash + Eq + Clone> Default for FifoPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone + Send + 'static> Policy<K> for FifoPolicy<K> {
    type Iter<'a> = OrderIter<'a, K>;

    fn on_insert(&mut self, key: &K) {
        self.order.push_back(key.clone());
    }

    fn on_update(&mut self, _key: &K) {}

    fn on_access(&mut self, _key: &K) {}

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_in_insertion_order() {
        let mut p: FifoPolicy<&str> = FifoPolicy::new();
        p.on_insert(&"a");
        p.on_insert(&"b");
        p.on_insert(&"c");
        assert_eq!(p.evict(None), Some("a"));
        assert_eq!(p.evict(None), Some("b"));
    }

    #[test]
    fn reads_and_updates_do_not_reorder() {
        let mut p: FifoPolicy<&str> = FifoPolicy::new();
        p.on_insert(&"a");
        p.on_insert(&"b");
        p.on_access(&"a");
        p.on_update(&"a");
        assert_eq!(p.iter().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(p.evict(None), Some("a"));
    }

    #[test]
    fn excluded_key_is_skipped() {
        let mut p: FifoPolicy<u32> = FifoPolicy::new();
        p.on_insert(&1);
        p.on_insert(&2);
        assert_eq!(p.evict(Some(&1)), Some(2));
        assert_eq!(p.evict(Some(&1)), None);
    }
}
