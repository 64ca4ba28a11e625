use std::hash::Hash;

use ahash::AHashMap;

/// Sentinel indices in the `nodes` arena.
const FRONT: usize = 0; // oldest / stale end
const BACK: usize = 1; // newest / recent end
const NULL: usize = usize::MAX;

struct OrderNode<K> {
    /// `None` for the two sentinels and for free slots.
    key: Option<K>,
    /// Index toward FRONT.
    prev: usize,
    /// Index toward BACK.
    next: usize,
}

/// An ordered key sequence with O(1) append, touch, removal and pop at
/// either end.
///
/// Nodes live in a `Vec` arena and are linked by index; a key → slot map
/// gives constant-time access to any position.  FIFO keeps insertion order
/// in it, and LRU/MRU/TTL keep recency order.
pub struct OrderList<K> {
    /// Index 0 = FRONT sentinel, 1 = BACK sentinel, 2+ = keys.
    nodes: Vec<OrderNode<K>>,
    index: AHashMap<K, usize>,
    free_list: Vec<usize>,
}

impl<K: Hash + Eq + Clone> OrderList<K> {
    pub(crate) fn new() -> Self {
        let nodes = vec![
            OrderNode {
                key: None,
                prev: NULL,
                next: BACK,
            },
            OrderNode {
                key: None,
                prev: FRONT,
                next: NULL,
            },
        ];
        OrderList {
            nodes,
            index: AHashMap::new(),
            free_list: Vec::new(),
        }
    }

    /// Appends `key` at the back.  A key already present is moved there.
    pub(crate) fn push_back(&mut self, key: K) {
        if let Some(&idx) = self.index.get(&key) {
            self.unlink(idx);
            self.link_before_back(idx);
            return;
        }
        let idx = self.alloc(key.clone());
        self.index.insert(key, idx);
        self.link_before_back(idx);
    }

    /// Moves an existing key to the back.  Returns `false` if absent.
    pub(crate) fn move_to_back(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                self.unlink(idx);
                self.link_before_back(idx);
                true
            }
            None => false,
        }
    }

    /// Removes `key`.  Returns `false` if absent.
    pub(crate) fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(idx) => {
                self.unlink(idx);
                self.release(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn front(&self) -> Option<&K> {
        self.nodes[self.nodes[FRONT].next].key.as_ref()
    }

    pub(crate) fn back(&self) -> Option<&K> {
        self.nodes[self.nodes[BACK].prev].key.as_ref()
    }

    /// Pops the front-most key that is not `exclude`.
    pub(crate) fn pop_front_except(&mut self, exclude: Option<&K>) -> Option<K> {
        let mut idx = self.nodes[FRONT].next;
        if idx != BACK && self.is_key_at(idx, exclude) {
            idx = self.nodes[idx].next;
        }
        self.take(idx)
    }

    /// Pops the back-most key that is not `exclude`.
    pub(crate) fn pop_back_except(&mut self, exclude: Option<&K>) -> Option<K> {
        let mut idx = self.nodes[BACK].prev;
        if idx != FRONT && self.is_key_at(idx, exclude) {
            idx = self.nodes[idx].prev;
        }
        self.take(idx)
    }

    /// Iterates front (oldest) to back (newest).
    pub(crate) fn iter(&self) -> OrderIter<'_, K> {
        OrderIter {
            nodes: &self.nodes,
            cursor: self.nodes[FRONT].next,
            remaining: self.index.len(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[FRONT].next = BACK;
        self.nodes[BACK].prev = FRONT;
        self.index.clear();
        self.free_list.clear();
    }

    fn is_key_at(&self, idx: usize, key: Option<&K>) -> bool {
        match (key, self.nodes[idx].key.as_ref()) {
            (Some(k), Some(at)) => k == at,
            _ => false,
        }
    }

    /// Detaches a real node and hands back its key.  Sentinels yield `None`.
    fn take(&mut self, idx: usize) -> Option<K> {
        if idx == FRONT || idx == BACK {
            return None;
        }
        self.unlink(idx);
        let key = self.nodes[idx].key.take()?;
        self.index.remove(&key);
        self.free_list.push(idx);
        Some(key)
    }

    fn link_before_back(&mut self, idx: usize) {
        let last = self.nodes[BACK].prev;
        self.nodes[idx].prev = last;
        self.nodes[idx].next = BACK;
        self.nodes[last].next = idx;
        self.nodes[BACK].prev = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[idx].prev = NULL;
        self.nodes[idx].next = NULL;
    }

    fn alloc(&mut self, key: K) -> usize {
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx].key = Some(key);
            idx
        } else {
            self.nodes.push(OrderNode {
                key: Some(key),
                prev: NULL,
                next: NULL,
            });
            self.nodes.len() - 1
        }
    }

    fn release(&mut self, idx: usize) {
        self.nodes[idx].key = None;
        self.free_list.push(idx);
    }
}

/// Front-to-back iterator over an [`OrderList`].
pub struct OrderIter<'a, K> {
    nodes: &'a [OrderNode<K>],
    cursor: usize,
    remaining: usize,
}

impl<'a, K> Iterator for OrderIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.cursor];
        self.cursor = node.next;
        self.remaining -= 1;
        node.key.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for OrderIter<'_, K> {}
