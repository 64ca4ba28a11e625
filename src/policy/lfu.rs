use std::collections::{btree_map, BTreeMap};
use std::hash::Hash;

use ahash::AHashMap;

use super::Policy;

/// Least-frequently-used.
///
/// New keys start at frequency 0, so an entry that has never been read is
/// the first candidate for eviction.  Every read (and every re-store) adds
/// one.  Each key also gets an insertion sequence number that stays fixed
/// while it is resident; among equal frequencies the lowest sequence number
/// (the longest-resident key) is evicted first.
///
/// Buckets are `frequency -> (sequence -> key)`, so a touch costs
/// O(log n) to move the key between two adjacent buckets.
pub struct LfuPolicy<K> {
    ranks: AHashMap<K, Rank>,
    buckets: BTreeMap<u64, BTreeMap<u64, K>>,
    next_seq: u64,
}

#[derive(Clone, Copy)]
struct Rank {
    frequency: u64,
    seq: u64,
}

impl<K: Hash + Eq + Clone> LfuPolicy<K> {
    pub fn new() -> Self {
        LfuPolicy {
            ranks: AHashMap::new(),
            buckets: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Current use count of `key`, if tracked.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.ranks.get(key).map(|rank| rank.frequency)
    }

    fn bump(&mut self, key: &K) {
        let Some(rank) = self.ranks.get_mut(key) else {
            return;
        };
        let from = *rank;
        rank.frequency = from.frequency.saturating_add(1);
        let to = rank.frequency;
        if let Some(key) = self.detach(from) {
            self.buckets.entry(to).or_default().insert(from.seq, key);
        }
    }

    fn detach(&mut self, rank: Rank) -> Option<K> {
        let bucket = self.buckets.get_mut(&rank.frequency)?;
        let key = bucket.remove(&rank.seq);
        if bucket.is_empty() {
            self.buckets.remove(&rank.frequency);
        }
        key
    }
}

impl<K: Hash + Eq + Clone> Default for LfuPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone + Send + 'static> Policy<K> for LfuPolicy<K> {
    type Iter<'a> = LfuIter<'a, K>;

    fn on_insert(&mut self, key: &K) {
        if self.ranks.contains_key(key) {
            self.bump(key);
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.ranks.insert(key.clone(), Rank { frequency: 0, seq });
        self.buckets.entry(0).or_default().insert(seq, key.clone());
    }

    fn on_update(&mut self, key: &K) {
        self.bump(key);
    }

    fn on_access(&mut self, key: &K) {
        self.bump(key);
    }

    fn on_remove(&mut self, key: &K) {
        if let Some(rank) = self.ranks.remove(key) {
            self.detach(rank);
        }
    }

    fn evict(&mut self, exclude: Option<&K>) -> Option<K> {
        // `exclude` hides at most one key, so at most two entries are skipped.
        let (frequency, seq) = self.buckets.iter().find_map(|(&frequency, bucket)| {
            bucket
                .iter()
                .find(|(_, key)| exclude != Some(*key))
                .map(|(&seq, _)| (frequency, seq))
        })?;
        let victim = self.detach(Rank { frequency, seq })?;
        self.ranks.remove(&victim);
        Some(victim)
    }

    fn iter(&self) -> LfuIter<'_, K> {
        LfuIter {
            buckets: self.buckets.values(),
            current: None,
        }
    }

    fn clear(&mut self) {
        self.ranks.clear();
        self.buckets.clear();
        self.next_seq = 0;
    }
}

/// Keys from lowest to highest frequency, oldest first within a frequency.
pub struct LfuIter<'a, K> {
    buckets: btree_map::Values<'a, u64, BTreeMap<u64, K>>,
    current: Option<btree_map::Values<'a, u64, K>>,
}

impl<'a, K> Iterator for LfuIter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            if let Some(key) = self.current.as_mut().and_then(Iterator::next) {
                return Some(key);
            }
            self.current = Some(self.buckets.next()?.values());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_read_key_is_evicted_first() {
        let mut p: LfuPolicy<&str> = LfuPolicy::new();
        p.on_insert(&"a");
        p.on_insert(&"b");
        p.on_access(&"a");
        p.on_access(&"a");
        assert_eq!(p.frequency(&"a"), Some(2));
        assert_eq!(p.frequency(&"b"), Some(0));
        assert_eq!(p.evict(None), Some("b"));
    }

    #[test]
    fn ties_break_by_insertion_order() {
        let mut p: LfuPolicy<u32> = LfuPolicy::new();
        for k in 1..=3 {
            p.on_insert(&k);
        }
        assert_eq!(p.evict(None), Some(1));
        assert_eq!(p.evict(None), Some(2));
    }

    #[test]
    fn equal_frequency_keeps_insertion_order_after_reads() {
        let mut p: LfuPolicy<&str> = LfuPolicy::new();
        p.on_insert(&"a");
        p.on_insert(&"b");
        // "b" reaches frequency 1 before "a" does.
        p.on_access(&"b");
        p.on_access(&"a");
        assert_eq!(p.iter().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(p.evict(None), Some("a"));
    }

    #[test]
    fn reinserted_key_gets_a_fresh_sequence() {
        let mut p: LfuPolicy<&str> = LfuPolicy::new();
        p.on_insert(&"a");
        p.on_insert(&"b");
        p.on_remove(&"a");
        p.on_insert(&"a");
        assert_eq!(p.evict(None), Some("b"));
    }

    #[test]
    fn update_does_not_reset_frequency() {
        let mut p: LfuPolicy<&str> = LfuPolicy::new();
        p.on_insert(&"a");
        p.on_access(&"a");
        p.on_update(&"a");
        assert_eq!(p.frequency(&"a"), Some(2));
    }

    #[test]
    fn excluded_key_moves_search_to_next_bucket() {
        let mut p: LfuPolicy<&str> = LfuPolicy::new();
        p.on_insert(&"a");
        p.on_insert(&"b");
        p.on_access(&"b");
        assert_eq!(p.evict(Some(&"a")), Some("b"));
        assert_eq!(p.evict(Some(&"a")), None);
        assert_eq!(p.iter().copied().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn iterates_by_ascending_frequency() {
        let mut p: LfuPolicy<&str> = LfuPolicy::new();
        p.on_insert(&"a");
        p.on_insert(&"b");
        p.on_insert(&"c");
        p.on_access(&"a");
        p.on_access(&"a");
        p.on_access(&"c");
        assert_eq!(p.iter().copied().collect::<Vec<_>>(), vec!["b", "c", "a"]);
    }

    #[test]
    fn remove_drops_empty_bucket() {
        let mut p: LfuPolicy<&str> = LfuPolicy::new();
        p.on_insert(&"a");
        p.on_access(&"a");
        p.on_remove(&"a");
        assert!(p.buckets.is_empty());
        assert_eq!(p.evict(None), None);
    }
}
