//! Time-to-live policy.
//!
//! Every key gets a deadline `expires_at = timer.now() + ttl` when it is
//! stored, refreshed when it is stored again (reads do not extend it).  A key
//! is expired once `expires_at <= now`.  Deadlines are indexed in a
//! `BTreeMap` keyed by `(expires_at, sequence)`, so the next key to expire is
//! found in O(log n) without scanning, and equal deadlines expire in the
//! order they were set.
//!
//! Among live keys, capacity eviction falls back to LRU order.

use std::collections::BTreeMap;
use std::hash::Hash;
use std::time::Duration;

use ahash::AHashMap;

use super::order::{OrderIter, OrderList};
use super::Policy;
use crate::timer::{MonotonicTimer, Timer};

type Deadline = (Duration, u64);

pub struct TtlPolicy<K, T = MonotonicTimer> {
    /// Recency order (stale first) among resident keys.
    order: OrderList<K>,
    deadlines: AHashMap<K, Deadline>,
    by_deadline: BTreeMap<Deadline, K>,
    next_seq: u64,
    ttl: Duration,
    timer: T,
}

impl<K: Hash + Eq + Clone> TtlPolicy<K, MonotonicTimer> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_timer(ttl, MonotonicTimer::new())
    }
}

impl<K: Hash + Eq + Clone, T: Timer> TtlPolicy<K, T> {
    pub fn with_timer(ttl: Duration, timer: T) -> Self {
        TtlPolicy {
            order: OrderList::new(),
            deadlines: AHashMap::new(),
            by_deadline: BTreeMap::new(),
            next_seq: 0,
            ttl,
            timer,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Current time according to this policy's timer.
    pub fn now(&self) -> Duration {
        self.timer.now()
    }

    /// Deadline of `key`, whether or not it has passed.
    pub fn expires_at(&self, key: &K) -> Option<Duration> {
        self.deadlines.get(key).map(|&(at, _)| at)
    }

    /// Forgets and returns the earliest-expiring key if its deadline is
    /// at or before `time`.
    pub fn pop_expired_at(&mut self, time: Duration) -> Option<K> {
        let (&deadline, _) = self.by_deadline.first_key_value()?;
        if deadline.0 > time {
            return None;
        }
        let (_, key) = self.by_deadline.pop_first()?;
        self.deadlines.remove(&key);
        self.order.remove(&key);
        Some(key)
    }

    fn schedule(&mut self, key: &K) {
        self.unschedule(key);
        let at = self.timer.now().checked_add(self.ttl).unwrap_or(Duration::MAX);
        let deadline = (at, self.next_seq);
        self.next_seq += 1;
        self.deadlines.insert(key.clone(), deadline);
        self.by_deadline.insert(deadline, key.clone());
    }

    fn unschedule(&mut self, key: &K) {
        if let Some(deadline) = self.deadlines.remove(key) {
            self.by_deadline.remove(&deadline);
        }
    }

    fn live_at(&self, key: &K, now: Duration) -> bool {
        self.deadlines.get(key).is_some_and(|&(at, _)| at > now)
    }
}

impl<K, T> Policy<K> for TtlPolicy<K, T>
where
    K: Hash + Eq + Clone + Send + 'static,
    T: Timer,
{
    type Iter<'a> = TtlIter<'a, K, T>;

    fn on_insert(&mut self, key: &K) {
        self.order.push_back(key.clone());
        self.schedule(key);
    }

    fn on_update(&mut self, key: &K) {
        self.order.move_to_back(key);
        self.schedule(key);
    }

    fn on_access(&mut self, key: &K) {
        self.order.move_to_back(key);
    }

    fn on_remove(&mut self, key: &K) {
        self.order.remove(key);
        self.unschedule(key);
    }

    fn evict(&mut self, exclude: Option<&K>) -> Option<K> {
        let victim = self.order.pop_front_except(exclude)?;
        self.unschedule(&victim);
        Some(victim)
    }

    fn iter(&self) -> TtlIter<'_, K, T> {
        TtlIter {
            keys: self.order.iter(),
            policy: self,
            now: self.timer.now(),
        }
    }

    fn clear(&mut self) {
        self.order.clear();
        self.deadlines.clear();
        self.by_deadline.clear();
    }

    fn is_live(&self, key: &K) -> bool {
        self.live_at(key, self.timer.now())
    }

    fn pop_expired(&mut self) -> Option<K> {
        self.pop_expired_at(self.timer.now())
    }

    fn expired(&self) -> Box<dyn Iterator<Item = &K> + '_> {
        let now = self.timer.now();
        Box::new(
            self.by_deadline
                .range(..=(now, u64::MAX))
                .map(|(_, key)| key),
        )
    }
}

/// Live keys, least recently used first.
pub struct TtlIter<'a, K, T> {
    keys: OrderIter<'a, K>,
    policy: &'a TtlPolicy<K, T>,
    now: Duration,
}

impl<'a, K: Hash + Eq + Clone, T: Timer> Iterator for TtlIter<'a, K, T> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let now = self.now;
        let policy = self.policy;
        self.keys.by_ref().find(|k| policy.live_at(k, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualTimer;

    fn policy(ttl_secs: u64) -> (TtlPolicy<&'static str, ManualTimer>, ManualTimer) {
        let timer = ManualTimer::new();
        (
            TtlPolicy::with_timer(Duration::from_secs(ttl_secs), timer.clone()),
            timer,
        )
    }

    #[test]
    fn key_expires_at_deadline() {
        let (mut p, timer) = policy(10);
        p.on_insert(&"a");
        assert_eq!(p.expires_at(&"a"), Some(Duration::from_secs(10)));
        timer.advance(Duration::from_secs(9));
        assert!(p.is_live(&"a"));
        assert_eq!(p.pop_expired(), None);
        timer.advance(Duration::from_secs(1));
        assert!(!p.is_live(&"a"));
        assert_eq!(p.expired().count(), 1);
        assert_eq!(p.pop_expired(), Some("a"));
        assert_eq!(p.iter().count(), 0);
    }

    #[test]
    fn update_refreshes_deadline_but_read_does_not() {
        let (mut p, timer) = policy(10);
        p.on_insert(&"a");
        timer.advance(Duration::from_secs(5));
        p.on_access(&"a");
        assert_eq!(p.expires_at(&"a"), Some(Duration::from_secs(10)));
        p.on_update(&"a");
        assert_eq!(p.expires_at(&"a"), Some(Duration::from_secs(15)));
        assert_eq!(p.by_deadline.len(), 1);
    }

    #[test]
    fn expiry_order_follows_deadlines() {
        let (mut p, timer) = policy(10);
        p.on_insert(&"a");
        timer.advance(Duration::from_secs(1));
        p.on_insert(&"b");
        p.on_update(&"a");
        timer.advance(Duration::from_secs(20));
        assert_eq!(p.pop_expired(), Some("b"));
        assert_eq!(p.pop_expired(), Some("a"));
        assert_eq!(p.pop_expired(), None);
    }

    #[test]
    fn explicit_time_purges_only_up_to_it() {
        let (mut p, timer) = policy(10);
        p.on_insert(&"a");
        timer.advance(Duration::from_secs(5));
        p.on_insert(&"b");
        assert_eq!(p.pop_expired_at(Duration::from_secs(12)), Some("a"));
        assert_eq!(p.pop_expired_at(Duration::from_secs(12)), None);
    }

    #[test]
    fn capacity_victim_is_least_recent_live_key() {
        let (mut p, _timer) = policy(10);
        p.on_insert(&"a");
        p.on_insert(&"b");
        p.on_access(&"a");
        assert_eq!(p.evict(None), Some("b"));
        assert_eq!(p.expires_at(&"b"), None);
    }

    #[test]
    fn huge_ttl_saturates() {
        let timer = ManualTimer::new();
        timer.advance(Duration::from_secs(1));
        let mut p: TtlPolicy<u8, _> = TtlPolicy::with_timer(Duration::MAX, timer);
        p.on_insert(&1);
        assert_eq!(p.expires_at(&1), Some(Duration::MAX));
        assert!(p.is_live(&1));
    }
}
