use std::hash::Hash;

use ahash::RandomState;
use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Policy;

/// The set of keys a [`Chooser`] may pick from.
///
/// Positions are dense (`0..len()`) and stable for the duration of one
/// choice.  A key excluded from eviction is simply not part of the view.
pub struct Candidates<'a, K> {
    keys: &'a IndexSet<K, RandomState>,
    /// Position of the excluded key, if it is resident.
    hidden: Option<usize>,
}

impl<'a, K: Hash + Eq> Candidates<'a, K> {
    fn new(keys: &'a IndexSet<K, RandomState>, exclude: Option<&K>) -> Self {
        let hidden = exclude.and_then(|k| keys.get_index_of(k));
        Candidates { keys, hidden }
    }

    pub fn len(&self) -> usize {
        self.keys.len() - usize::from(self.hidden.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The candidate at position `index`.
    pub fn get(&self, index: usize) -> Option<&'a K> {
        if index >= self.len() {
            return None;
        }
        match self.hidden {
            // The last key stands in for the hidden slot.
            Some(h) if h == index => self.keys.get_index(self.keys.len() - 1),
            _ => self.keys.get_index(index),
        }
    }

    /// Position of `key` among the candidates.
    pub fn position(&self, key: &K) -> Option<usize> {
        let pos = self.keys.get_index_of(key)?;
        match self.hidden {
            Some(h) if h == pos => None,
            Some(h) if pos == self.keys.len() - 1 => Some(h),
            _ => Some(pos),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a K> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// Picks the position of the next victim among the candidates.
///
/// Called only with a non-empty candidate set.  Out-of-range answers are
/// wrapped into range.
pub trait Chooser<K>: Send {
    fn choose(&mut self, candidates: &Candidates<'_, K>) -> usize;
}

/// Uniform choice from a seedable RNG.  The default chooser.
pub struct RandomChooser {
    rng: StdRng,
}

impl RandomChooser {
    pub fn new() -> Self {
        RandomChooser {
            rng: StdRng::from_entropy(),
        }
    }

    /// A reproducible sequence of choices.
    pub fn seeded(seed: u64) -> Self {
        RandomChooser {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Chooser<K> for RandomChooser {
    fn choose(&mut self, candidates: &Candidates<'_, K>) -> usize {
        let len = candidates.keys.len() - usize::from(candidates.hidden.is_some());
        self.rng.gen_range(0..len.max(1))
    }
}

/// A chooser backed by a closure.
///
/// ```
/// use boundcache::policy::random::{Candidates, FnChooser};
///
/// // Always evict "b" when it is a candidate.
/// let _chooser = FnChooser(|c: &Candidates<'_, &str>| c.position(&"b").unwrap_or(0));
/// ```
pub struct FnChooser<F>(pub F);

impl<K, F> Chooser<K> for FnChooser<F>
where
    F: FnMut(&Candidates<'_, K>) -> usize + Send,
{
    fn choose(&mut self, candidates: &Candidates<'_, K>) -> usize {
        (self.0)(candidates)
    }
}

/// Random replacement: the victim is drawn from the resident keys by a
/// [`Chooser`].  No ordering metadata is kept beyond the key set, which
/// supports O(1) draws by position and O(1) swap-removal.
pub struct RrPolicy<K> {
    keys: IndexSet<K, RandomState>,
    chooser: Box<dyn Chooser<K>>,
}

impl<K: Hash + Eq + Clone + 'static> RrPolicy<K> {
    pub fn new() -> Self {
        Self::with_chooser(RandomChooser::new())
    }

    pub fn with_chooser<C: Chooser<K> + 'static>(chooser: C) -> Self {
        RrPolicy {
            keys: IndexSet::with_hasher(RandomState::new()),
            chooser: Box::new(chooser),
        }
    }
}

impl<K: Hash + Eq + Clone + 'static> Default for RrPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone + Send + 'static> Policy<K> for RrPolicy<K> {
    type Iter<'a> = indexmap::set::Iter<'a, K>;

    fn on_insert(&mut self, key: &K) {
        self.keys.insert(key.clone());
    }

    fn on_update(&mut self, _key: &K) {}

    fn on_access(&mut self, _key: &K) {}

    fn on_remove(&mut self, key: &K) {
        self.keys.swap_remove(key);
    }

    fn evict(&mut self, exclude: Option<&K>) -> Option<K> {
        let victim = {
            let candidates = Candidates::new(&self.keys, exclude);
            if candidates.is_empty() {
                return None;
            }
            let pick = self.chooser.choose(&candidates) % candidates.len();
            candidates.get(pick)?.clone()
        };
        self.keys.swap_remove(&victim);
        Some(victim)
    }

    fn iter(&self) -> indexmap::set::Iter<'_, K> {
        self.keys.iter()
    }

    fn clear(&mut self) {
        self.keys.clear();
    }
}
