/*!
 * Linear-Probing Hash Table
 *
 * Open addressing over a fixed-size vector of entries, each in one of
 * three states: `Empty`, `Tombstone`, or `Occupied`. Tombstones keep
 * probe chains correct across removals but are reclaimed on insertion:
 * an insert that walks past a tombstone before finding an empty slot or
 * the key itself reuses that tombstone's slot rather than continuing
 * on to append after it.
 *
 * Load factor λ and initial capacity are both configurable; the hash
 * function is injected via a `BuildHasher`, matching the original's
 * `std::function<size_t(const K&)>` parameter.
 */

use std::hash::{BuildHasher, Hash};

use ahash::RandomState as AHashState;

use super::map::Map;

const DEFAULT_CAPACITY: usize = 16;
const DEFAULT_LOAD_FACTOR: f64 = 0.75;

enum Entry<K, V> {
    Empty,
    Tombstone,
    Occupied(K, V),
}

/// An open-addressed hash table with linear probing and tombstone
/// reclamation, generic over an injectable `BuildHasher` (defaults to
/// `ahash`).
pub struct LinearProbingMap<K, V, S = AHashState> {
    entries: Vec<Entry<K, V>>,
    size: usize,
    load_factor: f64,
    hash_builder: S,
}

impl<K: Hash + Eq, V> LinearProbingMap<K, V, AHashState> {
    pub fn new() -> Self {
        Self::with_capacity_and_load_factor(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f64) -> Self {
        Self::with_hasher(capacity, load_factor, AHashState::new())
    }
}

impl<K: Hash + Eq, V> Default for LinearProbingMap<K, V, AHashState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LinearProbingMap<K, V, S> {
    pub fn with_hasher(capacity: usize, load_factor: f64, hash_builder: S) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: (0..capacity).map(|_| Entry::Empty).collect(),
            size: 0,
            load_factor,
            hash_builder,
        }
    }

    /// Number of live (occupied) entries.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn bucket_of(&self, key: &K) -> usize {
        (self.hash_builder.hash_one(key) as usize) % self.entries.len()
    }

    /// Locates the occupied slot for `key`, if any. Stops at the first
    /// `Empty` slot (a miss) or after one full loop around the table.
    fn find_occupied(&self, key: &K) -> Option<usize> {
        let start = self.bucket_of(key);
        let cap = self.entries.len();
        let mut idx = start;
        loop {
            match &self.entries[idx] {
                Entry::Empty => return None,
                Entry::Tombstone => {}
                Entry::Occupied(k, _) if k == key => return Some(idx),
                Entry::Occupied(_, _) => {}
            }
            idx = (idx + 1) % cap;
            if idx == start {
                return None;
            }
        }
    }

    /// Finds the slot an insert of `key` should land in: the first slot
    /// that is not Occupied-with-a-different-key. Prefers a tombstone
    /// encountered along the way over continuing to probe for an empty
    /// slot further on, so tombstones don't accumulate past what's
    /// strictly necessary between resizes.
    fn find_insert_slot(&self, key: &K) -> usize {
        let start = self.bucket_of(key);
        let cap = self.entries.len();
        let mut idx = start;
        let mut reusable_tombstone = None;
        loop {
            match &self.entries[idx] {
                Entry::Empty => return reusable_tombstone.unwrap_or(idx),
                Entry::Tombstone => {
                    if reusable_tombstone.is_none() {
                        reusable_tombstone = Some(idx);
                    }
                }
                Entry::Occupied(k, _) if k == key => return idx,
                Entry::Occupied(_, _) => {}
            }
            idx = (idx + 1) % cap;
            if idx == start {
                return reusable_tombstone.unwrap_or(idx);
            }
        }
    }

    fn insert_without_resize(&mut self, key: K, value: V) {
        let idx = self.find_insert_slot(&key);
        let is_new = !matches!(&self.entries[idx], Entry::Occupied(k, _) if *k == key);
        self.entries[idx] = Entry::Occupied(key, value);
        if is_new {
            self.size += 1;
        }
    }

    fn resize(&mut self) {
        let new_capacity = (self.entries.len() * 2).max(2);
        let old = std::mem::replace(
            &mut self.entries,
            (0..new_capacity).map(|_| Entry::Empty).collect(),
        );
        self.size = 0;
        for entry in old {
            if let Entry::Occupied(k, v) = entry {
                self.insert_without_resize(k, v);
            }
        }
    }
}

impl<K: Hash + Eq, V: Clone, S: BuildHasher> Map<K, V> for LinearProbingMap<K, V, S> {
    fn lookup(&self, key: &K) -> Option<V> {
        self.find_occupied(key).map(|idx| match &self.entries[idx] {
            Entry::Occupied(_, v) => v.clone(),
            _ => unreachable!("find_occupied only returns Occupied indices"),
        })
    }

    fn insert(&mut self, key: K, value: V) {
        if self.size as f64 > self.load_factor * self.entries.len() as f64 {
            self.resize();
        }
        self.insert_without_resize(key, value);
    }

    fn remove(&mut self, key: &K) {
        if let Some(idx) = self.find_occupied(key) {
            self.entries[idx] = Entry::Tombstone;
        }
    }
}
