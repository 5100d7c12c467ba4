/*!
 * Separate-Chaining Hash Table
 *
 * A vector of bucket heads, each a singly linked list of `{key, value}`
 * nodes. Lookup walks the list; insert updates a matching node in place
 * or appends a new one; remove unlinks the matching node. Resizes when
 * `size > λ · capacity`, rehashing every live entry into a table of at
 * least `2 · size` buckets.
 */

use std::hash::{BuildHasher, Hash};

use ahash::RandomState as AHashState;

use super::map::Map;

const DEFAULT_CAPACITY: usize = 16;
const DEFAULT_LOAD_FACTOR: f64 = 0.75;

struct Node<K, V> {
    key: K,
    value: V,
    next: Option<Box<Node<K, V>>>,
}

/// A separate-chaining hash table, generic over an injectable
/// `BuildHasher`.
pub struct ChainedMap<K, V, S = AHashState> {
    buckets: Vec<Option<Box<Node<K, V>>>>,
    size: usize,
    load_factor: f64,
    hash_builder: S,
}

impl<K: Hash + Eq, V> ChainedMap<K, V, AHashState> {
    pub fn new() -> Self {
        Self::with_capacity_and_load_factor(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR)
    }

    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f64) -> Self {
        Self::with_hasher(capacity, load_factor, AHashState::new())
    }
}

impl<K: Hash + Eq, V> Default for ChainedMap<K, V, AHashState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> ChainedMap<K, V, S> {
    pub fn with_hasher(capacity: usize, load_factor: f64, hash_builder: S) -> Self {
        let capacity = capacity.max(1);
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, || None);
        Self {
            buckets,
            size: 0,
            load_factor,
            hash_builder,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn bucket_index(&self, key: &K) -> usize {
        (self.hash_builder.hash_one(key) as usize) % self.buckets.len()
    }

    fn insert_without_resize(&mut self, key: K, value: V) {
        let idx = self.bucket_index(&key);
        let mut slot = &mut self.buckets[idx];
        loop {
            match slot {
                None => {
                    *slot = Some(Box::new(Node {
                        key,
                        value,
                        next: None,
                    }));
                    self.size += 1;
                    return;
                }
                Some(node) if node.key == key => {
                    node.value = value;
                    return;
                }
                Some(node) => {
                    slot = &mut node.next;
                }
            }
        }
    }

    fn resize(&mut self) {
        let new_capacity = (self.size * 2).max(2);
        let old_buckets = std::mem::take(&mut self.buckets);
        self.buckets = Vec::with_capacity(new_capacity);
        self.buckets.resize_with(new_capacity, || None);
        self.size = 0;
        for head in old_buckets {
            let mut cur = head;
            while let Some(node) = cur {
                cur = node.next;
                self.insert_without_resize(node.key, node.value);
            }
        }
    }
}

impl<K: Hash + Eq, V: Clone, S: BuildHasher> Map<K, V> for ChainedMap<K, V, S> {
    fn lookup(&self, key: &K) -> Option<V> {
        let idx = self.bucket_index(key);
        let mut cur = self.buckets[idx].as_deref();
        while let Some(node) = cur {
            if node.key == *key {
                return Some(node.value.clone());
            }
            cur = node.next.as_deref();
        }
        None
    }

    fn insert(&mut self, key: K, value: V) {
        if self.size as f64 > self.load_factor * self.buckets.len() as f64 {
            self.resize();
        }
        self.insert_without_resize(key, value);
    }

    fn remove(&mut self, key: &K) {
        let idx = self.bucket_index(key);
        let slot = &mut self.buckets[idx];
        match slot {
            None => {}
            Some(node) if node.key == *key => {
                *slot = node.next.take();
                self.size -= 1;
            }
            Some(node) => {
                let mut cur = node;
                loop {
                    let matches_next = matches!(&cur.next, Some(n) if n.key == *key);
                    if matches_next {
                        let removed = cur.next.take().unwrap();
                        cur.next = removed.next;
                        self.size -= 1;
                        return;
                    }
                    match &mut cur.next {
                        Some(next) => cur = next,
                        None => return,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup_remove_round_trip() {
        let mut m: ChainedMap<String, i32> = ChainedMap::new();
        m.insert("a".to_string(), 1);
        m.insert("b".to_string(), 2);
        assert_eq!(m.lookup(&"a".to_string()), Some(1));
        assert_eq!(m.lookup(&"b".to_string()), Some(2));
        m.remove(&"a".to_string());
        assert_eq!(m.lookup(&"a".to_string()), None);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn overwrite_updates_in_place_without_growing_size() {
        let mut m: ChainedMap<i32, i32> = ChainedMap::new();
        m.insert(1, 10);
        m.insert(1, 20);
        assert_eq!(m.len(), 1);
        assert_eq!(m.lookup(&1), Some(20));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut m: ChainedMap<i32, i32> = ChainedMap::new();
        m.remove(&1);
        m.insert(1, 1);
        m.remove(&1);
        m.remove(&1);
        assert_eq!(m.lookup(&1), None);
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn collisions_chain_within_one_bucket() {
        let mut m: ChainedMap<i32, i32> = ChainedMap::with_capacity_and_load_factor(1, 1000.0);
        for i in 0..20 {
            m.insert(i, i * 2);
        }
        for i in 0..20 {
            assert_eq!(m.lookup(&i), Some(i * 2));
        }
    }

    #[test]
    fn resize_preserves_all_live_entries() {
        let mut m: ChainedMap<i32, i32> = ChainedMap::with_capacity_and_load_factor(4, 0.5);
        for i in 0..200 {
            m.insert(i, i + 1);
        }
        for i in 0..200 {
            assert_eq!(m.lookup(&i), Some(i + 1));
        }
    }
}
