/*!
 * Reference Map
 *
 * A thin `Map` adapter over `hashbrown::HashMap`. Not part of the
 * production dispatch path, it exists purely as the oracle the
 * property tests in `tests/properties.rs` check the hand-written
 * `LinearProbingMap`/`ChainedMap` against.
 */

use std::hash::Hash;

use hashbrown::HashMap;

use super::map::Map;

#[derive(Default)]
pub struct StandardMap<K, V> {
    inner: HashMap<K, V>,
}

impl<K: Hash + Eq, V> StandardMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq, V: Clone> Map<K, V> for StandardMap<K, V> {
    fn lookup(&self, key: &K) -> Option<V> {
        self.inner.get(key).cloned()
    }

    fn insert(&mut self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    fn remove(&mut self, key: &K) {
        self.inner.remove(key);
    }
}
