/*!
 * Coarse-Lock Concurrency Wrapper
 *
 * Composes any `Map` with a single `parking_lot::Mutex`: every
 * operation acquires it exclusively. Simple and correct; throughput is
 * bounded by serializing all access to the map regardless of which keys
 * are touched.
 */

use parking_lot::Mutex;

use super::map::{ConcurrentMap, Map};

pub struct CoarseMap<M> {
    inner: Mutex<M>,
}

impl<M> CoarseMap<M> {
    pub fn new(map: M) -> Self {
        Self {
            inner: Mutex::new(map),
        }
    }
}

impl<K, V, M: Map<K, V>> ConcurrentMap<K, V> for CoarseMap<M> {
    fn lookup(&self, key: &K) -> Option<V> {
        self.inner.lock().lookup(key)
    }

    fn insert(&self, key: K, value: V) {
        self.inner.lock().insert(key, value);
    }

    fn remove(&self, key: &K) {
        self.inner.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::linear_probing::LinearProbingMap;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn serializes_concurrent_inserts() {
        let map: Arc<CoarseMap<LinearProbingMap<i32, i32>>> =
            Arc::new(CoarseMap::new(LinearProbingMap::new()));
        let mut handles = Vec::new();
        for t in 0..8 {
            let map = Arc::clone(&map);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    map.insert(t * 100 + i, i);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        for t in 0..8 {
            for i in 0..100 {
                assert_eq!(map.lookup(&(t * 100 + i)), Some(i));
            }
        }
    }
}
