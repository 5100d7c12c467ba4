/*!
 * Lock-Striped Chained Map
 *
 * A fixed-size array of recursive mutexes partitions the key space
 * independently of the bucket array, resizing changes the bucket count
 * without touching the lock count. An ordinary operation acquires only
 * the one stripe its key hashes into (`hash(key) % num_locks`), while a
 * resize is privileged: it acquires every stripe, in ascending index
 * order, before rehashing, so it can never run concurrently with any
 * other operation.
 *
 * The lock is a `parking_lot::ReentrantMutex` (the direct analogue of
 * `std::recursive_mutex`), which is what lets `insert` call `resize`
 * while still holding its own stripe: resize re-acquires that same
 * stripe from the same thread, which a plain mutex would deadlock on.
 * Readers and writers share the same lock set, this is a mutex scheme,
 * not a reader-writer scheme.
 */

use std::cell::UnsafeCell;
use std::hash::{BuildHasher, Hash};

use ahash::RandomState as AHashState;
use parking_lot::ReentrantMutex;

use super::map::ConcurrentMap;

const DEFAULT_CAPACITY: usize = 16;
const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Bucket count is kept a multiple of the stripe count at all times (on
/// construction and after every resize). `lock_index` and `bucket_index`
/// hash the same key independently (`% num_stripes` vs. `% capacity`);
/// without this invariant two keys could pick different stripes yet
/// collide on the same bucket slot, letting two threads mutate the same
/// `UnsafeCell`-guarded list node concurrently.
fn round_up_to_multiple(n: usize, multiple: usize) -> usize {
    n.div_ceil(multiple) * multiple
}

struct Node<K, V> {
    key: K,
    value: V,
    next: Option<Box<Node<K, V>>>,
}

/// The bucket array and live-entry count live behind `UnsafeCell`
/// rather than individual per-stripe mutexes: the stripes partition
/// *access*, not the data itself. Every access happens while holding at
/// least one stripe lock (an ordinary op holds its own, a resize holds
/// all of them), and capacity is kept a multiple of the stripe count
/// (see `round_up_to_multiple`) so any two keys sharing a bucket slot
/// also share a stripe. Together these two invariants are what make the
/// unsafe cells here sound: no two threads ever touch the same slot
/// without holding the same lock.
pub struct StripedMap<K, V, S = AHashState> {
    hash_builder: S,
    load_factor: f64,
    buckets: UnsafeCell<Vec<Option<Box<Node<K, V>>>>>,
    size: UnsafeCell<usize>,
    locks: Vec<ReentrantMutex<()>>,
}

unsafe impl<K: Send, V: Send, S: Send> Send for StripedMap<K, V, S> {}
// `buckets`/`size` sit behind `UnsafeCell`, guarded at every access site
// by a stripe lock (or all of them during resize), so sharing those only
// needs `K`/`V`: `Send`. `hash_builder` is a plain field read directly off
// `&self` in `lock_index`/`bucket_index` with no lock held, so sharing it
// across threads needs `S: Sync`, same as any other unwrapped field.
unsafe impl<K: Send, V: Send, S: Sync> Sync for StripedMap<K, V, S> {}

impl<K: Hash + Eq, V> StripedMap<K, V, AHashState> {
    pub fn new() -> Self {
        Self::with_num_stripes(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, num_cpus_fallback())
    }

    pub fn with_num_stripes(capacity: usize, load_factor: f64, num_stripes: usize) -> Self {
        Self::with_hasher(capacity, load_factor, num_stripes, AHashState::new())
    }
}

impl<K: Hash + Eq, V> Default for StripedMap<K, V, AHashState> {
    fn default() -> Self {
        Self::new()
    }
}

fn num_cpus_fallback() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl<K: Hash + Eq, V, S: BuildHasher> StripedMap<K, V, S> {
    pub fn with_hasher(capacity: usize, load_factor: f64, num_stripes: usize, hash_builder: S) -> Self {
        let num_stripes = num_stripes.max(1);
        let capacity = round_up_to_multiple(capacity.max(1), num_stripes);
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, || None);
        Self {
            hash_builder,
            load_factor,
            buckets: UnsafeCell::new(buckets),
            size: UnsafeCell::new(0),
            locks: (0..num_stripes).map(|_| ReentrantMutex::new(())).collect(),
        }
    }

    fn lock_index(&self, key: &K) -> usize {
        (self.hash_builder.hash_one(key) as usize) % self.locks.len()
    }

    /// SAFETY: caller must hold the stripe lock for `key` (or all
    /// stripes, during resize) for the duration of the returned
    /// reference's use.
    unsafe fn bucket_index(&self, key: &K) -> usize {
        let cap = (*self.buckets.get()).len();
        (self.hash_builder.hash_one(key) as usize) % cap
    }

    /// Caller must hold the relevant stripe lock(s).
    unsafe fn insert_without_resize(&self, key: K, value: V) {
        let idx = self.bucket_index(&key);
        let buckets = &mut *self.buckets.get();
        let mut slot = &mut buckets[idx];
        loop {
            match slot {
                None => {
                    *slot = Some(Box::new(Node {
                        key,
                        value,
                        next: None,
                    }));
                    *self.size.get() += 1;
                    return;
                }
                Some(node) if node.key == key => {
                    node.value = value;
                    return;
                }
                Some(node) => slot = &mut node.next,
            }
        }
    }

    /// Must be called while holding every stripe lock.
    unsafe fn resize(&self) {
        let new_capacity = round_up_to_multiple(((*self.size.get()) * 2).max(2), self.locks.len());
        let mut replacement = Vec::with_capacity(new_capacity);
        replacement.resize_with(new_capacity, || None);
        let old = std::mem::replace(&mut *self.buckets.get(), replacement);
        *self.size.get() = 0;
        for head in old {
            let mut cur = head;
            while let Some(node) = cur {
                cur = node.next;
                self.insert_without_resize(node.key, node.value);
            }
        }
    }

    fn lock_all(&self) -> Vec<parking_lot::ReentrantMutexGuard<'_, ()>> {
        self.locks.iter().map(|l| l.lock()).collect()
    }
}

impl<K: Hash + Eq, V: Clone, S: BuildHasher> ConcurrentMap<K, V> for StripedMap<K, V, S> {
    fn lookup(&self, key: &K) -> Option<V> {
        let _guard = self.locks[self.lock_index(key)].lock();
        unsafe {
            let idx = self.bucket_index(key);
            let mut cur = (*self.buckets.get())[idx].as_deref();
            while let Some(node) = cur {
                if node.key == *key {
                    return Some(node.value.clone());
                }
                cur = node.next.as_deref();
            }
            None
        }
    }

    fn insert(&self, key: K, value: V) {
        let _guard = self.locks[self.lock_index(&key)].lock();
        unsafe {
            let cap = (*self.buckets.get()).len();
            let size = *self.size.get();
            if size as f64 > self.load_factor * cap as f64 {
                // Reentrant: this re-locks our own stripe (no-op, same
                // thread) plus every other stripe, guaranteeing no
                // concurrent operation can be mid-flight during rehash.
                let _all = self.lock_all();
                self.resize();
            }
            self.insert_without_resize(key, value);
        }
    }

    fn remove(&self, key: &K) {
        let _guard = self.locks[self.lock_index(key)].lock();
        unsafe {
            let idx = self.bucket_index(key);
            let buckets = &mut *self.buckets.get();
            match &mut buckets[idx] {
                None => {}
                Some(node) if node.key == *key => {
                    buckets[idx] = node.next.take();
                    *self.size.get() -= 1;
                }
                Some(node) => {
                    let mut cur = node;
                    loop {
                        let hit = matches!(&cur.next, Some(n) if n.key == *key);
                        if hit {
                            let removed = cur.next.take().unwrap();
                            cur.next = removed.next;
                            *self.size.get() -= 1;
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn single_threaded_insert_lookup_remove() {
        let m: StripedMap<i32, i32> = StripedMap::with_num_stripes(4, 0.75, 4);
        m.insert(1, 10);
        m.insert(2, 20);
        assert_eq!(m.lookup(&1), Some(10));
        assert_eq!(m.lookup(&2), Some(20));
        m.remove(&1);
        assert_eq!(m.lookup(&1), None);
    }

    #[test]
    fn capacity_is_always_rounded_up_to_a_multiple_of_stripe_count() {
        // 5 and 7 share no common factor: if bucket count and stripe
        // count were allowed to drift independently, two keys landing
        // in the same bucket could pick different stripes.
        let m: StripedMap<i32, i32> = StripedMap::with_num_stripes(5, 0.75, 7);
        unsafe {
            assert_eq!((*m.buckets.get()).len() % m.locks.len(), 0);
        }
        for i in 0..50 {
            m.insert(i, i);
        }
        unsafe {
            assert_eq!((*m.buckets.get()).len() % m.locks.len(), 0);
        }
        for i in 0..50 {
            assert_eq!(m.lookup(&i), Some(i));
        }
    }

    #[test]
    fn resize_triggered_by_load_factor_preserves_entries() {
        let m: StripedMap<i32, i32> = StripedMap::with_num_stripes(4, 0.5, 2);
        for i in 0..200 {
            m.insert(i, i * 3);
        }
        for i in 0..200 {
            assert_eq!(m.lookup(&i), Some(i * 3));
        }
    }

    #[test]
    fn concurrent_mixed_ops_match_a_sequential_replay() {
        let m: Arc<StripedMap<i32, i32>> = Arc::new(StripedMap::with_num_stripes(8, 0.75, 4));
        let n_threads = 6;
        let ops_per_thread = 500;

        let mut handles = Vec::new();
        for t in 0..n_threads {
            let m = Arc::clone(&m);
            handles.push(thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let key = (t * ops_per_thread + i) % 50;
                    match i % 3 {
                        0 => m.insert(key, t * 1000 + i),
                        1 => {
                            m.lookup(&key);
                        }
                        _ => m.remove(&key),
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        // Every key that's present must be reachable and consistent;
        // no torn or duplicated state.
        let mut seen = HashSet::new();
        for k in 0..50 {
            if let Some(v) = m.lookup(&k) {
                assert!(seen.insert(k));
                let _ = v;
            }
        }
    }
}
