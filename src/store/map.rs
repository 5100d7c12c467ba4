/*!
 * Map Abstraction
 *
 * `Map` is the polymorphic key/value interface every hand-written hash
 * table implements. It makes no threading promise, a type implementing
 * `Map` is assumed to have exactly one owner at a time. Sharing across
 * threads is the concurrency wrapper's job, captured by the separate
 * `ConcurrentMap` trait in this module: its methods take `&self` and
 * rely on interior mutability (a mutex) to make that safe.
 */

/// Single-owner key/value map. `insert` overwrites an existing key;
/// `remove` is idempotent (removing an absent key is not an error).
pub trait Map<K, V> {
    fn lookup(&self, key: &K) -> Option<V>;
    fn insert(&mut self, key: K, value: V);
    fn remove(&mut self, key: &K);
}

/// Thread-safe key/value map, implemented by the coarse-lock and
/// lock-striped wrappers. Every operation here is individually
/// linearizable against the map; nothing orders operations across
/// different keys beyond that.
pub trait ConcurrentMap<K, V> {
    fn lookup(&self, key: &K) -> Option<V>;
    fn insert(&self, key: K, value: V);
    fn remove(&self, key: &K);
}
