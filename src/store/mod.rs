/*!
 * Storage Layer
 *
 * The hand-rolled hash tables and their concurrency wrappers, plus the
 * `Map`/`ConcurrentMap` traits that tie them together. `shard` builds on
 * top of whichever `ConcurrentMap` the running configuration selected.
 */

pub mod chained;
pub mod coarse;
pub mod linear_probing;
pub mod map;
pub mod standard;
pub mod striped;

pub use chained::ChainedMap;
pub use coarse::CoarseMap;
pub use linear_probing::LinearProbingMap;
pub use map::{ConcurrentMap, Map};
pub use standard::StandardMap;
pub use striped::StripedMap;
