/*!
 * Server Configuration
 *
 * Everything needed to stand up a `Shard` and bind it to a socket,
 * parsed from the command line via `clap`. None of this is read by the
 * core triad (codec, store, handler) directly, `bin/respkv.rs` reads a
 * `Config` once at startup and builds the concrete store type it
 * selects.
 */

use clap::{Parser, ValueEnum};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:6379";
const DEFAULT_INITIAL_CAPACITY: usize = 16;
const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Which hand-written hash table backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MapKind {
    LinearProbing,
    Chained,
}

/// Which concurrency wrapper guards the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConcurrencyKind {
    Coarse,
    Striped,
}

/// Command-line configuration for the server binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "respkv-server", about = "A minimal RESP2 key/value server")]
pub struct Config {
    /// Address to bind and listen on.
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    pub bind_addr: String,

    /// Hash table implementation backing the store.
    #[arg(long, value_enum, default_value_t = MapKind::Chained)]
    pub map_kind: MapKind,

    /// Concurrency strategy guarding the store.
    #[arg(long, value_enum, default_value_t = ConcurrencyKind::Striped)]
    pub concurrency: ConcurrencyKind,

    /// Initial bucket count for the store's hash table.
    #[arg(long, default_value_t = DEFAULT_INITIAL_CAPACITY)]
    pub initial_capacity: usize,

    /// Resize threshold, as live entries over bucket count.
    #[arg(long, default_value_t = DEFAULT_LOAD_FACTOR)]
    pub load_factor: f64,

    /// Number of lock stripes, when `concurrency` is `striped`. Defaults
    /// to the number of available CPUs.
    #[arg(long)]
    pub num_stripes: Option<usize>,
}

impl Config {
    pub fn resolved_num_stripes(&self) -> usize {
        self.num_stripes.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

impl Default for MapKind {
    fn default() -> Self {
        MapKind::Chained
    }
}

impl Default for ConcurrencyKind {
    fn default() -> Self {
        ConcurrencyKind::Striped
    }
}

impl std::fmt::Display for MapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapKind::LinearProbing => write!(f, "linear-probing"),
            MapKind::Chained => write!(f, "chained"),
        }
    }
}

impl std::fmt::Display for ConcurrencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConcurrencyKind::Coarse => write!(f, "coarse"),
            ConcurrencyKind::Striped => write!(f, "striped"),
        }
    }
}
