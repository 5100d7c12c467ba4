/*!
 * Server Entry Point
 *
 * Parses configuration, builds the configured store (hash table x
 * concurrency wrapper), and runs the accept loop. Thin glue by design:
 * it stays outside the codec/store/handler triad and exists only to
 * wire those components together.
 */

use anyhow::{bail, Result};
use clap::Parser;

use respkv::config::{ConcurrencyKind, Config, MapKind};
use respkv::net;
use respkv::shard::Shard;
use respkv::store::{ChainedMap, CoarseMap, LinearProbingMap, StripedMap};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    log::info!(
        "starting respkv-server: map={} concurrency={} capacity={} load_factor={}",
        config.map_kind,
        config.concurrency,
        config.initial_capacity,
        config.load_factor,
    );

    match (config.map_kind, config.concurrency) {
        (MapKind::LinearProbing, ConcurrencyKind::Coarse) => {
            let map = LinearProbingMap::with_capacity_and_load_factor(
                config.initial_capacity,
                config.load_factor,
            );
            net::serve(&config.bind_addr, Shard::new(CoarseMap::new(map)))
        }
        (MapKind::Chained, ConcurrencyKind::Coarse) => {
            let map = ChainedMap::with_capacity_and_load_factor(
                config.initial_capacity,
                config.load_factor,
            );
            net::serve(&config.bind_addr, Shard::new(CoarseMap::new(map)))
        }
        (MapKind::Chained, ConcurrencyKind::Striped) => {
            let map: StripedMap<Vec<u8>, Option<Vec<u8>>> = StripedMap::with_num_stripes(
                config.initial_capacity,
                config.load_factor,
                config.resolved_num_stripes(),
            );
            net::serve(&config.bind_addr, Shard::new(map))
        }
        (MapKind::LinearProbing, ConcurrencyKind::Striped) => {
            bail!(
                "striped concurrency is only implemented over the chained map \
                 (pass --map-kind chained, or --concurrency coarse)"
            );
        }
    }
}
