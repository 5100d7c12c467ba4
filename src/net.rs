/*!
 * Accept Loop
 *
 * One thread blocks in `accept()`; every accepted connection gets its
 * own spawned, detached thread running `conn::handle`. There is no
 * event loop and no worker pool: this is a blocking thread-per-connection
 * server, following the shape of `original_source/src/server.cpp`'s
 * accept loop (`std::thread(...).detach()` per connection) rather than
 * an evented reactor.
 *
 * `TCP_NODELAY` is set on every accepted stream: a key/value server's
 * responses are small and latency-sensitive, and Nagle's algorithm
 * would otherwise coalesce and delay them.
 */

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use log::{error, info};

use crate::conn;
use crate::shard::Shard;
use crate::store::ConcurrentMap;

/// Binds `addr` and serves connections until the process is killed.
/// Blocks forever; each connection's worker thread is detached (its
/// `JoinHandle` is dropped) since graceful shutdown is out of scope.
pub fn serve<M>(addr: &str, shard: Shard<M>) -> Result<()>
where
    M: ConcurrentMap<Vec<u8>, Option<Vec<u8>>> + Send + Sync + 'static,
{
    let listener = TcpListener::bind(addr).with_context(|| format!("binding {addr}"))?;
    info!("listening on {addr}");

    let shard = Arc::new(shard);
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                error!("accept failed: {e}");
                continue;
            }
        };
        if let Err(e) = configure_stream(&stream) {
            error!("failed to configure accepted stream: {e}");
            continue;
        }

        let shard = Arc::clone(&shard);
        thread::spawn(move || conn::handle(stream, &shard));
    }
    Ok(())
}

fn configure_stream(stream: &TcpStream) -> std::io::Result<()> {
    stream.set_nodelay(true)
}
