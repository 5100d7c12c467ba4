/*!
 * Command Dispatch
 *
 * Executes a classified `Cmd` against a shared store and produces the
 * `RespValue` to write back. One `Shard` is constructed at startup and
 * handed to every connection handler behind an `Arc`, it owns no
 * per-connection state, so dispatch never blocks on anything but the
 * store's own locking.
 */

use log::error;

use crate::command::Cmd;
use crate::protocol::RespValue;
use crate::store::ConcurrentMap;

/// Dispatches commands against a `ConcurrentMap<Vec<u8>, Option<Vec<u8>>>`.
/// The value is `Option<Vec<u8>>` rather than `Vec<u8>` so that a stored
/// null bulk string round-trips back out as a null bulk string, not an
/// empty one or a miss.
pub struct Shard<M> {
    store: M,
}

impl<M> Shard<M> {
    pub fn new(store: M) -> Self {
        Self { store }
    }
}

impl<M: ConcurrentMap<Vec<u8>, Option<Vec<u8>>>> Shard<M> {
    /// Execute one command, returning the response to serialize and
    /// write back.
    pub fn exec(&self, cmd: Cmd) -> RespValue {
        match cmd {
            Cmd::Get { key } => match self.store.lookup(&key) {
                Some(value) => RespValue::BulkString(value),
                None => RespValue::null_bulk(),
            },
            Cmd::Set { key, value } => {
                self.store.insert(key, value);
                RespValue::simple("OK")
            }
            Cmd::Del { key } => {
                self.store.remove(&key);
                RespValue::Integer(1)
            }
            Cmd::Unknown => {
                error!("unrecognized command");
                RespValue::error("ERR Unknown subcommand or command")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CoarseMap;
    use crate::store::LinearProbingMap;

    fn shard() -> Shard<CoarseMap<LinearProbingMap<Vec<u8>, Option<Vec<u8>>>>> {
        Shard::new(CoarseMap::new(LinearProbingMap::new()))
    }

    #[test]
    fn set_then_get_round_trips() {
        let s = shard();
        let resp = s.exec(Cmd::Set {
            key: b"foo".to_vec(),
            value: Some(b"bar".to_vec()),
        });
        assert_eq!(resp, RespValue::simple("OK"));

        let resp = s.exec(Cmd::Get {
            key: b"foo".to_vec(),
        });
        assert_eq!(resp, RespValue::bulk("bar"));
    }

    #[test]
    fn get_on_miss_is_null_bulk() {
        let s = shard();
        let resp = s.exec(Cmd::Get {
            key: b"missing".to_vec(),
        });
        assert_eq!(resp, RespValue::null_bulk());
    }

    #[test]
    fn set_of_null_value_round_trips_as_null_not_miss() {
        let s = shard();
        s.exec(Cmd::Set {
            key: b"k".to_vec(),
            value: None,
        });
        let resp = s.exec(Cmd::Get { key: b"k".to_vec() });
        assert_eq!(resp, RespValue::null_bulk());
    }

    #[test]
    fn del_always_reports_one_even_on_miss() {
        let s = shard();
        let resp = s.exec(Cmd::Del {
            key: b"never-set".to_vec(),
        });
        assert_eq!(resp, RespValue::Integer(1));
    }

    #[test]
    fn del_removes_the_key() {
        let s = shard();
        s.exec(Cmd::Set {
            key: b"k".to_vec(),
            value: Some(b"v".to_vec()),
        });
        s.exec(Cmd::Del { key: b"k".to_vec() });
        let resp = s.exec(Cmd::Get { key: b"k".to_vec() });
        assert_eq!(resp, RespValue::null_bulk());
    }

    #[test]
    fn unknown_command_returns_error_line() {
        let s = shard();
        let resp = s.exec(Cmd::Unknown);
        assert_eq!(resp, RespValue::error("ERR Unknown subcommand or command"));
    }
}
