/*!
 * Incremental Framer
 *
 * Bridges a socket that delivers arbitrary byte chunks and a parser
 * that wants a complete `RespValue`. Bytes pushed in are either
 * immediately consumed by a parsed value or retained in the pending
 * buffer, never lost, regardless of how the input is chunked.
 */

use bytes::{Buf, BytesMut};

use crate::protocol::{ProtocolError, RespValue, SliceCursor};

/// Accumulates pushed bytes and yields complete `RespValue`s as soon as
/// enough input has arrived.
#[derive(Default)]
pub struct FrameQueue {
    buf: BytesMut,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Append `chunk` to the pending buffer.
    pub fn push_bytes(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Attempt to parse one value from the front of the pending buffer.
    ///
    /// - `Ok(Some(value))`: a complete value was parsed; its bytes are
    ///   removed from the buffer.
    /// - `Ok(None)`: the buffer holds no complete value yet (parse
    ///   failed with `Incomplete`); the buffer is left untouched.
    /// - `Err(_)`: the buffered bytes violate RESP2 grammar. The
    ///   connection is expected to be torn down; the buffer is left as
    ///   is since there's nothing left worth parsing from it.
    pub fn pop_value(&mut self) -> Result<Option<RespValue>, ProtocolError> {
        let mut cursor = SliceCursor::new(&self.buf);
        match RespValue::parse(&mut cursor) {
            Ok(value) => {
                let consumed = cursor.consumed();
                self.buf.advance(consumed);
                Ok(Some(value))
            }
            Err(ProtocolError::Incomplete) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Bytes not yet consumed by a parsed value.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}
