/*!
 * Buffered Blocking Byte Source
 *
 * Wraps anything `Read` (in practice a `TcpStream`) with a fixed-size
 * buffer and exposes it as a `ByteCursor` the RESP parser can drive
 * directly. Refills are amortized: a `peek()` only touches the socket
 * when the buffer is exhausted, and then performs exactly one blocking
 * `read()`.
 *
 * Capacity defaults to 1024 bytes, matching the original implementation
 * this crate's wire behavior is grounded on.
 */

use std::io::{self, Read};

use crate::protocol::ByteCursor;

const DEFAULT_CAPACITY: usize = 1024;

/// A lazy, buffered byte stream over a `Read` source.
pub struct ByteSource<R> {
    reader: R,
    buf: Vec<u8>,
    pos: usize,
    end: usize,
    eof: bool,
}

impl<R: Read> ByteSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buf: vec![0u8; capacity.max(1)],
            pos: 0,
            end: 0,
            eof: false,
        }
    }

    /// True once the underlying source has signaled EOF and every
    /// buffered byte has been consumed.
    pub fn at_eof(&self) -> bool {
        self.eof && self.pos >= self.end
    }

    fn refill(&mut self) -> io::Result<()> {
        if self.eof {
            return Ok(());
        }
        let n = self.reader.read(&mut self.buf)?;
        if n == 0 {
            self.eof = true;
        } else {
            self.pos = 0;
            self.end = n;
        }
        Ok(())
    }
}

impl<R: Read> ByteCursor for ByteSource<R> {
    fn peek(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.end {
            if self.eof {
                return Ok(None);
            }
            self.refill()?;
            if self.pos >= self.end {
                // refill() observed EOF (read returned 0).
                return Ok(None);
            }
        }
        Ok(Some(self.buf[self.pos]))
    }

    fn advance(&mut self) -> io::Result<()> {
        self.pos += 1;
        Ok(())
    }
}
