/*!
 * RESP2 Protocol Implementation
 *
 * This module implements the RESP (REdis Serialization Protocol) value
 * model: a tagged union of the five RESP2 kinds, an incremental parser
 * generic over any peekable byte cursor, and a total serializer.
 *
 * The parser never looks at more than one value's worth of input and
 * never buffers on its own, that's the frame queue's job (see
 * `crate::frame`). It only needs a source it can peek one byte from and
 * advance past, so the exact same code parses a live socket (through
 * `crate::byte_source::ByteSource`) or an in-memory test buffer (through
 * `SliceCursor` below).
 */

use std::io;

use thiserror::Error;

/// Errors produced while parsing a RESP value.
///
/// `Incomplete` and `Malformed` are distinct variants, not distinguished
/// by string content, so callers (the frame queue in particular) can
/// match on the kind directly instead of inspecting an error message.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Ran out of input partway through a value. Not a protocol
    /// violation, the caller should retry once more bytes arrive.
    #[error("incomplete RESP value")]
    Incomplete,

    /// The input violates RESP2 grammar. Fatal to the connection.
    #[error("malformed RESP value: {0}")]
    Malformed(String),

    /// The underlying byte source failed (socket error, not a grammar
    /// problem).
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

/// A source of bytes the parser can peek one byte at a time from and
/// advance past. Implemented by `crate::byte_source::ByteSource` (a
/// blocking socket source) and `SliceCursor` (an in-memory source used
/// by the frame queue and by tests).
pub trait ByteCursor {
    /// Look at the next byte without consuming it. `Ok(None)` means the
    /// source is exhausted (EOF for a socket, end-of-buffer for a
    /// slice).
    fn peek(&mut self) -> io::Result<Option<u8>>;

    /// Consume the byte most recently returned by `peek`.
    fn advance(&mut self) -> io::Result<()>;

    /// Consume and return the next byte, failing with `Incomplete` if
    /// none is available.
    fn next_byte(&mut self) -> Result<u8, ProtocolError> {
        match self.peek()? {
            Some(b) => {
                self.advance()?;
                Ok(b)
            }
            None => Err(ProtocolError::Incomplete),
        }
    }
}

/// A `ByteCursor` over an in-memory byte slice. Used by the frame queue
/// to attempt a parse against its pending buffer, and directly by tests
/// that don't need a live socket.
pub struct SliceCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SliceCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl<'a> ByteCursor for SliceCursor<'a> {
    fn peek(&mut self) -> io::Result<Option<u8>> {
        Ok(self.buf.get(self.pos).copied())
    }

    fn advance(&mut self) -> io::Result<()> {
        self.pos += 1;
        Ok(())
    }
}

/// A RESP2 value: one of five kinds, per the protocol spec.
///
/// `BulkString(None)` is the RESP2 "null bulk string" (`$-1\r\n`), used
/// both for cache misses and for values explicitly stored as null.
/// `Array` may be empty and may nest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    SimpleString(Vec<u8>),
    SimpleError(Vec<u8>),
    Integer(i64),
    BulkString(Option<Vec<u8>>),
    Array(Vec<RespValue>),
}

impl RespValue {
    /// Convenience constructor for `+OK\r\n`-style responses.
    pub fn simple(s: impl Into<Vec<u8>>) -> Self {
        RespValue::SimpleString(s.into())
    }

    /// Convenience constructor for `-ERR ...\r\n`-style responses.
    pub fn error(msg: impl Into<Vec<u8>>) -> Self {
        RespValue::SimpleError(msg.into())
    }

    /// The null bulk string, `$-1\r\n`.
    pub fn null_bulk() -> Self {
        RespValue::BulkString(None)
    }

    /// A present bulk string.
    pub fn bulk(b: impl Into<Vec<u8>>) -> Self {
        RespValue::BulkString(Some(b.into()))
    }

    /// Parse a single RESP value from `cursor`, advancing it past the
    /// last consumed byte. Leaves the cursor's position unspecified on
    /// failure (the caller is expected to discard it, a `SliceCursor`
    /// from the frame queue, which only commits on success).
    pub fn parse(cursor: &mut impl ByteCursor) -> Result<RespValue, ProtocolError> {
        let type_byte = cursor.next_byte()?;
        match type_byte {
            b'+' => Ok(RespValue::SimpleString(read_line(cursor)?)),
            b'-' => Ok(RespValue::SimpleError(read_line(cursor)?)),
            b':' => Ok(RespValue::Integer(parse_integer(cursor)?)),
            b'$' => parse_bulk_string(cursor),
            b'*' => parse_array(cursor),
            other => Err(ProtocolError::Malformed(format!(
                "unrecognized type byte {:?}",
                other as char
            ))),
        }
    }

    /// Serialize this value to its bit-exact RESP2 wire form. Total:
    /// every `RespValue` that can be constructed serializes without
    /// error.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.serialize_into(&mut out);
        out
    }

    fn serialize_into(&self, out: &mut Vec<u8>) {
        match self {
            RespValue::SimpleString(s) => {
                out.push(b'+');
                out.extend_from_slice(s);
                out.extend_from_slice(b"\r\n");
            }
            RespValue::SimpleError(m) => {
                out.push(b'-');
                out.extend_from_slice(m);
                out.extend_from_slice(b"\r\n");
            }
            RespValue::Integer(n) => {
                out.push(b':');
                out.extend_from_slice(n.to_string().as_bytes());
                out.extend_from_slice(b"\r\n");
            }
            RespValue::BulkString(None) => {
                out.extend_from_slice(b"$-1\r\n");
            }
            RespValue::BulkString(Some(b)) => {
                out.push(b'$');
                out.extend_from_slice(b.len().to_string().as_bytes());
                out.extend_from_slice(b"\r\n");
                out.extend_from_slice(b);
                out.extend_from_slice(b"\r\n");
            }
            RespValue::Array(items) => {
                out.push(b'*');
                out.extend_from_slice(items.len().to_string().as_bytes());
                out.extend_from_slice(b"\r\n");
                for item in items {
                    item.serialize_into(out);
                }
            }
        }
    }
}

/// Read bytes up to (not including) a CRLF, consuming the CRLF. A bare
/// `\r` not followed by `\n` is a grammar violation.
fn read_line(cursor: &mut impl ByteCursor) -> Result<Vec<u8>, ProtocolError> {
    let mut line = Vec::new();
    loop {
        let b = cursor.next_byte()?;
        if b == b'\r' {
            let next = cursor.next_byte()?;
            if next != b'\n' {
                return Err(ProtocolError::Malformed(
                    "bare CR not followed by LF".into(),
                ));
            }
            return Ok(line);
        }
        line.push(b);
    }
}

/// Parse a decimal `i64` from a line (no CR/LF bytes in it), allowing a
/// leading `-`.
fn parse_decimal_line(cursor: &mut impl ByteCursor) -> Result<i64, ProtocolError> {
    let line = read_line(cursor)?;
    let text = std::str::from_utf8(&line)
        .map_err(|_| ProtocolError::Malformed("non-UTF8 decimal line".into()))?;
    text.parse::<i64>()
        .map_err(|e| ProtocolError::Malformed(format!("invalid decimal {:?}: {}", text, e)))
}

fn parse_integer(cursor: &mut impl ByteCursor) -> Result<i64, ProtocolError> {
    parse_decimal_line(cursor)
}

fn parse_bulk_string(cursor: &mut impl ByteCursor) -> Result<RespValue, ProtocolError> {
    let len = parse_decimal_line(cursor)?;
    if len == -1 {
        return Ok(RespValue::BulkString(None));
    }
    if len < -1 {
        return Err(ProtocolError::Malformed(format!(
            "negative bulk string length {}",
            len
        )));
    }

    let len = len as usize;
    let mut payload = Vec::with_capacity(len);
    for _ in 0..len {
        payload.push(cursor.next_byte()?);
    }
    let cr = cursor.next_byte()?;
    let lf = cursor.next_byte()?;
    if cr != b'\r' || lf != b'\n' {
        return Err(ProtocolError::Malformed(
            "bulk string payload not followed by CRLF".into(),
        ));
    }
    Ok(RespValue::BulkString(Some(payload)))
}

fn parse_array(cursor: &mut impl ByteCursor) -> Result<RespValue, ProtocolError> {
    let len = parse_decimal_line(cursor)?;
    if len < 0 {
        return Err(ProtocolError::Malformed(format!(
            "negative array length {} (RESP2 null array is out of scope)",
            len
        )));
    }
    let mut items = Vec::with_capacity(len as usize);
    for _ in 0..len {
        items.push(RespValue::parse(cursor)?);
    }
    Ok(RespValue::Array(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(s: &[u8]) -> RespValue {
        let mut cursor = SliceCursor::new(s);
        RespValue::parse(&mut cursor).expect("should parse")
    }

    #[test]
    fn parses_simple_string() {
        assert_eq!(parse_str(b"+OK\r\n"), RespValue::simple("OK"));
    }

    #[test]
    fn parses_simple_error() {
        assert_eq!(parse_str(b"-ERR boom\r\n"), RespValue::error("ERR boom"));
    }

    #[test]
    fn parses_integer_including_negative() {
        assert_eq!(parse_str(b":42\r\n"), RespValue::Integer(42));
        assert_eq!(parse_str(b":-7\r\n"), RespValue::Integer(-7));
    }

    #[test]
    fn parses_null_and_empty_bulk_string() {
        assert_eq!(parse_str(b"$-1\r\n"), RespValue::null_bulk());
        assert_eq!(parse_str(b"$0\r\n\r\n"), RespValue::bulk(""));
    }

    #[test]
    fn bulk_string_payload_may_contain_crlf() {
        assert_eq!(parse_str(b"$4\r\na\r\nb\r\n"), RespValue::bulk("a\r\nb"));
    }

    #[test]
    fn parses_empty_and_nested_array() {
        assert_eq!(parse_str(b"*0\r\n"), RespValue::Array(vec![]));
        assert_eq!(
            parse_str(b"*1\r\n*1\r\n:1\r\n"),
            RespValue::Array(vec![RespValue::Array(vec![RespValue::Integer(1)])])
        );
    }

    #[test]
    fn rejects_unrecognized_type_byte() {
        let mut cursor = SliceCursor::new(b"@garbage\r\n");
        assert!(matches!(
            RespValue::parse(&mut cursor),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_bare_cr() {
        let mut cursor = SliceCursor::new(b"+foo\rbar\r\n");
        assert!(matches!(
            RespValue::parse(&mut cursor),
            Err(ProtocolError::Malformed(_))
        ));
    }

    #[test]
    fn reports_incomplete_on_premature_eof() {
        let mut cursor = SliceCursor::new(b"*2\r\n$3\r\nfoo\r\n");
        assert!(matches!(
            RespValue::parse(&mut cursor),
            Err(ProtocolError::Incomplete)
        ));
    }

    #[test]
    fn round_trip_min_and_max_i64() {
        for v in [i64::MIN, i64::MAX, 0] {
            let value = RespValue::Integer(v);
            let bytes = value.serialize();
            assert_eq!(parse_str(&bytes), value);
        }
    }

    #[test]
    fn round_trip_is_exact_and_consumes_all_bytes() {
        let value = RespValue::Array(vec![
            RespValue::bulk("GET"),
            RespValue::bulk("key"),
            RespValue::null_bulk(),
        ]);
        let bytes = value.serialize();
        let mut cursor = SliceCursor::new(&bytes);
        let parsed = RespValue::parse(&mut cursor).unwrap();
        assert_eq!(parsed, value);
        assert_eq!(cursor.consumed(), bytes.len());
    }
}
