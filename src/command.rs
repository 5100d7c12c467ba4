/*!
 * Command Model
 *
 * Recognizes and extracts the three supported commands from a parsed
 * `RespValue`. Recognition and extraction are kept separate per the
 * component design: `is_get`/`is_set`/`is_del` answer "does this shape
 * match?" with a plain `bool`; `Cmd::from_resp` does the matching
 * extraction, failing with `CommandError::BadCommand` for anything that
 * doesn't fit.
 *
 * Matching on the command name is case-sensitive, `"get"` is not
 * `"GET"`. This mirrors the system this crate is modeled on exactly and
 * is not a shortcut: see DESIGN.md's open questions.
 */

use thiserror::Error;

use crate::protocol::RespValue;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("not a recognized command")]
    BadCommand,
}

/// A typed representation of a supported (or unsupported) request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    Get { key: Vec<u8> },
    Set { key: Vec<u8>, value: Option<Vec<u8>> },
    Del { key: Vec<u8> },
    Unknown,
}

/// Pulls the bulk-string elements out of a RespValue that is expected to
/// be `Array(BulkString, ...)`. Returns `None` if the shape doesn't
/// match at all, every element must be a present bulk string except
/// where explicitly allowed to be absent by the caller.
fn as_bulk_array(value: &RespValue) -> Option<&[RespValue]> {
    match value {
        RespValue::Array(items) => Some(items),
        _ => None,
    }
}

fn bulk_bytes(value: &RespValue) -> Option<&[u8]> {
    match value {
        RespValue::BulkString(Some(b)) => Some(b),
        _ => None,
    }
}

/// True iff `value` is `Array[BulkString("GET"), BulkString(key)]` with
/// a non-empty key.
pub fn is_get(value: &RespValue) -> bool {
    matches!(extract_one_arg(value, b"GET"), Some(key) if !key.is_empty())
}

/// True iff `value` is `Array[BulkString("SET"), BulkString(key),
/// BulkString(value)]` with a non-empty key. The value bulk string may
/// be anything, including empty or null.
pub fn is_set(value: &RespValue) -> bool {
    let Some(items) = as_bulk_array(value) else {
        return false;
    };
    if items.len() != 3 {
        return false;
    }
    let Some(name) = bulk_bytes(&items[0]) else {
        return false;
    };
    if name != b"SET" {
        return false;
    }
    let Some(key) = bulk_bytes(&items[1]) else {
        return false;
    };
    if key.is_empty() {
        return false;
    }
    matches!(items[2], RespValue::BulkString(_))
}

/// True iff `value` is `Array[BulkString("DEL"), BulkString(key)]` with
/// a non-empty key.
pub fn is_del(value: &RespValue) -> bool {
    matches!(extract_one_arg(value, b"DEL"), Some(key) if !key.is_empty())
}

/// Shared shape check for the two-element `NAME key` commands (GET,
/// DEL): array of exactly two bulk strings, first matching `name`.
fn extract_one_arg<'a>(value: &'a RespValue, name: &[u8]) -> Option<&'a [u8]> {
    let items = as_bulk_array(value)?;
    if items.len() != 2 {
        return None;
    }
    if bulk_bytes(&items[0])? != name {
        return None;
    }
    bulk_bytes(&items[1])
}

impl Cmd {
    /// Classify a parsed `RespValue` as a typed command. Anything that
    /// is well-formed RESP but doesn't match GET/SET/DEL's shape comes
    /// back as `Cmd::Unknown`, not an error, `BadCommand` is reserved
    /// for callers that specifically need to distinguish "recognized
    /// some command name but the shape was wrong" (none of the three
    /// do today; it's here for the recognizer/extractor split the spec
    /// calls for).
    pub fn from_resp(value: &RespValue) -> Cmd {
        if let Some(key) = extract_one_arg(value, b"GET") {
            if !key.is_empty() {
                return Cmd::Get { key: key.to_vec() };
            }
        }
        if is_set(value) {
            if let Some(items) = as_bulk_array(value) {
                let key = bulk_bytes(&items[1]).unwrap().to_vec();
                let value = match &items[2] {
                    RespValue::BulkString(v) => v.clone(),
                    _ => unreachable!("is_set checked this is a bulk string"),
                };
                return Cmd::Set { key, value };
            }
        }
        if let Some(key) = extract_one_arg(value, b"DEL") {
            if !key.is_empty() {
                return Cmd::Del { key: key.to_vec() };
            }
        }
        Cmd::Unknown
    }

    /// Strict extraction that fails instead of falling back to
    /// `Unknown`. Not used on the connection handler's hot path (which
    /// treats "unknown" as a valid, answerable outcome), but kept for
    /// call sites that need to tell "not GET" from "malformed GET"
    /// apart, e.g. a future admin command dispatcher.
    pub fn expect_get(value: &RespValue) -> Result<Vec<u8>, CommandError> {
        extract_one_arg(value, b"GET")
            .filter(|k| !k.is_empty())
            .map(|k| k.to_vec())
            .ok_or(CommandError::BadCommand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arr(items: Vec<RespValue>) -> RespValue {
        RespValue::Array(items)
    }

    #[test]
    fn recognizes_get() {
        let v = arr(vec![RespValue::bulk("GET"), RespValue::bulk("foo")]);
        assert!(is_get(&v));
        assert_eq!(Cmd::from_resp(&v), Cmd::Get { key: b"foo".to_vec() });
    }

    #[test]
    fn get_requires_nonempty_key() {
        let v = arr(vec![RespValue::bulk("GET"), RespValue::bulk("")]);
        assert!(!is_get(&v));
        assert_eq!(Cmd::from_resp(&v), Cmd::Unknown);
    }

    #[test]
    fn set_accepts_null_bulk_value() {
        let v = arr(vec![
            RespValue::bulk("SET"),
            RespValue::bulk("foo"),
            RespValue::null_bulk(),
        ]);
        assert!(is_set(&v));
        assert_eq!(
            Cmd::from_resp(&v),
            Cmd::Set {
                key: b"foo".to_vec(),
                value: None
            }
        );
    }

    #[test]
    fn set_accepts_empty_bulk_value() {
        let v = arr(vec![
            RespValue::bulk("SET"),
            RespValue::bulk("foo"),
            RespValue::bulk(""),
        ]);
        assert_eq!(
            Cmd::from_resp(&v),
            Cmd::Set {
                key: b"foo".to_vec(),
                value: Some(vec![])
            }
        );
    }

    #[test]
    fn recognizes_del() {
        let v = arr(vec![RespValue::bulk("DEL"), RespValue::bulk("foo")]);
        assert!(is_del(&v));
        assert_eq!(Cmd::from_resp(&v), Cmd::Del { key: b"foo".to_vec() });
    }

    #[test]
    fn command_matching_is_case_sensitive() {
        let v = arr(vec![RespValue::bulk("get"), RespValue::bulk("foo")]);
        assert!(!is_get(&v));
        assert_eq!(Cmd::from_resp(&v), Cmd::Unknown);
    }

    #[test]
    fn anything_else_well_formed_is_unknown() {
        let v = arr(vec![RespValue::bulk("PING")]);
        assert_eq!(Cmd::from_resp(&v), Cmd::Unknown);

        let v = RespValue::simple("OK");
        assert_eq!(Cmd::from_resp(&v), Cmd::Unknown);
    }
}
