// SPDX-License-Identifier: Apache-2.0

//! Decode whole values into an owned tree.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt;

use crate::json_number::NumberValue;
use crate::parse_error::ParseError;
use crate::reader::Reader;
use crate::scanner::Scanner;
use crate::tokenizer::Kind;

/// An owned JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Kept as literal text; see [`NumberValue`].
    Number(NumberValue),
    String(String),
    Array(Vec<Value>),
    /// Members sorted by name. A repeated name keeps its last value.
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&NumberValue> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(members) => Some(members),
            _ => None,
        }
    }

    /// Look up an object member by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_object()?.get(name)
    }
}

/// Deepest container nesting [`decode_value`] will build.
pub const MAX_DEPTH: usize = 128;

/// Why [`decode_value`] could not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The scanner is not positioned on a token.
    NoToken,
    /// The scanner is positioned on an `End` token, which starts no value.
    UnexpectedEnd,
    /// The scanner stopped inside the value. The cause is in
    /// [`Scanner::err`].
    Stopped,
    /// Containers were nested more than [`MAX_DEPTH`] deep.
    MaxDepthReached,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::NoToken => f.write_str("scanner is not positioned on a token"),
            DecodeError::UnexpectedEnd => f.write_str("unexpected end token"),
            DecodeError::Stopped => f.write_str("scanner stopped inside the value"),
            DecodeError::MaxDepthReached => {
                write!(f, "containers nested more than {} deep", MAX_DEPTH)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Decode the value starting at the scanner's current token.
///
/// On success the scanner is left on the value's last token: the scalar
/// itself, or the `End` token of a container. Nesting deeper than
/// [`MAX_DEPTH`] stops with [`DecodeError::MaxDepthReached`], leaving the
/// scanner inside the value.
pub fn decode_value<R: Reader>(scanner: &mut Scanner<R>) -> Result<Value, DecodeError> {
    decode_nested(scanner, 0)
}

/// `depth` counts the containers already open around the current token.
fn decode_nested<R: Reader>(
    scanner: &mut Scanner<R>,
    depth: usize,
) -> Result<Value, DecodeError> {
    match scanner.kind().ok_or(DecodeError::NoToken)? {
        Kind::Null => Ok(Value::Null),
        Kind::Bool => Ok(Value::Bool(scanner.bool_value())),
        Kind::Number => scanner
            .number()
            .map(|n| Value::Number(n.into()))
            .ok_or(DecodeError::NoToken),
        Kind::String => Ok(Value::String(String::from(
            scanner.value_str().unwrap_or_default(),
        ))),
        Kind::ArrayStart => {
            let depth = enter(depth)?;
            let level = scanner.nesting_level();
            let mut items = Vec::new();
            while scanner.scan_at_level(level) {
                items.push(decode_nested(scanner, depth)?);
            }
            finish(scanner, Value::Array(items))
        }
        Kind::ObjectStart => {
            let depth = enter(depth)?;
            let level = scanner.nesting_level();
            let mut members = BTreeMap::new();
            while scanner.scan_at_level(level) {
                let name = String::from(scanner.name_str().unwrap_or_default());
                let value = decode_nested(scanner, depth)?;
                members.insert(name, value);
            }
            finish(scanner, Value::Object(members))
        }
        Kind::End => Err(DecodeError::UnexpectedEnd),
    }
}

fn enter(depth: usize) -> Result<usize, DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::MaxDepthReached);
    }
    Ok(depth + 1)
}

fn finish<R: Reader>(scanner: &Scanner<R>, value: Value) -> Result<Value, DecodeError> {
    if scanner.err().is_some() || scanner.kind() != Some(Kind::End) {
        return Err(DecodeError::Stopped);
    }
    Ok(value)
}

/// Decode the single JSON document produced by `reader`.
///
/// Input holding no value at all is reported as
/// [`ParseError::UnexpectedEof`], nesting deeper than [`MAX_DEPTH`] as
/// [`ParseError::MaxDepthReached`].
pub fn from_reader<R: Reader>(reader: R) -> Result<Value, ParseError<R::Error>> {
    let mut scanner = Scanner::new(reader);
    if !scanner.scan() {
        return Err(scanner.into_error().unwrap_or(ParseError::UnexpectedEof));
    }
    let decoded = decode_value(&mut scanner);
    if matches!(decoded, Err(DecodeError::MaxDepthReached)) {
        return Err(ParseError::MaxDepthReached);
    }
    // Drain the stream so trailing garbage is reported
    while scanner.scan() {}
    match (decoded, scanner.into_error()) {
        (_, Some(err)) => Err(err),
        (Ok(value), None) => Ok(value),
        (Err(_), None) => Err(ParseError::UnexpectedEof),
    }
}

/// Decode a single JSON document held in memory.
pub fn from_slice(json: &[u8]) -> Result<Value, ParseError<Infallible>> {
    from_reader(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ChunkReader;
    use alloc::vec;
    use test_log::test;

    fn number(text: &str) -> Value {
        Value::Number(NumberValue::from(crate::JsonNumber::new(text)))
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(from_slice(b"null"), Ok(Value::Null));
        assert_eq!(from_slice(b" true"), Ok(Value::Bool(true)));
        assert_eq!(from_slice(b"false "), Ok(Value::Bool(false)));
        assert_eq!(from_slice(b"-1.5e3"), Ok(number("-1.5e3")));
        assert_eq!(
            from_slice(br#""tab\there""#),
            Ok(Value::String(String::from("tab\there")))
        );
    }

    #[test]
    fn test_decode_nested() {
        let value = from_slice(br#"{"a": [1, {"b": null}], "c": "d", "e": {}}"#).unwrap();
        let a = value.get("a").and_then(Value::as_array).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[0], number("1"));
        assert_eq!(a[1].get("b"), Some(&Value::Null));
        assert_eq!(value.get("c").and_then(Value::as_str), Some("d"));
        assert_eq!(value.get("e"), Some(&Value::Object(BTreeMap::new())));
    }

    #[test]
    fn test_decode_empty_containers() {
        assert_eq!(from_slice(b"[]"), Ok(Value::Array(vec![])));
        assert_eq!(from_slice(b"{}"), Ok(Value::Object(BTreeMap::new())));
        assert_eq!(
            from_slice(b"[[],[[]]]"),
            Ok(Value::Array(vec![
                Value::Array(vec![]),
                Value::Array(vec![Value::Array(vec![])]),
            ]))
        );
    }

    #[test]
    fn test_repeated_name_keeps_last() {
        let value = from_slice(br#"{"k": 1, "k": 2}"#).unwrap();
        assert_eq!(value.get("k"), Some(&number("2")));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(from_slice(b""), Err(ParseError::UnexpectedEof));
        assert_eq!(from_slice(b"[1, 2"), Err(ParseError::UnexpectedEof));
        assert!(matches!(from_slice(b"[1,]"), Err(ParseError::Syntax(_))));
        assert!(matches!(from_slice(b"{} {}"), Err(ParseError::Syntax(_))));
    }

    #[test]
    fn test_decode_value_mid_stream() {
        let json = br#"[{"x": 1}, "skip me", [true]]"#;
        let mut scanner = Scanner::new(ChunkReader::new(json, 3));
        assert!(scanner.scan());
        let level = scanner.nesting_level();

        let mut decoded = Vec::new();
        while scanner.scan_at_level(level) {
            if scanner.kind() == Some(Kind::String) {
                continue;
            }
            decoded.push(decode_value(&mut scanner).unwrap());
        }
        assert!(scanner.err().is_none());
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].get("x"), Some(&number("1")));
        assert_eq!(decoded[1], Value::Array(vec![Value::Bool(true)]));
    }

    #[test]
    fn test_decode_value_requires_a_token() {
        let mut scanner = Scanner::new(&b"[]"[..]);
        assert_eq!(decode_value(&mut scanner), Err(DecodeError::NoToken));
        assert!(scanner.scan());
        assert!(scanner.scan());
        assert_eq!(decode_value(&mut scanner), Err(DecodeError::UnexpectedEnd));
    }

    fn nested(depth: usize) -> Vec<u8> {
        let mut json = vec![b'['; depth];
        json.resize(depth * 2, b']');
        json
    }

    #[test]
    fn test_nesting_up_to_the_limit_decodes() {
        let mut value = from_slice(&nested(MAX_DEPTH)).unwrap();
        let mut depth = 0;
        while let Value::Array(mut items) = value {
            depth += 1;
            value = match items.pop() {
                Some(inner) => inner,
                None => break,
            };
        }
        assert_eq!(depth, MAX_DEPTH);
    }

    #[test]
    fn test_nesting_past_the_limit_is_rejected() {
        assert_eq!(
            from_slice(&nested(MAX_DEPTH + 1)),
            Err(ParseError::MaxDepthReached)
        );
        let deep = nested(10_000);
        assert_eq!(from_slice(&deep), Err(ParseError::MaxDepthReached));

        let mut object = Vec::new();
        for _ in 0..=MAX_DEPTH {
            object.extend_from_slice(br#"{"a":"#);
        }
        object.push(b'1');
        object.resize(object.len() + MAX_DEPTH + 1, b'}');
        assert_eq!(from_slice(&object), Err(ParseError::MaxDepthReached));
    }

    #[test]
    fn test_decode_value_stops_at_the_limit() {
        let deep = nested(MAX_DEPTH + 5);
        let mut scanner = Scanner::new(&deep[..]);
        assert!(scanner.scan());
        assert_eq!(decode_value(&mut scanner), Err(DecodeError::MaxDepthReached));
        assert!(scanner.err().is_none());
        assert_eq!(scanner.nesting_level(), MAX_DEPTH + 2);
    }

    #[test]
    fn test_decode_value_reports_stop() {
        let mut scanner = Scanner::new(&b"[1, 2"[..]);
        assert!(scanner.scan());
        assert_eq!(decode_value(&mut scanner), Err(DecodeError::Stopped));
        assert_eq!(scanner.err(), Some(&ParseError::UnexpectedEof));
    }
}
