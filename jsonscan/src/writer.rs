// SPDX-License-Identifier: Apache-2.0

//! Compact JSON output with comma and container bookkeeping.

use std::io::{self, Write};

use crate::decoder::Value;
use crate::reader::Reader;
use crate::scanner::Scanner;
use crate::tokenizer::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Array,
    Object,
}

/// Writes compact JSON to an [`io::Write`].
///
/// The writer inserts commas and tracks open containers; it does not check
/// that calls form a valid document (a `name` outside an object, or an
/// unbalanced `end_array`, produce invalid output). The underlying writer is
/// flushed whenever a top-level value is complete.
///
/// ```rust
/// use jsonscan::Writer;
///
/// let mut out = Vec::new();
/// let mut writer = Writer::new(&mut out);
/// writer.start_object()?;
/// writer.name("id")?;
/// writer.int(-7)?;
/// writer.name("tags")?;
/// writer.start_array()?;
/// writer.string("a\"b")?;
/// writer.end_array()?;
/// writer.end_object()?;
/// assert_eq!(out, br#"{"id":-7,"tags":["a\"b"]}"#);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct Writer<W: Write> {
    out: W,
    /// The next value needs a separating comma
    comma: bool,
    stack: Vec<Container>,
}

impl<W: Write> Writer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            comma: false,
            stack: Vec::new(),
        }
    }

    /// Number of containers currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn separate(&mut self) -> io::Result<()> {
        if self.comma {
            self.out.write_all(b",")?;
        }
        Ok(())
    }

    /// A value was written.
    fn end(&mut self) -> io::Result<()> {
        if self.stack.is_empty() {
            self.comma = false;
            self.out.flush()
        } else {
            self.comma = true;
            Ok(())
        }
    }

    fn scalar(&mut self, text: &[u8]) -> io::Result<()> {
        self.separate()?;
        self.out.write_all(text)?;
        self.end()
    }

    fn quoted(&mut self, text: &[u8]) -> io::Result<()> {
        self.separate()?;
        self.out.write_all(b"\"")?;
        self.out.write_all(text)?;
        self.out.write_all(b"\"")?;
        self.end()
    }

    fn open(&mut self, container: Container, byte: &[u8]) -> io::Result<()> {
        self.separate()?;
        self.comma = false;
        self.stack.push(container);
        self.out.write_all(byte)
    }

    fn close(&mut self, byte: &[u8]) -> io::Result<()> {
        self.stack.pop();
        self.out.write_all(byte)?;
        self.end()
    }

    pub fn start_array(&mut self) -> io::Result<()> {
        self.open(Container::Array, b"[")
    }

    pub fn end_array(&mut self) -> io::Result<()> {
        self.close(b"]")
    }

    pub fn start_object(&mut self) -> io::Result<()> {
        self.open(Container::Object, b"{")
    }

    pub fn end_object(&mut self) -> io::Result<()> {
        self.close(b"}")
    }

    /// Write a member name. The next call writes its value.
    pub fn name(&mut self, name: &str) -> io::Result<()> {
        self.separate()?;
        self.comma = false;
        write_escaped(&mut self.out, name)?;
        self.out.write_all(b":")
    }

    pub fn null(&mut self) -> io::Result<()> {
        self.scalar(b"null")
    }

    pub fn bool(&mut self, value: bool) -> io::Result<()> {
        self.scalar(if value { &b"true"[..] } else { &b"false"[..] })
    }

    pub fn int(&mut self, value: i64) -> io::Result<()> {
        self.scalar(value.to_string().as_bytes())
    }

    pub fn uint(&mut self, value: u64) -> io::Result<()> {
        self.scalar(value.to_string().as_bytes())
    }

    /// An integer inside a string, for consumers that lose precision on
    /// large numbers.
    pub fn quoted_int(&mut self, value: i64) -> io::Result<()> {
        self.quoted(value.to_string().as_bytes())
    }

    pub fn quoted_uint(&mut self, value: u64) -> io::Result<()> {
        self.quoted(value.to_string().as_bytes())
    }

    /// Write a float in its shortest round-trip form.
    ///
    /// Infinities and NaN have no JSON form: `0` is written in their place,
    /// so the document stays well-formed, and an `InvalidInput` error is
    /// returned.
    pub fn float(&mut self, value: f64) -> io::Result<()> {
        if !value.is_finite() {
            self.scalar(b"0")?;
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "unsupported value (inf, nan)",
            ));
        }
        self.scalar(format!("{value:?}").as_bytes())
    }

    /// Write number text verbatim, such as a literal taken from a scanner.
    /// The text must already be a valid JSON number.
    pub fn number(&mut self, literal: &str) -> io::Result<()> {
        self.scalar(literal.as_bytes())
    }

    pub fn string(&mut self, value: &str) -> io::Result<()> {
        self.separate()?;
        write_escaped(&mut self.out, value)?;
        self.end()
    }

    /// Like [`string`](Self::string); malformed UTF-8 is written as U+FFFD.
    pub fn string_bytes(&mut self, value: &[u8]) -> io::Result<()> {
        self.string(&String::from_utf8_lossy(value))
    }

    /// Copy the scanner's current token, including its member name.
    pub fn write_token<R: Reader>(&mut self, scanner: &mut Scanner<R>) -> io::Result<()> {
        if let Some(name) = scanner.name_str() {
            self.name(name)?;
        }
        match scanner.kind() {
            None => Ok(()),
            Some(Kind::ArrayStart) => self.start_array(),
            Some(Kind::ObjectStart) => self.start_object(),
            Some(Kind::End) => match self.stack.last() {
                Some(Container::Object) => self.end_object(),
                _ => self.end_array(),
            },
            Some(Kind::Null) => self.null(),
            Some(Kind::Bool) => self.bool(scanner.bool_value()),
            Some(Kind::Number) => match scanner.value_str() {
                Some(literal) => self.number(literal),
                None => Ok(()),
            },
            Some(Kind::String) => match scanner.value_str() {
                Some(text) => self.string(text),
                None => Ok(()),
            },
        }
    }

    pub fn write_value(&mut self, value: &Value) -> io::Result<()> {
        match value {
            Value::Null => self.null(),
            Value::Bool(b) => self.bool(*b),
            Value::Number(n) => self.number(n.as_str()),
            Value::String(s) => self.string(s),
            Value::Array(items) => {
                self.start_array()?;
                for item in items {
                    self.write_value(item)?;
                }
                self.end_array()
            }
            Value::Object(members) => {
                self.start_object()?;
                for (name, member) in members {
                    self.name(name)?;
                    self.write_value(member)?;
                }
                self.end_object()
            }
        }
    }
}

/// Write `text` as a quoted JSON string.
fn write_escaped<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    out.write_all(b"\"")?;
    let bytes = text.as_bytes();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let unicode;
        let escape: &[u8] = match b {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x08 => b"\\b",
            0x0c => b"\\f",
            0x00..=0x1f => {
                unicode = [
                    b'\\',
                    b'u',
                    b'0',
                    b'0',
                    HEX[(b >> 4) as usize],
                    HEX[(b & 0xf) as usize],
                ];
                &unicode
            }
            _ => continue,
        };
        out.write_all(bytes.get(start..i).unwrap_or_default())?;
        out.write_all(escape)?;
        start = i + 1;
    }
    out.write_all(bytes.get(start..).unwrap_or_default())?;
    out.write_all(b"\"")
}
