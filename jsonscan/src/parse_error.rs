// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// A byte that is not valid at the current position of the JSON grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxError {
    offset: usize,
    byte: u8,
    expected: &'static str,
}

impl SyntaxError {
    pub(crate) fn new(offset: usize, byte: u8, expected: &'static str) -> Self {
        Self {
            offset,
            byte,
            expected,
        }
    }

    /// Offset of the offending byte, counted from the start of the stream.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The offending byte.
    pub fn byte(&self) -> u8 {
        self.byte
    }

    /// What the scanner expected to find instead.
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    // The offset is assigned by the scanner, which knows where its buffer
    // sits in the stream; the tokenizer only sees buffer positions.
    pub(crate) fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {}, found {:?} at offset {}",
            self.expected, self.byte as char, self.offset
        )
    }
}

/// Errors that stop a [`Scanner`](crate::Scanner).
///
/// `E` is the error type of the byte source. Once recorded, the error is
/// permanent: every later call to the scanner reports it again.
#[derive(Debug, PartialEq)]
pub enum ParseError<E> {
    /// A byte did not fit the JSON grammar.
    Syntax(SyntaxError),
    /// The input ended inside a value, a string, or an open container.
    UnexpectedEof,
    /// The byte source failed. The original error is kept as-is.
    Reader(E),
    /// A decoder met containers nested deeper than its limit. The scanner
    /// itself never reports this.
    MaxDepthReached,
}

impl<E> ParseError<E> {
    /// Returns the syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            ParseError::Syntax(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the byte source's error, if this is one.
    pub fn as_reader(&self) -> Option<&E> {
        match self {
            ParseError::Reader(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<SyntaxError> for ParseError<E> {
    fn from(err: SyntaxError) -> Self {
        ParseError::Syntax(err)
    }
}

impl<E: fmt::Display> fmt::Display for ParseError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax(e) => write!(f, "{e}"),
            ParseError::UnexpectedEof => f.write_str("unexpected end of input"),
            ParseError::Reader(e) => write!(f, "read error: {e}"),
            ParseError::MaxDepthReached => f.write_str("maximum nesting depth reached"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SyntaxError {}

#[cfg(feature = "std")]
impl<E> std::error::Error for ParseError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Syntax(e) => Some(e),
            ParseError::Reader(e) => Some(e),
            ParseError::UnexpectedEof | ParseError::MaxDepthReached => None,
        }
    }
}
