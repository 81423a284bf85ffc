// SPDX-License-Identifier: Apache-2.0

//! Byte-at-a-time JSON lexer.
//!
//! The tokenizer sees one byte per call and never looks ahead. It validates
//! the grammar, tracks nesting, and records where names and values live in
//! the scan buffer. It does not decode anything.

use alloc::vec;
use alloc::vec::Vec;

use crate::parse_error::SyntaxError;
use crate::scan_buffer::{Regions, Slot};

/// The kind of the token the scanner stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `null`
    Null,
    /// `true` or `false`; see [`Scanner::bool_value`](crate::Scanner::bool_value).
    Bool,
    /// A string value; member names are reported separately.
    String,
    /// A number, available as text.
    Number,
    /// `[`
    ArrayStart,
    /// `{`
    ObjectStart,
    /// `]` or `}`
    End,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::String => "string",
            Kind::Number => "number",
            Kind::ArrayStart => "array start",
            Kind::ObjectStart => "object start",
            Kind::End => "end",
        }
    }
}

impl core::fmt::Display for Kind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of feeding one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The byte was consumed; no token is complete yet.
    Continue,
    /// The byte completed a token.
    Token(Kind),
    /// The byte terminated a number but belongs to whatever follows it. The
    /// caller must feed it again.
    TokenBefore(Kind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Top level, nothing seen yet
    Start,
    /// Top level, after a complete value
    End,
    Value,
    Array(Array),
    Object(Object),
    Token(TokenProgress),
    String(Str),
    Number(Num),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Array {
    ItemOrClose,
    CommaOrClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Object {
    KeyOrClose,
    Colon,
    CommaOrClose,
    Key,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Str {
    Normal,
    Escaping,
    /// Number of hex digits seen so far (0-3)
    Unicode(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Num {
    Sign,
    LeadingZero,
    BeforeDecimalPoint,
    Decimal,
    AfterDecimalPoint,
    Exponent,
    ExponentSign,
    AfterExponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenType {
    True,
    False,
    Null,
}

impl TokenType {
    const fn as_str(&self) -> &'static [u8] {
        match self {
            TokenType::True => b"true",
            TokenType::False => b"false",
            TokenType::Null => b"null",
        }
    }

    const fn kind(&self) -> Kind {
        match self {
            TokenType::Null => Kind::Null,
            TokenType::True | TokenType::False => Kind::Bool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TokenProgress {
    token_type: TokenType,
    position: usize, // Current position in token string
}

impl TokenProgress {
    fn expected_byte(&self) -> Option<u8> {
        self.token_type.as_str().get(self.position).copied()
    }

    fn is_last(&self) -> bool {
        self.position + 1 == self.token_type.as_str().len()
    }

    fn expected(&self) -> &'static str {
        match (self.token_type, self.position) {
            (TokenType::Null, 1) => "'u' in null",
            (TokenType::Null, _) => "'l' in null",
            (TokenType::True, 1) => "'r' in true",
            (TokenType::True, 2) => "'u' in true",
            (TokenType::True, _) => "'e' in true",
            (TokenType::False, 1) => "'a' in false",
            (TokenType::False, 2) => "'l' in false",
            (TokenType::False, 3) => "'s' in false",
            (TokenType::False, _) => "'e' in false",
        }
    }
}

const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// The lexer state: the current state function plus a stack of
/// continuation states, one per open container, over a top-level entry.
#[derive(Debug, Clone)]
pub(crate) struct Tokenizer {
    state: State,
    stack: Vec<State>,
    /// The string being scanned is a member name
    in_key: bool,
    /// The string being scanned needs cooking
    escaped: bool,
    bool_value: bool,
    /// Input may end here without error
    eof_ok: bool,
    multiple: bool,
}

impl Tokenizer {
    pub fn new(multiple: bool) -> Self {
        Tokenizer {
            state: State::Start,
            stack: vec![State::Start],
            in_key: false,
            escaped: false,
            bool_value: false,
            eof_ok: true,
            multiple,
        }
    }

    /// Accept further top-level values after the first one.
    pub fn set_multiple(&mut self, multiple: bool) {
        self.multiple = multiple;
    }

    /// Stack depth: 1 at top level, plus one per open container.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn eof_ok(&self) -> bool {
        self.eof_ok
    }

    /// Whether the last literal was `true`.
    pub fn bool_value(&self) -> bool {
        self.bool_value
    }

    fn top(&self) -> State {
        self.stack.last().copied().unwrap_or(State::End)
    }

    fn set_top(&mut self, state: State) {
        if let Some(top) = self.stack.last_mut() {
            *top = state;
        }
    }

    /// Feed one byte found at buffer position `pos`.
    pub fn step(
        &mut self,
        byte: u8,
        pos: usize,
        regions: &mut Regions,
    ) -> Result<Step, SyntaxError> {
        let next = match (self.state, byte) {
            // Strings are the hot path
            (State::String(Str::Normal), b'"') => return Ok(self.end_string(pos, regions)),
            (State::String(Str::Normal), b'\\') => {
                self.escaped = true;
                State::String(Str::Escaping)
            }
            (State::String(Str::Normal), 0x00..=0x1f) => {
                return Self::error(pos, byte, "non-control byte")
            }
            (State::String(Str::Normal), 0x20..=0x7f) => State::String(Str::Normal),
            (State::String(Str::Normal), _) => {
                // Non-ASCII: UTF-8 is checked when the string is cooked
                self.escaped = true;
                State::String(Str::Normal)
            }
            (
                State::String(Str::Escaping),
                b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't',
            ) => State::String(Str::Normal),
            (State::String(Str::Escaping), b'u') => State::String(Str::Unicode(0)),
            (State::String(Str::Escaping), _) => return Self::error(pos, byte, "string escape"),
            (State::String(Str::Unicode(seen)), b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F') => {
                if seen >= 3 {
                    State::String(Str::Normal)
                } else {
                    State::String(Str::Unicode(seen + 1))
                }
            }
            (State::String(Str::Unicode(_)), _) => {
                return Self::error(pos, byte, "hex digit following \\u")
            }

            // Numbers
            (State::Number(Num::Sign), b'0') => State::Number(Num::LeadingZero),
            (State::Number(Num::Sign), b'1'..=b'9') => State::Number(Num::BeforeDecimalPoint),
            (State::Number(Num::Sign), _) => return Self::error(pos, byte, "digit after '-'"),
            (State::Number(Num::BeforeDecimalPoint), b'0'..=b'9') => {
                State::Number(Num::BeforeDecimalPoint)
            }
            (State::Number(Num::LeadingZero | Num::BeforeDecimalPoint), b'.') => {
                State::Number(Num::Decimal)
            }
            (
                State::Number(Num::LeadingZero | Num::BeforeDecimalPoint | Num::AfterDecimalPoint),
                b'e' | b'E',
            ) => State::Number(Num::Exponent),
            (State::Number(Num::Decimal), b'0'..=b'9') => State::Number(Num::AfterDecimalPoint),
            (State::Number(Num::Decimal), _) => return Self::error(pos, byte, "digit after '.'"),
            (State::Number(Num::AfterDecimalPoint), b'0'..=b'9') => {
                State::Number(Num::AfterDecimalPoint)
            }
            (State::Number(Num::Exponent), b'+' | b'-') => State::Number(Num::ExponentSign),
            (State::Number(Num::Exponent), b'0'..=b'9') => State::Number(Num::AfterExponent),
            (State::Number(Num::Exponent), _) => return Self::error(pos, byte, "exponent"),
            (State::Number(Num::ExponentSign), b'0'..=b'9') => State::Number(Num::AfterExponent),
            (State::Number(Num::ExponentSign), _) => {
                return Self::error(pos, byte, "exponent digits")
            }
            (State::Number(Num::AfterExponent), b'0'..=b'9') => State::Number(Num::AfterExponent),
            // Any other byte ends a number in an accepting state
            (State::Number(_), _) => return Ok(self.end_number(pos, regions)),

            // true, false, null
            (State::Token(progress), _) => {
                if progress.expected_byte() != Some(byte) {
                    return Self::error(pos, byte, progress.expected());
                }
                if progress.is_last() {
                    return Ok(self.end_token(progress.token_type, pos, regions));
                }
                State::Token(TokenProgress {
                    position: progress.position + 1,
                    ..progress
                })
            }

            // Containers
            (State::Value | State::Array(_) | State::Object(_), b) if is_whitespace(b) => {
                self.state
            }
            (State::Value, _) => return self.begin_value(byte, pos, regions),
            (State::Array(Array::ItemOrClose), b']') => return Ok(self.close()),
            (State::Array(Array::ItemOrClose), _) => {
                self.set_top(State::Array(Array::CommaOrClose));
                return self.begin_value(byte, pos, regions);
            }
            (State::Array(Array::CommaOrClose), b',') => State::Value,
            (State::Array(Array::CommaOrClose), b']') => return Ok(self.close()),
            (State::Array(Array::CommaOrClose), _) => {
                return Self::error(pos, byte, "',' or ']' in array")
            }
            (State::Object(Object::KeyOrClose), b'}') => return Ok(self.close()),
            (State::Object(Object::KeyOrClose), b'"') => {
                self.set_top(State::Object(Object::CommaOrClose));
                self.begin_key(pos, regions)
            }
            (State::Object(Object::KeyOrClose), _) => {
                return Self::error(pos, byte, "key or '}' in object")
            }
            (State::Object(Object::Colon), b':') => State::Value,
            (State::Object(Object::Colon), _) => {
                return Self::error(pos, byte, "':' in object member")
            }
            (State::Object(Object::CommaOrClose), b',') => State::Object(Object::Key),
            (State::Object(Object::CommaOrClose), b'}') => return Ok(self.close()),
            (State::Object(Object::CommaOrClose), _) => {
                return Self::error(pos, byte, "',' or '}' in object")
            }
            (State::Object(Object::Key), b'"') => self.begin_key(pos, regions),
            (State::Object(Object::Key), _) => {
                return Self::error(pos, byte, "string key in object")
            }

            // Top level
            (State::Start | State::End, b) if is_whitespace(b) => self.state,
            (State::Start, _) => {
                self.set_top(State::End);
                self.eof_ok = false;
                return self.begin_value(byte, pos, regions);
            }
            (State::End, _) if self.multiple => {
                self.eof_ok = false;
                return self.begin_value(byte, pos, regions);
            }
            (State::End, _) => return Self::error(pos, byte, "end of input"),
        };
        self.state = next;
        Ok(Step::Continue)
    }

    fn error(pos: usize, byte: u8, expected: &'static str) -> Result<Step, SyntaxError> {
        Err(SyntaxError::new(pos, byte, expected))
    }

    /// A value is complete: resume whatever was waiting for it.
    fn emit(&mut self, kind: Kind) -> Step {
        self.state = self.top();
        if self.stack.len() == 1 {
            self.eof_ok = true;
        }
        Step::Token(kind)
    }

    fn begin_value(
        &mut self,
        byte: u8,
        pos: usize,
        regions: &mut Regions,
    ) -> Result<Step, SyntaxError> {
        self.state = match byte {
            b'"' => {
                self.in_key = false;
                self.escaped = false;
                regions.open(Slot::Value, pos + 1);
                State::String(Str::Normal)
            }
            b'-' => {
                regions.open(Slot::Value, pos);
                State::Number(Num::Sign)
            }
            b'0' => {
                regions.open(Slot::Value, pos);
                State::Number(Num::LeadingZero)
            }
            b'1'..=b'9' => {
                regions.open(Slot::Value, pos);
                State::Number(Num::BeforeDecimalPoint)
            }
            b't' | b'f' | b'n' => {
                let token_type = match byte {
                    b't' => TokenType::True,
                    b'f' => TokenType::False,
                    _ => TokenType::Null,
                };
                regions.open(Slot::Value, pos);
                State::Token(TokenProgress {
                    token_type,
                    position: 1,
                })
            }
            b'[' => {
                self.stack.push(State::Array(Array::ItemOrClose));
                return Ok(self.emit(Kind::ArrayStart));
            }
            b'{' => {
                self.stack.push(State::Object(Object::KeyOrClose));
                return Ok(self.emit(Kind::ObjectStart));
            }
            _ => return Self::error(pos, byte, "start of JSON value"),
        };
        Ok(Step::Continue)
    }

    fn begin_key(&mut self, pos: usize, regions: &mut Regions) -> State {
        self.in_key = true;
        self.escaped = false;
        regions.open(Slot::Name, pos + 1);
        State::String(Str::Normal)
    }

    fn end_string(&mut self, pos: usize, regions: &mut Regions) -> Step {
        if self.in_key {
            regions.close(Slot::Name, pos, self.escaped);
            self.in_key = false;
            self.state = State::Object(Object::Colon);
            Step::Continue
        } else {
            regions.close(Slot::Value, pos, self.escaped);
            self.emit(Kind::String)
        }
    }

    fn end_number(&mut self, pos: usize, regions: &mut Regions) -> Step {
        regions.close(Slot::Value, pos, false);
        self.emit(Kind::Number);
        Step::TokenBefore(Kind::Number)
    }

    fn end_token(&mut self, token_type: TokenType, pos: usize, regions: &mut Regions) -> Step {
        regions.close(Slot::Value, pos + 1, false);
        self.bool_value = token_type == TokenType::True;
        self.emit(token_type.kind())
    }

    fn close(&mut self) -> Step {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self.emit(Kind::End)
    }
}
