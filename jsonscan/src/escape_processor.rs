// SPDX-License-Identifier: Apache-2.0

//! Turns the raw bytes of a scanned string into its final text.
//!
//! The tokenizer only checks string syntax. Decoding of escapes, surrogate
//! pairs and UTF-8 repair happens here, lazily, the first time a name or
//! value is requested.

use alloc::vec::Vec;

const REPLACEMENT: &[u8] = "\u{FFFD}".as_bytes();

/// Pure helpers for escape sequences.
pub(crate) struct EscapeProcessor;

impl EscapeProcessor {
    /// Process a simple escape sequence character and return the unescaped byte.
    ///
    /// # Arguments
    /// * `escape_char` - The character following the backslash in an escape sequence
    ///
    /// # Returns
    /// The unescaped byte value, or `None` if this is not a simple escape.
    pub fn process_simple_escape(escape_char: u8) -> Option<u8> {
        match escape_char {
            b'n' => Some(b'\n'),
            b't' => Some(b'\t'),
            b'r' => Some(b'\r'),
            b'\\' => Some(b'\\'),
            b'"' => Some(b'"'),
            b'/' => Some(b'/'),
            b'b' => Some(0x08), // Backspace
            b'f' => Some(0x0C), // Form feed
            _ => None,
        }
    }

    /// The numeric value (0-15) of a hex digit.
    pub fn hex_digit_value(byte: u8) -> Option<u32> {
        match byte {
            b'0'..=b'9' => Some((byte - b'0') as u32),
            b'a'..=b'f' => Some(byte.wrapping_sub(b'a').wrapping_add(10) as u32),
            b'A'..=b'F' => Some(byte.wrapping_sub(b'A').wrapping_add(10) as u32),
            _ => None,
        }
    }

    /// Parse exactly four hex digits.
    pub fn parse_hex4(hex: &[u8]) -> Option<u32> {
        if hex.len() != 4 {
            return None;
        }
        hex.iter()
            .try_fold(0u32, |acc, &b| Some((acc << 4) | Self::hex_digit_value(b)?))
    }

    /// Check if a Unicode codepoint is a high surrogate (0xD800-0xDBFF)
    pub fn is_high_surrogate(codepoint: u32) -> bool {
        (0xD800..=0xDBFF).contains(&codepoint)
    }

    /// Check if a Unicode codepoint is a low surrogate (0xDC00-0xDFFF)
    pub fn is_low_surrogate(codepoint: u32) -> bool {
        (0xDC00..=0xDFFF).contains(&codepoint)
    }

    pub fn is_surrogate(codepoint: u32) -> bool {
        (0xD800..=0xDFFF).contains(&codepoint)
    }

    /// Combine a high and low surrogate pair into a single character
    pub fn combine_surrogate_pair(high: u32, low: u32) -> Option<char> {
        if !Self::is_high_surrogate(high) || !Self::is_low_surrogate(low) {
            return None;
        }
        let codepoint = 0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF);
        char::from_u32(codepoint)
    }
}

/// Where the cooked text ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cooked {
    /// The text fit in place; it occupies the first `n` bytes of the input.
    InPlace(usize),
    /// The text grew past what it had consumed and was written to the spill
    /// buffer instead.
    Spilled,
}

/// Decode the raw bytes between a string's quotes.
///
/// Escapes are decoded. `\u` surrogate pairs are combined; an unpaired or
/// malformed surrogate becomes U+FFFD and a following escape is left for the
/// next step. Malformed UTF-8 is replaced by one U+FFFD per maximal invalid
/// subsequence. Output is written over `raw` while it fits behind the read
/// cursor, otherwise everything is moved to `spill` and continued there.
pub(crate) fn cook(raw: &mut [u8], spill: &mut Vec<u8>) -> Cooked {
    let mut cooker = Cooker {
        raw,
        read: 0,
        written: 0,
        spill,
        spilled: false,
    };
    cooker.run();
    if cooker.spilled {
        Cooked::Spilled
    } else {
        Cooked::InPlace(cooker.written)
    }
}

struct Cooker<'a> {
    raw: &'a mut [u8],
    read: usize,
    written: usize,
    spill: &'a mut Vec<u8>,
    spilled: bool,
}

impl Cooker<'_> {
    fn run(&mut self) {
        while self.read < self.raw.len() {
            if self.raw.get(self.read) == Some(&b'\\') {
                self.escape();
            } else {
                self.segment();
            }
        }
    }

    /// Copy bytes up to the next backslash, replacing malformed UTF-8.
    fn segment(&mut self) {
        let rest = self.raw.get(self.read..).unwrap_or_default();
        let end = rest
            .iter()
            .position(|&b| b == b'\\')
            .map_or(self.raw.len(), |i| self.read + i);

        let mut cursor = self.read;
        while cursor < end {
            let checked = core::str::from_utf8(self.raw.get(cursor..end).unwrap_or_default())
                .map(|_| ());
            match checked {
                Ok(()) => {
                    self.copy_raw(cursor, end);
                    self.read = end;
                }
                Err(e) => {
                    let valid_end = cursor + e.valid_up_to();
                    let invalid = e.error_len().unwrap_or(end - valid_end);
                    self.copy_raw(cursor, valid_end);
                    self.read = valid_end + invalid;
                    self.push(REPLACEMENT);
                }
            }
            cursor = self.read;
        }
    }

    fn escape(&mut self) {
        let Some(&letter) = self.raw.get(self.read + 1) else {
            // Trailing lone backslash; the tokenizer never closes such a string
            self.read = self.raw.len();
            self.push(REPLACEMENT);
            return;
        };

        if letter == b'u' {
            let ch = self.unicode_escape();
            let mut utf8 = [0u8; 4];
            self.push(ch.encode_utf8(&mut utf8).as_bytes());
        } else {
            self.read += 2;
            let byte = EscapeProcessor::process_simple_escape(letter).unwrap_or(letter);
            self.push(&[byte]);
        }
    }

    fn unicode_escape(&mut self) -> char {
        let Some(first) = self.hex_escape_at(self.read) else {
            self.read = self.raw.len();
            return char::REPLACEMENT_CHARACTER;
        };
        self.read += 6;

        if !EscapeProcessor::is_surrogate(first) {
            return char::from_u32(first).unwrap_or(char::REPLACEMENT_CHARACTER);
        }
        if let Some(second) = self.hex_escape_at(self.read) {
            if let Some(ch) = EscapeProcessor::combine_surrogate_pair(first, second) {
                self.read += 6;
                return ch;
            }
        }
        char::REPLACEMENT_CHARACTER
    }

    /// Code point of a `\uXXXX` escape starting at `at`, if there is one.
    fn hex_escape_at(&self, at: usize) -> Option<u32> {
        let escape = self.raw.get(at..at.checked_add(6)?)?;
        EscapeProcessor::parse_hex4(escape.strip_prefix(b"\\u")?)
    }

    fn copy_raw(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        if self.spilled {
            self.spill
                .extend_from_slice(self.raw.get(start..end).unwrap_or_default());
        } else {
            if start != self.written {
                self.raw.copy_within(start..end, self.written);
            }
            self.written += end - start;
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        if !self.spilled && self.written + bytes.len() > self.read {
            self.spill_over(bytes.len());
        }
        if self.spilled {
            self.spill.extend_from_slice(bytes);
            return;
        }
        let end = self.written + bytes.len();
        if let Some(dest) = self.raw.get_mut(self.written..end) {
            dest.copy_from_slice(bytes);
        }
        self.written = end;
    }

    /// Output caught up with input: continue in the spill buffer, sized for
    /// the worst case of the remaining input plus one more write.
    fn spill_over(&mut self, pending: usize) {
        let remaining = self.raw.len().saturating_sub(self.read);
        self.spill.clear();
        self.spill
            .reserve(self.written + pending + remaining.saturating_mul(4) / 3);
        self.spill
            .extend_from_slice(self.raw.get(..self.written).unwrap_or_default());
        self.spilled = true;
    }
}
