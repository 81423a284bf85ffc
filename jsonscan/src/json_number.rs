// SPDX-License-Identifier: Apache-2.0

use core::ops::Deref;
use core::str::FromStr;

use alloc::string::String;

/// A JSON number, kept as the exact text found in the input.
///
/// The scanner never converts numbers on its own. Callers pick the
/// representation they need, so big integers and decimals lose nothing until
/// someone asks for a lossy form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsonNumber<'a> {
    raw: &'a str,
}

impl<'a> JsonNumber<'a> {
    pub(crate) fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Always available: get the exact string representation.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Check if this number represents an integer (no decimal point or exponent).
    pub fn is_integer(&self) -> bool {
        is_integer(self.raw.as_bytes())
    }

    /// Returns true if this number has a decimal point or exponent.
    pub fn is_float(&self) -> bool {
        !self.is_integer()
    }

    /// The value as an `i64`, if it is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        self.raw.parse().ok()
    }

    /// The value as a `u64`, if it is a non-negative integer in range.
    pub fn as_u64(&self) -> Option<u64> {
        if !self.is_integer() {
            return None;
        }
        self.raw.parse().ok()
    }

    /// The nearest `f64`. Magnitudes beyond `f64::MAX` come back infinite.
    pub fn as_f64(&self) -> Option<f64> {
        self.raw.parse().ok()
    }

    /// Parse the number as a custom type using the exact string representation.
    /// This allows using external libraries like BigDecimal, arbitrary precision, etc.
    pub fn parse<T: FromStr>(&self) -> Result<T, T::Err> {
        T::from_str(self.raw)
    }
}

impl AsRef<str> for JsonNumber<'_> {
    fn as_ref(&self) -> &str {
        self.raw
    }
}

impl Deref for JsonNumber<'_> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.raw
    }
}

impl core::fmt::Display for JsonNumber<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.raw)
    }
}

/// An owned [`JsonNumber`], as stored by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NumberValue(String);

impl NumberValue {
    /// Borrow as a [`JsonNumber`].
    pub fn as_number(&self) -> JsonNumber<'_> {
        JsonNumber::new(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().as_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.as_number().as_u64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().as_f64()
    }
}

impl From<JsonNumber<'_>> for NumberValue {
    fn from(number: JsonNumber<'_>) -> Self {
        NumberValue(String::from(number.as_str()))
    }
}

impl core::fmt::Display for NumberValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Detects if a number byte slice represents an integer (no decimal point or exponent).
/// JSON numbers are pure ASCII, so this avoids unnecessary UTF-8 string processing.
fn is_integer(bytes: &[u8]) -> bool {
    !bytes.iter().any(|&b| b == b'.' || b == b'e' || b == b'E')
}
