// SPDX-License-Identifier: Apache-2.0

//! An incremental, pull-based JSON scanner.
//!
//! [`Scanner`] reads bytes from any [`Reader`] in whatever chunks it provides
//! and yields one token at a time: `null`, bools, strings, numbers, the start
//! of an array or object, and `End`. No tree is built. Names and values are
//! borrowed from the scanner's buffer; strings are only unescaped when asked
//! for, and then in place whenever possible.
//!
//! On top of the scanner sit a tree [`decoder`](decode_value) producing
//! [`Value`] and, with the `std` feature, a compact JSON [`Writer`].
//!
//! ```rust
//! use jsonscan::{ChunkReader, Kind, Scanner};
//!
//! let json = br#"{"items": [{"id": 1}, {"id": 2, "extra": [true]}]}"#;
//! let mut scanner = Scanner::new(ChunkReader::new(json, 5));
//!
//! let mut ids = Vec::new();
//! while scanner.scan() {
//!     if scanner.kind() == Some(Kind::Number) && scanner.name() == Some(&b"id"[..]) {
//!         ids.extend(scanner.number().and_then(|n| n.as_i64()));
//!     }
//! }
//! assert!(scanner.err().is_none());
//! assert_eq!(ids, [1, 2]);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

mod decoder;
mod escape_processor;
mod json_number;
mod parse_error;
mod reader;
mod scan_buffer;
mod scanner;
mod tokenizer;
#[cfg(feature = "std")]
mod writer;

pub use decoder::{decode_value, from_reader, from_slice, DecodeError, Value, MAX_DEPTH};
pub use json_number::{JsonNumber, NumberValue};
pub use parse_error::{ParseError, SyntaxError};
#[cfg(feature = "std")]
pub use reader::IoReader;
pub use reader::{ChunkReader, Reader};
pub use scanner::{Config, Scanner};
pub use tokenizer::Kind;
#[cfg(feature = "std")]
pub use writer::Writer;
