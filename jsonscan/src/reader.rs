// SPDX-License-Identifier: Apache-2.0

//! Byte sources for the [`Scanner`](crate::Scanner).
//!
//! The scanner only needs one capability from its input: "read some bytes
//! into this region". That capability is the [`Reader`] trait. This module
//! provides implementations for the common cases:
//!
//! - [`ChunkReader`]: an in-memory slice, optionally handed out in fixed-size
//!   chunks to simulate network or file reads.
//! - `&[u8]`: an in-memory slice read as fast as the scanner's buffer allows.
//! - [`IoReader`]: any [`std::io::Read`] (requires the `std` feature).
//!
//! # Examples
//!
//! ```rust
//! use jsonscan::{ChunkReader, Kind, Scanner};
//!
//! let json = br#"{"name": "Alice", "age": 30}"#;
//! // Hand the scanner at most 4 bytes per read.
//! let mut scanner = Scanner::new(ChunkReader::new(json, 4));
//!
//! let mut kinds = Vec::new();
//! while scanner.scan() {
//!     kinds.extend(scanner.kind());
//! }
//! assert!(scanner.err().is_none());
//! assert_eq!(kinds.first(), Some(&Kind::ObjectStart));
//! ```

use core::convert::Infallible;

/// Trait for input sources that can provide data to the scanner.
pub trait Reader {
    /// The error type returned by read operations
    type Error;

    /// Read data into the provided buffer.
    /// Returns the number of bytes read, or an error.
    ///
    /// # Contract
    /// - Short reads are allowed; the scanner asks again when it needs more.
    /// - A return value of 0 **MUST** indicate end of input.
    /// - Errors are recorded by the scanner and end the scan permanently.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<R: Reader + ?Sized> Reader for &mut R {
    type Error = R::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).read(buf)
    }
}

impl Reader for &[u8] {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.len().min(buf.len());
        let (head, tail) = self.split_at(n);
        if let Some(dest) = buf.get_mut(..n) {
            dest.copy_from_slice(head);
        }
        *self = tail;
        Ok(n)
    }
}

/// A [`Reader`] that reads from a byte slice, optionally in fixed-size chunks.
///
/// 1.  **Full Slice Reading**: [`ChunkReader::full_slice()`] hands out as much
///     of the slice as the scanner's buffer can take.
///
/// 2.  **Chunked Reading**: [`ChunkReader::new()`] limits each `read()` call to
///     a maximum chunk size. Useful for stress-testing the scanner's refill
///     and region relocation logic.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    pos: usize,
    chunk_size: usize,
}

impl<'a> ChunkReader<'a> {
    /// Create a new chunked reader from a byte slice.
    ///
    /// Each call to `read()` will return at most `chunk_size` bytes (minimum 1),
    /// even if more data is available and the buffer can hold more.
    pub fn new(data: &'a [u8], chunk_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Create a new reader that consumes the entire byte slice at once.
    pub fn full_slice(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            chunk_size: usize::MAX,
        }
    }

    /// Number of bytes not yet handed out.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }
}

impl Reader for ChunkReader<'_> {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let to_copy = self.remaining().min(buf.len()).min(self.chunk_size);
        if to_copy == 0 {
            return Ok(0);
        }

        let end = self.pos.saturating_add(to_copy);
        if let (Some(dest), Some(src)) = (buf.get_mut(..to_copy), self.data.get(self.pos..end)) {
            dest.copy_from_slice(src);
            self.pos = end;
            Ok(to_copy)
        } else {
            Ok(0)
        }
    }
}

/// Adapts any [`std::io::Read`] into a [`Reader`].
///
/// Reads interrupted by a signal are retried; every other I/O error is
/// handed to the scanner unchanged.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
}

#[cfg(feature = "std")]
impl<R: std::io::Read> IoReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<R: std::io::Read> Reader for IoReader<R> {
    type Error = std::io::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match self.inner.read(buf) {
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_full_slice_reader_basic() {
        let data = b"hello world";
        let mut reader = ChunkReader::full_slice(data);

        let mut buf = [0u8; 5];
        assert_eq!(reader.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");

        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf).unwrap(), 6);
        assert_eq!(&buf[..6], b" world");

        // EOF
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_full_slice_reader_empty() {
        let mut reader = ChunkReader::full_slice(b"");
        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_chunk_reader_basic() {
        let data = b"hello world";
        let mut reader = ChunkReader::new(data, 3);

        let mut buf = [0u8; 10];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"hel");
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"lo ");
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"wor");

        // Limited by remaining data (2 < chunk_size)
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ld");
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_chunk_reader_limited_by_buffer() {
        let mut reader = ChunkReader::new(b"abcdef", 100);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
    }

    #[test]
    fn test_chunk_size_zero_is_clamped() {
        let mut reader = ChunkReader::new(b"ab", 0);
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_slice_reader_advances() {
        let mut input: &[u8] = b"[1,2]";
        let mut buf = [0u8; 3];
        assert_eq!(Reader::read(&mut input, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"[1,");
        assert_eq!(Reader::read(&mut input, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"2]");
        assert_eq!(Reader::read(&mut input, &mut buf).unwrap(), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_io_reader_retries_interrupted() {
        struct Flaky {
            interrupted: bool,
            data: &'static [u8],
        }

        impl std::io::Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if !self.interrupted {
                    self.interrupted = true;
                    return Err(std::io::ErrorKind::Interrupted.into());
                }
                std::io::Read::read(&mut self.data, buf)
            }
        }

        let mut reader = IoReader::new(Flaky {
            interrupted: false,
            data: b"null",
        });
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"null");
    }
}
