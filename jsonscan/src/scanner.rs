// SPDX-License-Identifier: Apache-2.0

use log::debug;

use crate::json_number::JsonNumber;
use crate::parse_error::ParseError;
use crate::reader::Reader;
use crate::scan_buffer::{ScanBuffer, Slot};
use crate::tokenizer::{Kind, Step, Tokenizer};

/// Buffer sizing and stream options for a [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Initial size of the scan buffer, in bytes.
    pub initial_capacity: usize,
    /// Free space guaranteed for every read. The buffer grows to
    /// `2 * capacity + min_read` when a refill would leave less.
    pub min_read: usize,
    /// Accept a stream of top-level values instead of exactly one.
    pub multiple_documents: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            min_read: 512,
            multiple_documents: false,
        }
    }
}

/// Where the scanner is in its input.
#[derive(Debug)]
enum Status<E> {
    /// The reader may have more bytes
    Reading,
    /// The reader reported end of input; buffered bytes may remain
    Drained,
    /// Scanning stopped for good
    Failed(ParseError<E>),
}

/// Internal result of one scan.
enum Advance {
    Token(Kind),
    End,
    Failed,
}

/// A pull-based JSON scanner over any [`Reader`].
///
/// Each call to [`scan`](Self::scan) moves to the next token. Names and
/// values are handed out as views into the scanner's own buffer and are
/// valid until the next call. String escapes and malformed UTF-8 are only
/// decoded when a name or value is actually requested.
///
/// # Examples
///
/// ```rust
/// use jsonscan::{Kind, Scanner};
///
/// let json: &[u8] = br#"{"name": "Ferris", "legs": 6}"#;
/// let mut scanner = Scanner::new(json);
///
/// while scanner.scan() {
///     if scanner.kind() == Some(Kind::Number) {
///         assert_eq!(scanner.name_str(), Some("legs"));
///         assert_eq!(scanner.number().and_then(|n| n.as_i64()), Some(6));
///     }
/// }
/// assert!(scanner.err().is_none());
/// ```
pub struct Scanner<R: Reader> {
    reader: R,
    buffer: ScanBuffer,
    tokenizer: Tokenizer,
    kind: Option<Kind>,
    status: Status<R::Error>,
}

impl<R: Reader> Scanner<R> {
    /// Create a scanner with the default [`Config`].
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, Config::default())
    }

    /// Create a scanner with custom buffer sizing or multi-document mode.
    pub fn with_config(reader: R, config: Config) -> Self {
        Self {
            reader,
            buffer: ScanBuffer::new(config.initial_capacity, config.min_read),
            tokenizer: Tokenizer::new(config.multiple_documents),
            kind: None,
            status: Status::Reading,
        }
    }

    /// Accept a stream of top-level values. Must be called before the first
    /// [`scan`](Self::scan) to affect the first value boundary.
    pub fn allow_multiple(&mut self) {
        self.tokenizer.set_multiple(true);
    }

    /// Advance to the next token.
    ///
    /// Returns `Ok(None)` at the clean end of input and `Err` once scanning
    /// has failed. Both outcomes are permanent.
    pub fn next_token(&mut self) -> Result<Option<Kind>, &ParseError<R::Error>> {
        match self.advance() {
            Advance::Token(kind) => Ok(Some(kind)),
            Advance::End => Ok(None),
            Advance::Failed => match &self.status {
                Status::Failed(err) => Err(err),
                _ => Ok(None),
            },
        }
    }

    /// Advance to the next token. Returns `false` at the end of input or on
    /// error; check [`err`](Self::err) to tell them apart.
    pub fn scan(&mut self) -> bool {
        matches!(self.advance(), Advance::Token(_))
    }

    /// Like [`scan`](Self::scan), but also returns `false` on the `End`
    /// token that closes the container opened at `level`.
    ///
    /// Use it to loop over the children of the container the scanner is
    /// positioned on:
    ///
    /// ```rust
    /// use jsonscan::{Kind, Scanner};
    ///
    /// let mut scanner = Scanner::new(&b"[[2], 1]"[..]);
    /// assert_eq!(scanner.next_token(), Ok(Some(Kind::ArrayStart)));
    /// let level = scanner.nesting_level();
    ///
    /// let mut kinds = Vec::new();
    /// while scanner.scan_at_level(level) {
    ///     kinds.extend(scanner.kind());
    ///     scanner.skip();
    /// }
    /// assert_eq!(kinds, [Kind::ArrayStart, Kind::Number]);
    /// ```
    pub fn scan_at_level(&mut self, level: usize) -> bool {
        self.scan() && !(self.kind == Some(Kind::End) && self.nesting_level() < level)
    }

    /// Skip the children of the container the scanner is positioned on,
    /// stopping at its `End` token. Does nothing on other tokens.
    pub fn skip(&mut self) {
        let target = match self.kind {
            Some(Kind::ArrayStart | Kind::ObjectStart) => self.nesting_level().saturating_sub(1),
            _ => return,
        };
        while self.nesting_level() > target && self.scan() {}
    }

    /// The kind of the current token, or `None` before the first scan and
    /// after the scanner has stopped.
    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    /// Nesting level: 1 at top level, plus one per open container. A
    /// container's start token is reported at the inner level, its `End`
    /// token at the outer one.
    pub fn nesting_level(&self) -> usize {
        self.tokenizer.depth()
    }

    /// The value of the current [`Kind::Bool`] token.
    pub fn bool_value(&self) -> bool {
        self.kind == Some(Kind::Bool) && self.tokenizer.bool_value()
    }

    /// The member name of the current token, if it is an object member.
    ///
    /// Escapes are decoded and malformed UTF-8 is replaced with U+FFFD on
    /// first access.
    pub fn name(&mut self) -> Option<&[u8]> {
        self.kind?;
        self.buffer.text(Slot::Name)
    }

    /// The text of the current scalar token.
    ///
    /// For strings, the decoded contents without quotes. For numbers and
    /// literals, the literal text. `None` for containers and `End`.
    pub fn value(&mut self) -> Option<&[u8]> {
        match self.kind? {
            Kind::String | Kind::Number | Kind::Bool | Kind::Null => self.buffer.text(Slot::Value),
            _ => None,
        }
    }

    /// [`name`](Self::name) as `&str`.
    pub fn name_str(&mut self) -> Option<&str> {
        core::str::from_utf8(self.name()?).ok()
    }

    /// [`value`](Self::value) as `&str`.
    pub fn value_str(&mut self) -> Option<&str> {
        core::str::from_utf8(self.value()?).ok()
    }

    /// The current [`Kind::Number`] token.
    pub fn number(&mut self) -> Option<JsonNumber<'_>> {
        if self.kind != Some(Kind::Number) {
            return None;
        }
        self.value_str().map(JsonNumber::new)
    }

    /// The error that stopped the scanner, if any.
    pub fn err(&self) -> Option<&ParseError<R::Error>> {
        match &self.status {
            Status::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Consume the scanner and take the error that stopped it, if any.
    pub fn into_error(self) -> Option<ParseError<R::Error>> {
        match self.status {
            Status::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Consume the scanner and return the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn advance(&mut self) -> Advance {
        self.kind = None;
        self.buffer.regions_mut().clear();
        if matches!(self.status, Status::Failed(_)) {
            return Advance::Failed;
        }

        loop {
            while let Some((byte, pos)) = self.buffer.next_byte() {
                match self.tokenizer.step(byte, pos, self.buffer.regions_mut()) {
                    Ok(Step::Continue) => {}
                    Ok(Step::Token(kind)) => return self.produce(kind),
                    Ok(Step::TokenBefore(kind)) => {
                        self.buffer.step_back();
                        return self.produce(kind);
                    }
                    Err(err) => {
                        let offset = self.buffer.stream_offset(pos);
                        return self.fail(ParseError::Syntax(err.with_offset(offset)));
                    }
                }
            }

            if matches!(self.status, Status::Reading) {
                match self.buffer.fill(&mut self.reader) {
                    Ok(0) => {
                        debug!("reader exhausted");
                        self.status = Status::Drained;
                    }
                    Ok(_) => continue,
                    Err(err) => return self.fail(ParseError::Reader(err)),
                }
            }

            // End of input acts like one trailing space, which completes a
            // number or a top-level literal that ran up to it.
            let pos = self.buffer.position();
            if let Ok(Step::Token(kind) | Step::TokenBefore(kind)) =
                self.tokenizer.step(b' ', pos, self.buffer.regions_mut())
            {
                return self.produce(kind);
            }
            return if self.tokenizer.eof_ok() {
                Advance::End
            } else {
                self.fail(ParseError::UnexpectedEof)
            };
        }
    }

    fn produce(&mut self, kind: Kind) -> Advance {
        self.kind = Some(kind);
        Advance::Token(kind)
    }

    fn fail(&mut self, err: ParseError<R::Error>) -> Advance {
        match &err {
            ParseError::Syntax(e) => debug!("scan failed: {}", e),
            ParseError::UnexpectedEof => debug!("scan failed: unexpected end of input"),
            ParseError::Reader(_) => debug!("scan failed: reader error"),
            ParseError::MaxDepthReached => debug!("scan failed: maximum depth reached"),
        }
        self.kind = None;
        self.buffer.regions_mut().clear();
        self.status = Status::Failed(err);
        Advance::Failed
    }
}
