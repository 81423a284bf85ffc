// SPDX-License-Identifier: Apache-2.0

use alloc::vec;
use alloc::vec::Vec;

use log::{debug, trace};

use crate::escape_processor::{cook, Cooked};
use crate::reader::Reader;

/// Which pending region a token's bytes belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The member name of the current value.
    Name,
    /// The text of the current scalar value.
    Value,
}

/// State of the bytes a region points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Text {
    /// The buffer bytes are the final text.
    Raw,
    /// Escapes or non-ASCII bytes were seen; cook before handing out.
    Escaped,
    /// Cooking spilled; the text lives in the slot's spill buffer.
    Spilled,
}

/// Location of a name or value inside the scan buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Region {
    pub start: usize,
    /// `None` until the token's closing byte has been seen.
    pub end: Option<usize>,
    pub text: Text,
}

/// The two pending regions. Offsets are rewritten on every refill.
#[derive(Debug, Default)]
pub(crate) struct Regions([Option<Region>; 2]);

impl Regions {
    fn slot(&self, slot: Slot) -> &Option<Region> {
        let [name, value] = &self.0;
        match slot {
            Slot::Name => name,
            Slot::Value => value,
        }
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Region> {
        let [name, value] = &mut self.0;
        match slot {
            Slot::Name => name,
            Slot::Value => value,
        }
    }

    /// Start a region whose closing byte is not known yet.
    pub fn open(&mut self, slot: Slot, start: usize) {
        *self.slot_mut(slot) = Some(Region {
            start,
            end: None,
            text: Text::Raw,
        });
    }

    /// Close the open region in `slot` at `end` (exclusive).
    pub fn close(&mut self, slot: Slot, end: usize, escaped: bool) {
        if let Some(region) = self.slot_mut(slot) {
            region.end = Some(end);
            region.text = if escaped { Text::Escaped } else { Text::Raw };
        }
    }

    pub fn get(&self, slot: Slot) -> Option<Region> {
        *self.slot(slot)
    }

    pub fn clear(&mut self) {
        self.0 = [None, None];
    }
}

/// Owns the scanner's input bytes.
///
/// Bytes are consumed from `tokenize_pos` up to `data_end`. Before each read
/// the live bytes (pending regions and the unconsumed tail) are packed at the
/// front of the buffer, growing it first if the free space would drop below
/// `min_read`.
pub(crate) struct ScanBuffer {
    buffer: Vec<u8>,
    /// Next byte to hand to the tokenizer
    tokenize_pos: usize,
    /// End of valid data from the reader
    data_end: usize,
    /// Stream offset of buffer index 0, valid for bytes at or after `tokenize_pos`
    origin: usize,
    min_read: usize,
    regions: Regions,
    spill: [Vec<u8>; 2],
}

impl ScanBuffer {
    pub fn new(capacity: usize, min_read: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            tokenize_pos: 0,
            data_end: 0,
            origin: 0,
            min_read: min_read.max(1),
            regions: Regions::default(),
            spill: [Vec::new(), Vec::new()],
        }
    }

    /// Hand out the next byte and its buffer position, advancing past it.
    pub fn next_byte(&mut self) -> Option<(u8, usize)> {
        if self.tokenize_pos >= self.data_end {
            return None;
        }
        let pos = self.tokenize_pos;
        let byte = self.buffer.get(pos).copied()?;
        self.tokenize_pos = pos.wrapping_add(1);
        Some((byte, pos))
    }

    /// Un-consume the last byte. Numbers end on a byte of the next token.
    pub fn step_back(&mut self) {
        self.tokenize_pos = self.tokenize_pos.saturating_sub(1);
    }

    pub fn position(&self) -> usize {
        self.tokenize_pos
    }

    /// Stream offset of a buffer position at or after the cursor.
    pub fn stream_offset(&self, pos: usize) -> usize {
        self.origin.wrapping_add(pos)
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[cfg(test)]
    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    pub fn regions_mut(&mut self) -> &mut Regions {
        &mut self.regions
    }

    /// Bytes that must survive the next refill.
    fn live_bytes(&self) -> usize {
        let regions: usize = self
            .regions
            .0
            .iter()
            .flatten()
            .map(|r| r.end.unwrap_or(self.tokenize_pos).saturating_sub(r.start))
            .sum();
        regions + self.data_end.saturating_sub(self.tokenize_pos)
    }

    /// Pack live bytes at the front (growing first if needed) and issue one
    /// read into the free space. Returns the number of bytes read; zero means
    /// the reader is exhausted.
    pub fn fill<R: Reader>(&mut self, reader: &mut R) -> Result<usize, R::Error> {
        let live = self.live_bytes();
        if self.buffer.len().saturating_sub(live) < self.min_read {
            let capacity = self
                .buffer
                .len()
                .saturating_mul(2)
                .saturating_add(self.min_read);
            debug!(
                "growing scan buffer from {} to {} bytes ({} live)",
                self.buffer.len(),
                capacity,
                live
            );
            let mut grown = vec![0; capacity];
            self.compact(Some(&mut grown));
            self.buffer = grown;
        } else {
            self.compact(None);
        }

        let fill_slice = self.buffer.get_mut(self.data_end..).unwrap_or_default();
        let bytes_read = reader.read(fill_slice)?.min(fill_slice.len());
        self.data_end = self.data_end.wrapping_add(bytes_read);
        trace!(
            "read {} bytes, {} live bytes preserved, capacity {}",
            bytes_read,
            live,
            self.buffer.len()
        );
        Ok(bytes_read)
    }

    /// Move the pending regions and the unconsumed tail, in buffer order, to
    /// the front of `target` (or of the current buffer when `None`), rewriting
    /// every offset that points at them.
    fn compact(&mut self, mut target: Option<&mut Vec<u8>>) {
        let cursor = self.tokenize_pos;

        // (source start, source end, region index or tail)
        let mut spans: [(usize, usize, Option<usize>); 3] = [(0, 0, None); 3];
        let mut count = 0;
        for (index, region) in self.regions.0.iter().enumerate() {
            if let Some(region) = region {
                let end = region.end.unwrap_or(cursor);
                spans[count] = (region.start, end, Some(index));
                count += 1;
            }
        }
        spans[count] = (cursor, self.data_end, None);
        count += 1;
        let spans = &mut spans[..count];
        spans.sort_unstable_by_key(|&(start, _, _)| start);

        let mut dest = 0;
        for &(start, end, index) in spans.iter() {
            let len = end.saturating_sub(start);
            match target.as_deref_mut() {
                Some(grown) => {
                    if let (Some(to), Some(from)) =
                        (grown.get_mut(dest..dest + len), self.buffer.get(start..end))
                    {
                        to.copy_from_slice(from);
                    }
                }
                // Spans are visited in ascending order and never overlap, so
                // `dest <= start` and no later source is overwritten.
                None if start != dest => self.buffer.copy_within(start..end, dest),
                None => {}
            }

            match index.and_then(|i| self.regions.0.get_mut(i)).and_then(Option::as_mut) {
                Some(region) => {
                    region.start = dest;
                    if let Some(region_end) = region.end.as_mut() {
                        *region_end = dest + len;
                    }
                }
                None => {
                    self.origin = self.origin.wrapping_add(cursor).wrapping_sub(dest);
                    self.tokenize_pos = dest;
                    self.data_end = dest + len;
                }
            }
            dest += len;
        }
    }

    /// Final bytes of the region in `slot`, cooking them on first access.
    ///
    /// Returns `None` if the slot is empty or its region is still open.
    pub fn text(&mut self, slot: Slot) -> Option<&[u8]> {
        let region = self.regions.get(slot)?;
        let end = region.end?;
        let spill = match slot {
            Slot::Name => &mut self.spill[0],
            Slot::Value => &mut self.spill[1],
        };

        match region.text {
            Text::Raw => self.buffer.get(region.start..end),
            Text::Spilled => Some(spill.as_slice()),
            Text::Escaped => {
                let raw = self.buffer.get_mut(region.start..end)?;
                match cook(raw, spill) {
                    Cooked::InPlace(len) => {
                        let cooked_end = region.start + len;
                        if let Some(r) = self.regions.slot_mut(slot) {
                            r.end = Some(cooked_end);
                            r.text = Text::Raw;
                        }
                        self.buffer.get(region.start..cooked_end)
                    }
                    Cooked::Spilled => {
                        if let Some(r) = self.regions.slot_mut(slot) {
                            r.text = Text::Spilled;
                        }
                        Some(spill.as_slice())
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ChunkReader;
    use test_log::test;

    fn filled(data: &[u8], capacity: usize, min_read: usize) -> (ScanBuffer, ChunkReader<'_>) {
        let mut reader = ChunkReader::full_slice(data);
        let mut buffer = ScanBuffer::new(capacity, min_read);
        buffer.fill(&mut reader).unwrap();
        (buffer, reader)
    }

    fn consume(buffer: &mut ScanBuffer, count: usize) {
        for _ in 0..count {
            buffer.next_byte().unwrap();
        }
    }

    #[test]
    fn test_next_byte_and_step_back() {
        let (mut buffer, _) = filled(b"ab", 16, 4);
        assert_eq!(buffer.next_byte(), Some((b'a', 0)));
        assert_eq!(buffer.next_byte(), Some((b'b', 1)));
        assert_eq!(buffer.next_byte(), None);
        buffer.step_back();
        assert_eq!(buffer.next_byte(), Some((b'b', 1)));
    }

    #[test]
    fn test_fill_reports_exhausted_reader() {
        let (mut buffer, mut reader) = filled(b"x", 16, 4);
        consume(&mut buffer, 1);
        assert_eq!(buffer.fill(&mut reader).unwrap(), 0);
        assert_eq!(buffer.next_byte(), None);
    }

    #[test]
    fn test_refill_drops_consumed_bytes() {
        let mut reader = ChunkReader::new(b"0123456789", 4);
        let mut buffer = ScanBuffer::new(8, 4);
        assert_eq!(buffer.fill(&mut reader).unwrap(), 4);
        consume(&mut buffer, 4);

        assert_eq!(buffer.fill(&mut reader).unwrap(), 4);
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.next_byte(), Some((b'4', 0)));
        // Offsets keep counting from the start of the stream
        assert_eq!(buffer.stream_offset(0), 4);
        assert_eq!(buffer.capacity(), 8);
    }

    #[test]
    fn test_refill_relocates_open_region() {
        let mut reader = ChunkReader::new(br#""hello world""#, 6);
        let mut buffer = ScanBuffer::new(8, 2);
        buffer.fill(&mut reader).unwrap();
        consume(&mut buffer, 6);
        // String content starts after the quote at position 0
        buffer.regions_mut().open(Slot::Value, 1);

        buffer.fill(&mut reader).unwrap();
        let region = buffer.regions().get(Slot::Value).unwrap();
        assert_eq!(region.start, 0);
        assert_eq!(region.end, None);
        assert_eq!(buffer.position(), 5);
        assert_eq!(&buffer.as_slice()[..5], b"hello");
    }

    #[test]
    fn test_refill_relocates_closed_name_and_open_value() {
        let json = br#""key"  :  "value""#;
        let mut reader = ChunkReader::new(json, 14);
        let mut buffer = ScanBuffer::new(16, 2);
        buffer.fill(&mut reader).unwrap();
        consume(&mut buffer, 14);
        buffer.regions_mut().open(Slot::Name, 1);
        buffer.regions_mut().close(Slot::Name, 4, false);
        buffer.regions_mut().open(Slot::Value, 11);

        buffer.fill(&mut reader).unwrap();
        let name = buffer.regions().get(Slot::Name).unwrap();
        let value = buffer.regions().get(Slot::Value).unwrap();
        assert_eq!((name.start, name.end), (0, Some(3)));
        assert_eq!((value.start, value.end), (3, None));
        assert_eq!(buffer.position(), 6);
        assert_eq!(&buffer.as_slice()[..6], b"keyval");

        // Finish scanning the value and close it
        consume(&mut buffer, 2);
        buffer.regions_mut().close(Slot::Value, 8, false);
        assert_eq!(buffer.text(Slot::Name), Some(&b"key"[..]));
        assert_eq!(buffer.text(Slot::Value), Some(&b"value"[..]));
    }

    #[test]
    fn test_grows_when_live_bytes_leave_too_little_room() {
        let json = b"\"abcdefghijklmnop\"";
        let mut reader = ChunkReader::new(json, 4);
        let mut buffer = ScanBuffer::new(4, 4);
        buffer.fill(&mut reader).unwrap();
        consume(&mut buffer, 4);
        buffer.regions_mut().open(Slot::Value, 1);

        buffer.fill(&mut reader).unwrap();
        assert_eq!(buffer.capacity(), 12);
        let region = buffer.regions().get(Slot::Value).unwrap();
        assert_eq!(region.start, 0);
        assert_eq!(&buffer.as_slice()[..7], b"abcdefg");
    }

    #[test]
    fn test_open_region_is_not_readable() {
        let (mut buffer, _) = filled(b"\"abc", 16, 4);
        buffer.regions_mut().open(Slot::Value, 1);
        assert_eq!(buffer.text(Slot::Value), None);
        assert_eq!(buffer.text(Slot::Name), None);
    }

    #[test]
    fn test_text_cooks_once() {
        let (mut buffer, _) = filled(br#""a\\nb""#, 16, 4);
        buffer.regions_mut().open(Slot::Value, 1);
        buffer.regions_mut().close(Slot::Value, 6, true);

        assert_eq!(buffer.text(Slot::Value), Some(&b"a\\nb"[..]));
        // A second access must not unescape again
        assert_eq!(buffer.text(Slot::Value), Some(&b"a\\nb"[..]));
    }

    #[test]
    fn test_text_spills_on_growth() {
        let (mut buffer, _) = filled(b"\"a\x80b\"", 16, 4);
        buffer.regions_mut().open(Slot::Value, 1);
        buffer.regions_mut().close(Slot::Value, 4, true);

        assert_eq!(buffer.text(Slot::Value), Some("a\u{FFFD}b".as_bytes()));
        assert_eq!(
            buffer.regions().get(Slot::Value).map(|r| r.text),
            Some(Text::Spilled)
        );
        assert_eq!(buffer.text(Slot::Value), Some("a\u{FFFD}b".as_bytes()));
    }
}
