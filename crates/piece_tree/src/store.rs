use std::ops::Range;

use crate::error::{Error, Result};

/// Which backing region a [`Piece`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Original,
    Added,
}

/// A span of one region. Offsets are counted in chars; the resolved byte range
/// and the number of `'\n'` in the span are computed once, when the piece is
/// created, and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    source: Source,
    start: usize,
    length: usize,
    byte_start: usize,
    byte_len: usize,
    line_feeds: usize,
}

impl Piece {
    pub fn source(&self) -> Source {
        self.source
    }

    /// Char offset of the span inside its region.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn line_feeds(&self) -> usize {
        self.line_feeds
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.byte_start..self.byte_start + self.byte_len
    }
}

/// One append-only character region.
#[derive(Debug, Clone, Default)]
pub struct StringBuffer {
    buffer: String,
    chars: usize,
}

impl StringBuffer {
    pub fn new(buffer: String) -> Self {
        let chars = str_indices::chars::count(&buffer);
        Self { buffer, chars }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.chars == 0
    }

    fn push_str(&mut self, text: &str) -> (usize, usize) {
        let start = (self.chars, self.buffer.len());
        self.buffer.push_str(text);
        self.chars += str_indices::chars::count(text);
        start
    }
}

/// The two regions a document is made of: the text it was opened with, and
/// everything typed since. Neither is ever edited in place.
#[derive(Debug, Clone, Default)]
pub struct TextStore {
    original: StringBuffer,
    added: StringBuffer,
}

impl TextStore {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: StringBuffer::new(original.into()),
            added: StringBuffer::default(),
        }
    }

    pub fn region(&self, source: Source) -> &StringBuffer {
        match source {
            Source::Original => &self.original,
            Source::Added => &self.added,
        }
    }

    /// A piece covering the whole original region, or `None` when the document
    /// was opened empty.
    pub fn original_piece(&self) -> Option<Piece> {
        if self.original.is_empty() {
            return None;
        }
        Some(Piece {
            source: Source::Original,
            start: 0,
            length: self.original.len(),
            byte_start: 0,
            byte_len: self.original.buffer.len(),
            line_feeds: str_indices::lines_lf::count_breaks(self.original.as_str()),
        })
    }

    /// Appends `text` to the add region and returns the piece referencing it.
    /// Empty text appends nothing and yields no piece.
    pub fn append(&mut self, text: &str) -> Option<Piece> {
        if text.is_empty() {
            return None;
        }
        let (start, byte_start) = self.added.push_str(text);
        Some(Piece {
            source: Source::Added,
            start,
            length: self.added.len() - start,
            byte_start,
            byte_len: text.len(),
            line_feeds: str_indices::lines_lf::count_breaks(text),
        })
    }

    /// Reads `length` chars starting at char `start` of a region.
    pub fn read(&self, source: Source, start: usize, length: usize) -> Result<&str> {
        let region = self.region(source);
        let in_bounds = start
            .checked_add(length)
            .is_some_and(|end| end <= region.len());
        if !in_bounds {
            return Err(Error::OutOfRange {
                region: source,
                start,
                length,
                region_len: region.len(),
            });
        }
        let text = region.as_str();
        let byte_start = str_indices::chars::to_byte_idx(text, start);
        let byte_len = str_indices::chars::to_byte_idx(&text[byte_start..], length);
        Ok(&text[byte_start..byte_start + byte_len])
    }

    pub fn piece_text(&self, piece: &Piece) -> &str {
        &self.region(piece.source).as_str()[piece.byte_range()]
    }

    /// Narrows `piece` to the char range `chars`, relative to the piece start.
    pub fn slice_piece(&self, piece: &Piece, chars: Range<usize>) -> Piece {
        debug_assert!(chars.start < chars.end && chars.end <= piece.length);
        let text = self.piece_text(piece);
        let from = str_indices::chars::to_byte_idx(text, chars.start);
        let to = from + str_indices::chars::to_byte_idx(&text[from..], chars.end - chars.start);
        Piece {
            source: piece.source,
            start: piece.start + chars.start,
            length: chars.end - chars.start,
            byte_start: piece.byte_start + from,
            byte_len: to - from,
            line_feeds: str_indices::lines_lf::count_breaks(&text[from..to]),
        }
    }

    /// Splits `piece` before the char at `at`. Both halves are non-empty as
    /// long as `0 < at < piece.len()`.
    pub fn split_piece(&self, piece: &Piece, at: usize) -> (Piece, Piece) {
        (
            self.slice_piece(piece, 0..at),
            self.slice_piece(piece, at..piece.length),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_only_grows_added_region() {
        let mut store = TextStore::new("abc");
        let first = store.append("de").unwrap();
        let second = store.append("f\ng").unwrap();

        assert_eq!(first.start(), 0);
        assert_eq!(second.start(), 2);
        assert_eq!(second.len(), 3);
        assert_eq!(second.line_feeds(), 1);
        assert_eq!(store.region(Source::Added).as_str(), "def\ng");
        assert_eq!(store.region(Source::Original).as_str(), "abc");
        assert_eq!(store.piece_text(&first), "de");
    }

    #[test]
    fn empty_text_yields_no_piece() {
        let mut store = TextStore::new("");
        assert!(store.append("").is_none());
        assert!(store.original_piece().is_none());
    }

    #[test]
    fn read_counts_chars_not_bytes() {
        let mut store = TextStore::new("héllo");
        store.append("wörld").unwrap();

        assert_eq!(store.read(Source::Original, 1, 3).unwrap(), "éll");
        assert_eq!(store.read(Source::Added, 1, 4).unwrap(), "örld");
        assert_eq!(store.read(Source::Added, 5, 0).unwrap(), "");
    }

    #[test]
    fn read_past_region_end_is_an_error() {
        let store = TextStore::new("abc");
        assert_eq!(
            store.read(Source::Original, 2, 2),
            Err(Error::OutOfRange {
                region: Source::Original,
                start: 2,
                length: 2,
                region_len: 3,
            })
        );
        assert!(store.read(Source::Added, 0, 1).is_err());
        assert!(store.read(Source::Original, usize::MAX, 2).is_err());
    }

    #[test]
    fn split_keeps_offsets_and_line_feeds() {
        let store = TextStore::new("ab\ncdé\nf");
        let piece = store.original_piece().unwrap();
        assert_eq!(piece.line_feeds(), 2);

        let (head, tail) = store.split_piece(&piece, 5);
        assert_eq!(store.piece_text(&head), "ab\ncd");
        assert_eq!(store.piece_text(&tail), "é\nf");
        assert_eq!(head.line_feeds(), 1);
        assert_eq!(tail.line_feeds(), 1);
        assert_eq!(tail.start(), 5);
        assert_eq!(tail.len(), 3);

        let middle = store.slice_piece(&tail, 0..1);
        assert_eq!(store.piece_text(&middle), "é");
        assert_eq!(middle.byte_range().len(), 2);
    }
}
