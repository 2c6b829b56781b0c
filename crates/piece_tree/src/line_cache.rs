use tracing::trace;

use crate::error::{Error, Result};
use crate::store::TextStore;
use crate::tree::PieceTree;

/// One logical line. `length` counts the trailing `'\n'` for every line but
/// the last, which never has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Line {
    start: usize,
    start_piece: usize,
    offset_in_piece: usize,
    length: usize,
}

impl Line {
    /// Document offset of the first char.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Index, in document order, of the piece the line starts in.
    pub fn start_piece(&self) -> usize {
        self.start_piece
    }

    pub fn offset_in_piece(&self) -> usize {
        self.offset_in_piece
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Offset one past the last char, terminator included.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Line descriptors for the whole document, rebuilt after every edit. Never
/// empty: an empty document has a single zero-length line.
#[derive(Debug, Clone)]
pub struct LineCache {
    lines: Vec<Line>,
}

impl Default for LineCache {
    fn default() -> Self {
        Self {
            lines: vec![Line::default()],
        }
    }
}

impl LineCache {
    pub fn new(tree: &PieceTree, store: &TextStore) -> Self {
        let mut cache = Self::default();
        cache.rebuild(tree, store);
        cache
    }

    pub fn rebuild(&mut self, tree: &PieceTree, store: &TextStore) {
        self.lines.clear();
        let mut current = Line::default();
        let mut offset = 0;

        for (index, piece) in tree.pieces().enumerate() {
            if piece.line_feeds() == 0 {
                current.length += piece.len();
            } else {
                for (at, ch) in store.piece_text(piece).chars().enumerate() {
                    current.length += 1;
                    if ch != '\n' {
                        continue;
                    }
                    self.lines.push(current);
                    let (start_piece, offset_in_piece) = if at + 1 < piece.len() {
                        (index, at + 1)
                    } else {
                        (index + 1, 0)
                    };
                    current = Line {
                        start: offset + at + 1,
                        start_piece,
                        offset_in_piece,
                        length: 0,
                    };
                }
            }
            offset += piece.len();
        }

        self.lines.push(current);
        trace!(lines = self.lines.len(), "rebuilt line cache");
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Line> {
        self.lines.get(index).ok_or(Error::LineIndexOutOfRange {
            index,
            line_count: self.lines.len(),
        })
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.lines.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Line> {
        self.lines.iter()
    }

    /// The line containing `offset`. Offsets past the end map to the last line.
    pub fn line_index_at(&self, offset: usize) -> usize {
        self.lines
            .partition_point(|line| line.start <= offset)
            .saturating_sub(1)
    }

    /// Sum of every line length; equal to the document length.
    pub fn covered_len(&self) -> usize {
        self.lines.iter().map(Line::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_for(pieces: &[&str]) -> LineCache {
        let mut store = TextStore::new("");
        let mut tree = PieceTree::new();
        for text in pieces {
            let piece = store.append(text).unwrap();
            tree.insert(&store, tree.len(), piece);
        }
        LineCache::new(&tree, &store)
    }

    fn lengths(cache: &LineCache) -> Vec<usize> {
        cache.iter().map(Line::len).collect()
    }

    #[test]
    fn empty_document_has_one_empty_line() {
        let cache = cache_for(&[]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(0).unwrap().is_empty());
        assert!(cache.is_last(0));
    }

    #[test]
    fn terminator_belongs_to_the_line_it_ends() {
        let cache = cache_for(&["line1\nline2\nlast"]);
        assert_eq!(lengths(&cache), vec![6, 6, 4]);
        assert_eq!(cache.get(1).unwrap().start(), 6);
        assert_eq!(cache.get(2).unwrap().end(), 16);
    }

    #[test]
    fn trailing_newline_opens_an_empty_last_line() {
        let cache = cache_for(&["a\nb\n"]);
        assert_eq!(lengths(&cache), vec![2, 2, 0]);
        assert_eq!(cache.get(2).unwrap().start(), 4);
    }

    #[test]
    fn lines_spanning_pieces() {
        let cache = cache_for(&["fo", "o\nb", "ar", "\n", "baz"]);
        assert_eq!(lengths(&cache), vec![4, 4, 3]);

        let second = cache.get(1).unwrap();
        assert_eq!(second.start_piece(), 1);
        assert_eq!(second.offset_in_piece(), 2);

        // The terminator is the last char of piece 3, so line 2 opens in piece 4.
        let third = cache.get(2).unwrap();
        assert_eq!(third.start_piece(), 4);
        assert_eq!(third.offset_in_piece(), 0);
        assert_eq!(cache.covered_len(), 11);
    }

    #[test]
    fn line_index_at_offsets() {
        let cache = cache_for(&["ab\ncd\n"]);
        assert_eq!(cache.line_index_at(0), 0);
        assert_eq!(cache.line_index_at(2), 0);
        assert_eq!(cache.line_index_at(3), 1);
        assert_eq!(cache.line_index_at(6), 2);
        assert_eq!(cache.line_index_at(60), 2);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let cache = cache_for(&["one\ntwo"]);
        assert_eq!(
            cache.get(2),
            Err(Error::LineIndexOutOfRange {
                index: 2,
                line_count: 2,
            })
        );
    }
}
