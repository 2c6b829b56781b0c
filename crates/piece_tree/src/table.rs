use std::fmt;

use tracing::trace;

use crate::error::{Error, InvariantViolation, Result};
use crate::line_cache::{Line, LineCache};
use crate::store::TextStore;
use crate::tree::{PieceTree, Pieces};

/// A zero-based (line, column) pair. Columns count chars from the line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferCursor {
    pub line: usize,
    pub column: usize,
}

impl BufferCursor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// An editable document: the text store, the piece tree indexing it and the
/// line cache derived from both.
///
/// Positions and lengths count chars. Writes never fail: positions past the
/// end are clamped and empty or out-of-range edits are ignored. Reads that
/// address something outside the document return an [`Error`].
#[derive(Debug, Clone)]
pub struct PieceTable {
    store: TextStore,
    tree: PieceTree,
    lines: LineCache,
    total_length: usize,
}

impl PieceTable {
    pub fn new(original: impl Into<String>) -> Self {
        let store = TextStore::new(original);
        let mut tree = PieceTree::new();
        if let Some(piece) = store.original_piece() {
            tree.insert(&store, 0, piece);
        }
        let lines = LineCache::new(&tree, &store);
        let total_length = tree.len();
        Self {
            store,
            tree,
            lines,
            total_length,
        }
    }

    /// Inserts `text` before the char at `position`; a position past the end
    /// appends.
    pub fn insert(&mut self, position: usize, text: &str) {
        let Some(piece) = self.store.append(text) else {
            return;
        };
        if position > self.total_length {
            trace!(position, len = self.total_length, "clamping insert position");
        }
        let position = position.min(self.total_length);
        trace!(position, len = piece.len(), "insert");

        self.tree.insert(&self.store, position, piece);
        self.total_length += piece.len();
        self.lines.rebuild(&self.tree, &self.store);
    }

    /// Removes up to `length` chars starting at `position`.
    pub fn remove(&mut self, position: usize, length: usize) {
        if length == 0 || position >= self.total_length {
            trace!(position, length, len = self.total_length, "ignoring out-of-range remove");
            return;
        }
        let length = length.min(self.total_length - position);
        trace!(position, length, "remove");

        self.tree.remove(&self.store, position, length);
        self.total_length -= length;
        self.lines.rebuild(&self.tree, &self.store);
    }

    /// The whole document.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.total_length);
        for piece in self.tree.pieces() {
            text.push_str(self.store.piece_text(piece));
        }
        text
    }

    /// The chars in `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<String> {
        if start > end || end > self.total_length {
            return Err(Error::SliceOutOfRange {
                start,
                end,
                len: self.total_length,
            });
        }
        Ok(self.collect(start, end - start))
    }

    fn collect(&self, start: usize, length: usize) -> String {
        let mut out = String::new();
        let Some((mut leaf, mut offset)) = self.tree.locate(start) else {
            return out;
        };
        let mut remaining = length;
        while remaining > 0 {
            let Some(piece) = self.tree.piece(leaf) else {
                break;
            };
            let text = self.store.piece_text(piece);
            let take = remaining.min(piece.len() - offset);
            let from = str_indices::chars::to_byte_idx(text, offset);
            let to = from + str_indices::chars::to_byte_idx(&text[from..], take);
            out.push_str(&text[from..to]);
            remaining -= take;

            match self.tree.next_leaf(leaf) {
                Some(next) => leaf = next,
                None => break,
            }
            offset = 0;
        }
        out
    }

    /// Document length in chars.
    pub fn len(&self) -> usize {
        self.total_length
    }

    pub fn is_empty(&self) -> bool {
        self.total_length == 0
    }

    pub fn pieces(&self) -> Pieces<'_> {
        self.tree.pieces()
    }

    pub fn piece_count(&self) -> usize {
        self.tree.piece_count()
    }

    pub fn store(&self) -> &TextStore {
        &self.store
    }

    pub fn tree(&self) -> &PieceTree {
        &self.tree
    }

    // ---------- lines ----------

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_descriptors(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    /// Text of a line, including its `'\n'` unless it is the last line.
    pub fn line(&self, index: usize) -> Result<String> {
        let line = self.lines.get(index)?;
        Ok(self.collect(line.start(), line.len()))
    }

    pub fn line_length(&self, index: usize) -> Result<usize> {
        self.lines.get(index).map(Line::len)
    }

    /// Length of a line without its terminator.
    pub fn line_content_len(&self, index: usize) -> Result<usize> {
        let line = self.lines.get(index)?;
        if self.lines.is_last(index) {
            Ok(line.len())
        } else {
            Ok(line.len().saturating_sub(1))
        }
    }

    pub fn is_last_line(&self, index: usize) -> bool {
        self.lines.is_last(index)
    }

    pub fn line_start(&self, index: usize) -> Result<usize> {
        self.lines.get(index).map(Line::start)
    }

    pub fn line_end(&self, index: usize) -> Result<usize> {
        self.lines.get(index).map(Line::end)
    }

    /// Line holding `offset`; offsets past the end map to the last line.
    pub fn line_index_at(&self, offset: usize) -> usize {
        self.lines.line_index_at(offset.min(self.total_length))
    }

    pub fn column_at(&self, offset: usize) -> usize {
        self.position_at(offset).column
    }

    pub fn position_at(&self, offset: usize) -> BufferCursor {
        let offset = offset.min(self.total_length);
        let line = self.lines.line_index_at(offset);
        let start = self.lines.get(line).map_or(0, Line::start);
        BufferCursor::new(line, offset - start)
    }

    /// Document offset of `column` on `line`. Any char of the line can be
    /// addressed; one past the last char only on the last line.
    pub fn offset_at(&self, line: usize, column: usize) -> Result<usize> {
        let descriptor = self.lines.get(line)?;
        let max_column = if self.lines.is_last(line) {
            descriptor.len()
        } else {
            descriptor.len().saturating_sub(1)
        };
        if column > max_column {
            return Err(Error::PositionOutOfRange { line, column });
        }
        Ok(descriptor.start() + column)
    }

    pub fn offset_at_cursor(&self, cursor: BufferCursor) -> Result<usize> {
        self.offset_at(cursor.line, cursor.column)
    }

    /// Checks the tree invariants and that the cached length and line cache
    /// agree with the content.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        self.tree.validate()?;

        let actual: usize = self.pieces().map(|piece| piece.len()).sum();
        if self.total_length != actual || self.tree.len() != actual {
            return Err(InvariantViolation::TotalLengthMismatch {
                cached: self.total_length,
                actual,
            });
        }
        let covered = self.lines.covered_len();
        if covered != self.total_length {
            return Err(InvariantViolation::LineCacheLength {
                covered,
                len: self.total_length,
            });
        }
        let expected = self.tree.line_feeds() + 1;
        if self.lines.len() != expected {
            return Err(InvariantViolation::LineCount {
                cached: self.lines.len(),
                expected,
            });
        }
        Ok(())
    }
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl From<&str> for PieceTable {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for PieceTable {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for PieceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in self.tree.pieces() {
            f.write_str(self.store.piece_text(piece))?;
        }
        Ok(())
    }
}
