use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use piece_tree::{BufferCursor, PieceTable};

use crate::error::Result;

/// Public alias for positions (0-based line/column), forwarded from piece_tree.
pub type Position = BufferCursor;

/// The document as seen by input handling, layout and cursor logic.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    table: PieceTable,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            table: PieceTable::new(text),
        }
    }

    /// Build from multiple chunks, concatenated in order.
    pub fn from_chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for chunk in chunks {
            text.push_str(chunk.as_ref());
        }
        Self::new(text)
    }

    /// Insert `value` at char `offset`. Offsets past the end append.
    pub fn insert(&mut self, offset: usize, value: &str) {
        self.table.insert(offset, value);
    }

    /// Delete `len` chars starting at char `offset`; the range is clamped to
    /// the document.
    pub fn delete(&mut self, offset: usize, len: usize) {
        self.table.remove(offset, len);
    }

    /// Convenience: insert at (line, column), both 0-based.
    pub fn insert_at(&mut self, line: usize, column: usize, value: &str) -> Result<()> {
        let offset = self.get_offset_at(line, column)?;
        self.insert(offset, value);
        Ok(())
    }

    /// Convenience: delete a range given by its start (line, column) and a
    /// length in chars.
    pub fn delete_at(&mut self, line: usize, column: usize, len: usize) -> Result<()> {
        let offset = self.get_offset_at(line, column)?;
        self.delete(offset, len);
        Ok(())
    }

    /// Get complete text content.
    pub fn get_text(&self) -> String {
        self.table.text()
    }

    /// Get the document length in chars.
    pub fn get_document_length(&self) -> usize {
        self.table.len()
    }

    /// Get the number of lines (empty doc => 1 line).
    pub fn get_line_count(&self) -> usize {
        self.table.line_count()
    }

    /// Get content of a line (0-based), trailing `'\n'` included.
    pub fn get_line(&self, line: usize) -> Result<String> {
        Ok(self.table.line(line)?)
    }

    /// All lines in order, trailing `'\n'` included.
    pub fn get_lines(&self) -> Vec<String> {
        (0..self.get_line_count())
            .filter_map(|line| self.table.line(line).ok())
            .collect()
    }

    /// Length of a line in chars, trailing `'\n'` included.
    pub fn get_line_length(&self, line: usize) -> Result<usize> {
        Ok(self.table.line_length(line)?)
    }

    /// Length of a line in chars, without its `'\n'`.
    pub fn get_line_content_length(&self, line: usize) -> Result<usize> {
        Ok(self.table.line_content_len(line)?)
    }

    pub fn is_last_line(&self, line: usize) -> bool {
        self.table.is_last_line(line)
    }

    /// Offset of the first char of `line`.
    pub fn get_line_start(&self, line: usize) -> Result<usize> {
        Ok(self.table.line_start(line)?)
    }

    /// 0-based (line, column) to char offset.
    pub fn get_offset_at(&self, line: usize, column: usize) -> Result<usize> {
        Ok(self.table.offset_at(line, column)?)
    }

    /// Char offset to 0-based position; offsets past the end are clamped.
    pub fn get_position_at(&self, offset: usize) -> Position {
        self.table.position_at(offset)
    }

    pub fn table(&self) -> &PieceTable {
        &self.table
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl FromStr for TextBuffer {
    type Err = Infallible;

    /// Build from a single string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.table, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn basic_operations() {
        let mut buffer: TextBuffer = "Hello\nWorld".parse().unwrap();
        assert_eq!(buffer.get_document_length(), 11);
        assert_eq!(buffer.get_line_count(), 2);

        buffer.insert(5, " Rust");
        assert_eq!(buffer.get_text(), "Hello Rust\nWorld");
        assert_eq!(buffer.get_line(0).unwrap(), "Hello Rust\n");
        assert_eq!(buffer.get_line(1).unwrap(), "World");
        assert_eq!(buffer.get_lines(), vec!["Hello Rust\n", "World"]);
    }

    #[test]
    fn edits_by_line_and_column() {
        let mut buffer = TextBuffer::from("foo\nbar\nbaz");
        buffer.insert_at(1, 3, "!").unwrap();
        buffer.delete_at(2, 0, 1).unwrap();
        assert_eq!(buffer.get_text(), "foo\nbar!\naz");

        let err = buffer.insert_at(5, 0, "x").unwrap_err();
        assert!(matches!(
            err,
            Error::Buffer(piece_tree::Error::LineIndexOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn from_chunks_concatenates() {
        let buffer = TextBuffer::from_chunks(["foo\n", "", "bar\nbaz"]);
        assert_eq!(buffer.get_lines(), vec!["foo\n", "bar\n", "baz"]);
        assert_eq!(buffer.to_string(), "foo\nbar\nbaz");
    }

    #[test]
    fn positions_round_trip() {
        let buffer = TextBuffer::from("ab\n\ncd");
        for offset in 0..=buffer.get_document_length() {
            let position = buffer.get_position_at(offset);
            assert_eq!(
                buffer.get_offset_at(position.line, position.column).unwrap(),
                offset
            );
        }
        assert_eq!(buffer.get_position_at(3), Position::new(1, 0));
        assert_eq!(buffer.get_line_content_length(0).unwrap(), 2);
        assert_eq!(buffer.get_line_length(1).unwrap(), 1);
        assert_eq!(buffer.get_line_start(2).unwrap(), 4);
    }
}
