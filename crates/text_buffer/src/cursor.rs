//! Caret placement over logical lines.
//!
//! The caret sits between chars; `position` is the offset of the char to its
//! right. At the end of an unterminated last line the caret keeps `Left`
//! affinity so a renderer can draw it after the final char rather than at the
//! start of a following line.

use crate::buffer::TextBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    Left,
    #[default]
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caret {
    position: usize,
    affinity: Affinity,
}

impl Caret {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn affinity(&self) -> Affinity {
        self.affinity
    }

    pub fn set_affinity(&mut self, affinity: Affinity) {
        self.affinity = affinity;
    }

    /// Moves to `position`, clamped to `[0, document length]`.
    pub fn set_position(&mut self, buffer: &TextBuffer, position: usize) {
        self.position = position.min(buffer.get_document_length());
    }

    /// Re-clamps the caret after the document changed under it.
    pub fn clamp(&mut self, buffer: &TextBuffer) {
        self.set_position(buffer, self.position);
    }

    pub fn move_left(&mut self, buffer: &TextBuffer) {
        if self.position > 0 {
            self.set_position(buffer, self.position - 1);
            self.affinity = Affinity::Right;
        }
    }

    pub fn move_right(&mut self, buffer: &TextBuffer) {
        if self.position < buffer.get_document_length() {
            self.set_position(buffer, self.position + 1);
            self.affinity = Affinity::Right;
        }
    }

    pub fn move_home(&mut self, buffer: &TextBuffer) {
        let line = buffer.get_position_at(self.position).line;
        if let Ok(start) = buffer.get_line_start(line) {
            self.set_position(buffer, start);
            self.affinity = Affinity::Right;
        }
    }

    /// Moves before the line's terminator, or to the document end on the last
    /// line.
    pub fn move_end(&mut self, buffer: &TextBuffer) {
        let line = buffer.get_position_at(self.position).line;
        let (Ok(start), Ok(content_len)) = (
            buffer.get_line_start(line),
            buffer.get_line_content_length(line),
        ) else {
            return;
        };
        self.set_position(buffer, start + content_len);
        self.affinity = if buffer.is_last_line(line) {
            Affinity::Left
        } else {
            Affinity::Right
        };
    }

    pub fn move_up(&mut self, buffer: &TextBuffer) {
        let current = buffer.get_position_at(self.position);
        if current.line == 0 {
            return;
        }
        self.move_to_line(buffer, current.line - 1, current.column);
    }

    pub fn move_down(&mut self, buffer: &TextBuffer) {
        let current = buffer.get_position_at(self.position);
        if buffer.is_last_line(current.line) {
            return;
        }
        self.move_to_line(buffer, current.line + 1, current.column);
    }

    // Keeps the column, clamped to the target line's content.
    fn move_to_line(&mut self, buffer: &TextBuffer, line: usize, column: usize) {
        let (Ok(start), Ok(content_len)) = (
            buffer.get_line_start(line),
            buffer.get_line_content_length(line),
        ) else {
            return;
        };
        self.set_position(buffer, start + column.min(content_len));
        self.affinity = Affinity::Right;
    }
}
