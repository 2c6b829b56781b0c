use crate::buffer::TextBuffer;
use crate::config::BufferConfig;

/// Accumulates text arriving in pieces (typically file reads) into the
/// original region of a new [`TextBuffer`].
#[derive(Default, Debug)]
pub struct TextBufferBuilder {
    text: String,
    normalize_line_endings: bool,
    // A '\r' ending the previous chunk; it may pair with a '\n' in the next one.
    pending_cr: bool,
}

impl TextBufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &BufferConfig) -> Self {
        Self {
            normalize_line_endings: config.normalize_line_endings,
            ..Self::default()
        }
    }

    /// Accept a chunk of text (may include multiple lines).
    pub fn accept_chunk(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        if !self.normalize_line_endings {
            self.text.push_str(chunk);
            return;
        }

        self.text.reserve(chunk.len());
        for ch in chunk.chars() {
            if self.pending_cr {
                self.pending_cr = false;
                self.text.push('\n');
                if ch == '\n' {
                    continue;
                }
            }
            if ch == '\r' {
                self.pending_cr = true;
            } else {
                self.text.push(ch);
            }
        }
    }

    /// Bytes accepted so far.
    pub fn len(&self) -> usize {
        self.text.len() + usize::from(self.pending_cr)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finish building and return a `TextBuffer`.
    pub fn finish(mut self) -> TextBuffer {
        if self.pending_cr {
            self.text.push('\n');
        }
        TextBuffer::new(self.text)
    }
}
