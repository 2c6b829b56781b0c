use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use tracing::debug;

use crate::buffer::TextBuffer;
use crate::buffer_builder::TextBufferBuilder;
use crate::config::BufferConfig;
use crate::error::Result;

/// Reads a UTF-8 file into a new buffer, `config.read_chunk_size` bytes at a
/// time. A code point split between two reads is carried over; a broken
/// sequence at the very end is decoded lossily.
pub fn load_from_path<P: AsRef<Path>>(path: P, config: &BufferConfig) -> Result<TextBuffer> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut builder = TextBufferBuilder::with_config(config);
    let mut buf = vec![0u8; config.read_chunk_size.max(1)];
    let mut carry: Vec<u8> = Vec::new();
    let mut chunks = 0usize;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        chunks += 1;

        // Combine carry + new bytes
        carry.extend_from_slice(&buf[..n]);

        // Find longest valid UTF-8 prefix
        let valid_len = match std::str::from_utf8(&carry) {
            Ok(_) => carry.len(),
            Err(e) if e.error_len().is_some() => {
                // Invalid in the middle, not merely truncated: decode lossily
                // up to the end of the bad sequence.
                let bad_end = e.valid_up_to() + e.error_len().unwrap_or(1);
                builder.accept_chunk(&String::from_utf8_lossy(&carry[..bad_end]));
                carry.drain(..bad_end);
                continue;
            }
            Err(e) => e.valid_up_to(),
        };

        if let Ok(text) = std::str::from_utf8(&carry[..valid_len]) {
            builder.accept_chunk(text);
        }

        // Keep any partial codepoint for the next read
        carry.drain(..valid_len);
    }

    // Flush any remaining carry
    if !carry.is_empty() {
        builder.accept_chunk(&String::from_utf8_lossy(&carry));
    }

    debug!(path = %path.display(), chunks, bytes = builder.len(), "loaded text buffer");
    Ok(builder.finish())
}

/// Writes the whole document to `path`, replacing its contents.
pub fn save_to_path<P: AsRef<Path>>(buffer: &TextBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    for piece in buffer.table().pieces() {
        writer.write_all(buffer.table().store().piece_text(piece).as_bytes())?;
    }
    writer.flush()?;
    debug!(path = %path.display(), chars = buffer.get_document_length(), "saved text buffer");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn load_small_reads_keep_code_points_whole() {
        let file = write_temp("héllo\r\nwörld €".as_bytes());
        let config = BufferConfig {
            read_chunk_size: 1,
            ..BufferConfig::default()
        };
        let buffer = load_from_path(file.path(), &config).unwrap();
        assert_eq!(buffer.get_text(), "héllo\nwörld €");
        assert_eq!(buffer.get_document_length(), 13);
    }

    #[test]
    fn load_without_normalization_keeps_crlf() {
        let file = write_temp(b"a\r\nb");
        let config = BufferConfig {
            normalize_line_endings: false,
            ..BufferConfig::default()
        };
        let buffer = load_from_path(file.path(), &config).unwrap();
        assert_eq!(buffer.get_text(), "a\r\nb");
        assert_eq!(buffer.get_line(0).unwrap(), "a\r\n");
    }

    #[test]
    fn invalid_bytes_are_replaced() {
        let file = write_temp(b"ok\xffok\xe2\x82");
        let buffer = load_from_path(file.path(), &BufferConfig::default()).unwrap();
        assert_eq!(buffer.get_text(), "ok\u{fffd}ok\u{fffd}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_from_path(dir.path().join("nope.txt"), &BufferConfig::default());
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");

        let mut buffer = TextBuffer::from("world\n");
        buffer.insert(0, "hello ");
        save_to_path(&buffer, &path).unwrap();

        let loaded = load_from_path(&path, &BufferConfig::default()).unwrap();
        assert_eq!(loaded.get_text(), "hello world\n");
        assert_eq!(loaded.get_line_count(), 2);
    }
}
