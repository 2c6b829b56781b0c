use serde::{Deserialize, Serialize};

/// Options for building a [`TextBuffer`](crate::TextBuffer) from external text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferConfig {
    /// Bytes requested per read when loading a file.
    pub read_chunk_size: usize,
    /// Rewrite `"\r\n"` and lone `'\r'` to `'\n'`, the only line terminator
    /// the buffer recognizes.
    pub normalize_line_endings: bool,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 64 * 1024,
            normalize_line_endings: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: BufferConfig = serde_json::from_str(r#"{ "read_chunk_size": 16 }"#).unwrap();
        assert_eq!(config.read_chunk_size, 16);
        assert!(config.normalize_line_endings);

        let config: BufferConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BufferConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<BufferConfig>(r#"{ "eol": "crlf" }"#);
        assert!(result.is_err());
    }
}
