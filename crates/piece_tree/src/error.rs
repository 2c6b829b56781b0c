use crate::store::Source;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Read-path contract violations. Write paths never produce these: out-of-range
/// inserts and removes are clamped or ignored instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("span of {length} chars at {start} is outside the {region:?} region ({region_len} chars)")]
    OutOfRange {
        region: Source,
        start: usize,
        length: usize,
        region_len: usize,
    },

    #[error("line index {index} is out of range (line count: {line_count})")]
    LineIndexOutOfRange { index: usize, line_count: usize },

    #[error("position {line}:{column} does not address a character of the document")]
    PositionOutOfRange { line: usize, column: usize },

    #[error("range {start}..{end} is outside the document (length: {len})")]
    SliceOutOfRange { start: usize, end: usize, len: usize },
}

/// A broken structural invariant, reported by the `validate` methods.
///
/// None of these can be produced by the public editing API; they exist so
/// tests can assert the tree and the line cache stay consistent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("root node is red")]
    RedRoot,

    #[error("red node {node} has a red child")]
    RedRed { node: usize },

    #[error("node {node} has black height {left} on the left and {right} on the right")]
    BlackHeightMismatch {
        node: usize,
        left: usize,
        right: usize,
    },

    #[error("node {node} caches length {cached} but its subtree holds {actual}")]
    LengthMismatch {
        node: usize,
        cached: usize,
        actual: usize,
    },

    #[error("node {node} caches {cached} line feeds but its subtree holds {actual}")]
    LineFeedMismatch {
        node: usize,
        cached: usize,
        actual: usize,
    },

    #[error("node {node} is not linked back to its parent")]
    BrokenParentLink { node: usize },

    #[error("leaf {node} holds an empty piece")]
    EmptyPiece { node: usize },

    #[error("document length is {cached} but the content holds {actual} chars")]
    TotalLengthMismatch { cached: usize, actual: usize },

    #[error("line cache covers {covered} chars of a {len} char document")]
    LineCacheLength { covered: usize, len: usize },

    #[error("line cache holds {cached} lines but the document has {expected}")]
    LineCount { cached: usize, expected: usize },
}
