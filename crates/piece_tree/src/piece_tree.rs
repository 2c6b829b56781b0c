//! Piece-table text storage for an interactive editor.
//!
//! The document is kept as two append-only regions ([`TextStore`]) and an
//! ordered set of spans into them, indexed by a red-black [`PieceTree`].
//! [`PieceTable`] ties both together with a [`LineCache`] for line-oriented
//! queries.
//!
//! ```
//! use piece_tree::PieceTable;
//!
//! let mut table = PieceTable::new("HelloWorld");
//! table.insert(5, "12345");
//! assert_eq!(table.text(), "Hello12345World");
//! table.remove(3, 10);
//! assert_eq!(table.text(), "Helld");
//! ```

mod error;
mod line_cache;
mod store;
mod table;
mod tree;

pub use crate::error::{Error, InvariantViolation, Result};
pub use crate::line_cache::{Line, LineCache};
pub use crate::store::{Piece, Source, StringBuffer, TextStore};
pub use crate::table::{BufferCursor, PieceTable};
pub use crate::tree::{PieceTree, Pieces};

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
