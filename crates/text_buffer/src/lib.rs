mod buffer;
mod buffer_builder;
mod config;
mod cursor;
mod error;
mod io;

pub use crate::buffer::{Position, TextBuffer};
pub use crate::buffer_builder::TextBufferBuilder;
pub use crate::config::BufferConfig;
pub use crate::cursor::{Affinity, Caret};
pub use crate::error::{Error, Result};
pub use crate::io::{load_from_path, save_to_path};
