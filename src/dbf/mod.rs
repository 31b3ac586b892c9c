//! Core dBASE table reader module

pub mod codec;
pub mod describe;
pub mod format;
pub mod iter;
pub mod reader;
pub mod types;
pub mod utils;

pub use reader::DbfReader;
pub use types::error::{DbfError, Result};
