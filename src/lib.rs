//! # dbf-reader
//!
//! A streaming reader for dBASE-family table files (.dbf).
//!
//! The header and its field descriptors are parsed once when a table is
//! opened; records are then decoded one at a time into typed [`Row`]s.
//! Numeric (`N`), date (`D`), logical (`L`) and character (`C`) fields are
//! supported. Other legacy field types are rejected when the header is read.
//!
//! Real-world files often deviate from the nominal layout (polluted reserved
//! bytes, a `\0` header terminator). Such deviations are reported through
//! [`DbfReader::deviations`] and the `log` facade instead of failing.
//!
//! ```no_run
//! use dbf_reader::DbfReader;
//!
//! let mut reader = DbfReader::open("STSP2107.dbf", Some("iso-8859-1")).unwrap();
//! println!("{} records", reader.header().record_count);
//! for row in reader.records().unwrap() {
//!     println!("{:?}", row.unwrap());
//! }
//! ```
pub mod dbf;

// Re-export the main types for convenience
pub use dbf::{
    DbfError,
    DbfReader,
    Result,
    codec::charset::TextEncoding,
    describe::{DescribeFormat, describe, postgres_ddl},
    iter::{RecordStream, StreamState},
    types::{
        models::{Deviation, FieldDescriptor, FieldType, Parsed, TableHeader},
        value::{Row, Value},
    },
};
