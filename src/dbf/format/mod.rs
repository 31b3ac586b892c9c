//! File format parsing layer for dBASE table files.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw byte I/O and the high-level [`DbfReader`](crate::dbf::reader::DbfReader).
//!
//! # Module Organization
//!
//! - [`header`]: Parses the fixed prologue, descriptors and terminator
//! - [`field`]: Parses a single 32-byte field descriptor
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  Prologue       │ ← header::parse()
//! ├─────────────────┤
//! │  Field          │ ← field::parse(), once per field
//! │  descriptors    │
//! ├─────────────────┤
//! │  Terminator     │ ← header::parse()
//! ├─────────────────┤
//! │  Records        │ ← RecordStream
//! │  (fixed width)  │
//! └─────────────────┘
//! ```

pub mod field;
pub mod header;
