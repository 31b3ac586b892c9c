//! Core data structures for dBASE table components.
//!
//! This module defines the fundamental types used throughout the library:
//! - The table header and its field descriptors
//! - The closed set of supported field types
//! - Tolerated deviations reported while parsing

use std::fmt;
use chrono::NaiveDate;
use super::error::{DbfError, Result};

/// Size of the fixed header prologue and of every field descriptor block.
pub const BLOCK_SIZE: usize = 32;

/// Number of reserved bytes closing the header prologue.
pub const RESERVED_LEN: usize = 22;

/// Canonical header terminator.
pub const TERMINATOR: u8 = b'\r';

/// Terminator written by some producers instead of `\r`.
pub const TOLERATED_TERMINATOR: u8 = 0x00;

/// Deletion marker of a live record.
pub const LIVE_MARKER: u8 = b' ';

/// Field types understood by the value caster.
///
/// Any other tag found in a descriptor is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `N`: number stored as right-justified text.
    Numeric,
    /// `D`: date stored as `YYYYMMDD`.
    Date,
    /// `L`: logical stored as one character.
    Boolean,
    /// `C`: fixed-width text, blank padded.
    Text,
}

impl FieldType {
    /// The on-disk type tag.
    pub fn tag(&self) -> char {
        match self {
            FieldType::Numeric => 'N',
            FieldType::Date => 'D',
            FieldType::Boolean => 'L',
            FieldType::Text => 'C',
        }
    }
}

impl TryFrom<u8> for FieldType {
    type Error = u8;

    fn try_from(tag: u8) -> std::result::Result<Self, u8> {
        match tag {
            b'N' => Ok(Self::Numeric),
            b'D' => Ok(Self::Date),
            b'L' => Ok(Self::Boolean),
            b'C' => Ok(Self::Text),
            other => Err(other),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut buf = [0u8; 4];
        f.pad(self.tag().encode_utf8(&mut buf))
    }
}

/// Metadata of one column, decoded from a 32-byte descriptor block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// 1-based position of the field in the table.
    pub order: usize,
    pub name: String,
    pub field_type: FieldType,
    /// Width of the field inside a record, in bytes. Never zero.
    pub width: u8,
    /// Decimal places, only meaningful for numeric fields.
    pub decimals: u8,
    /// Undocumented flags byte, kept as found.
    pub flags: u8,
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "#{} {} {}({},{})",
            self.order, self.name, self.field_type, self.width, self.decimals
        )
    }
}

/// Complete parsed header of a table file.
///
/// Built once when the source is opened and never modified afterwards.
/// The record stream borrows its field layout read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHeader {
    /// Format tag, first byte of the file.
    pub version: u8,
    /// Date of last update, absent when the stored month or day is zero.
    pub last_update: Option<NaiveDate>,
    /// Number of records declared by the header, deleted ones included.
    pub record_count: u32,
    /// Byte length of the header, descriptors and terminator included.
    pub header_length: u16,
    /// The 22 reserved bytes closing the prologue, expected to be zero.
    pub reserved: [u8; RESERVED_LEN],
    /// Byte found after the last field descriptor.
    pub terminator: u8,
    /// Field descriptors in on-disk order.
    pub fields: Vec<FieldDescriptor>,
    /// Size of one record: the deletion marker plus every field width.
    pub record_size: usize,
}

impl TableHeader {
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Expected size of the whole file, including the trailing end-of-file byte.
    ///
    /// Informational only, it is not checked against the byte source.
    pub fn file_size(&self) -> u64 {
        u64::from(self.header_length) + self.record_size as u64 * u64::from(self.record_count) + 1
    }

    /// dBASE level encoded in bits 0-2 of the format tag (3 for level 5, 4 for level 7).
    pub fn version_number(&self) -> u8 {
        self.version & 0x07
    }

    /// Whether the format tag announces a companion memo file (bit 3 or bit 7).
    pub fn has_memo_file(&self) -> bool {
        self.version & 0x88 != 0
    }

    /// Whether the format tag announces a dBASE IV SQL table (bits 4-6).
    pub fn has_sql_table(&self) -> bool {
        self.version & 0x70 != 0
    }

    /// Looks up a field descriptor by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Byte offset of record `index` from the start of the source.
    pub fn record_offset(&self, index: u32) -> u64 {
        u64::from(self.header_length) + self.record_size as u64 * u64::from(index)
    }
}

/// Departure from the nominal layout that is known to occur in real files.
///
/// Deviations never stop decoding; the parser records them next to the
/// value it managed to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deviation {
    /// The reserved header bytes are not all zero.
    PollutedReserved([u8; RESERVED_LEN]),
    /// The header terminator is `\0` instead of `\r`.
    NonCanonicalTerminator(u8),
    /// The descriptor area is not a whole number of 32-byte blocks.
    InexactFieldBlock { header_length: u16, remainder: usize },
    /// Month and day are set but do not form a calendar date.
    InvalidUpdateDate { year: i32, month: u8, day: u8 },
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Deviation::PollutedReserved(bytes) => write!(
                f,
                "File has polluted reserved bytes, expected all zero but received {:02x?}",
                bytes
            ),
            Deviation::NonCanonicalTerminator(byte) => write!(
                f,
                "The header terminator should be \\r but came {:#04x}",
                byte
            ),
            Deviation::InexactFieldBlock { header_length, remainder } => write!(
                f,
                "Header length {} leaves {} bytes that do not form a whole field descriptor",
                header_length, remainder
            ),
            Deviation::InvalidUpdateDate { year, month, day } => write!(
                f,
                "Last update {:04}-{:02}-{:02} is not a calendar date",
                year, month, day
            ),
        }
    }
}

/// A successfully parsed value together with the deviations met on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub deviations: Vec<Deviation>,
}

impl<T> Parsed<T> {
    pub fn is_clean(&self) -> bool {
        self.deviations.is_empty()
    }
}

/// Derives the number of field descriptors from the declared header length.
///
/// Returns the count and the number of bytes left over by the integer division.
pub fn field_count_for(header_length: u16) -> Result<(usize, usize)> {
    let descriptor_area = (header_length as usize)
        .checked_sub(BLOCK_SIZE + 1)
        .ok_or(DbfError::HeaderTooShort(header_length))?;
    Ok((descriptor_area / BLOCK_SIZE, descriptor_area % BLOCK_SIZE))
}
