//! Custom error types for the dbf-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// Every variant except [`DbfError::InvalidValue`] describes a structural
/// problem with the byte source and aborts decoding as a whole.
/// `InvalidValue` is raised when one field of one record cannot be cast to
/// its declared type; it still ends the record stream.
#[derive(Debug, Error)]
pub enum DbfError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The byte source ended before a header block or record was complete.
    #[error("Unexpected end of data while reading {context} at byte offset {offset}")]
    Truncated { context: &'static str, offset: u64 },

    /// The requested text encoding label names no known encoding or DOS code page.
    #[error("Unknown text encoding: '{0}'")]
    UnknownEncoding(String),

    /// The declared header length cannot hold the 32-byte prologue and the terminator.
    #[error("Header length {0} is too short, at least 33 bytes are required")]
    HeaderTooShort(u16),

    /// A field descriptor declares a type tag this decoder does not read.
    #[error("Field type '{}'{} not supported (field #{order} '{name}')", tag_char(.tag), legacy_type_suffix(.tag))]
    UnsupportedFieldType { tag: u8, name: String, order: usize },

    /// A field descriptor declares a width of zero bytes.
    #[error("Field #{order} '{name}' has zero width")]
    ZeroWidthField { name: String, order: usize },

    /// The byte after the field descriptors is neither `\r` nor `\0`.
    #[error("The header terminator should be \\r (\\x00 is tolerated), found {0:#04x}")]
    InvalidTerminator(u8),

    /// A field's raw bytes cannot be cast to the field's declared type.
    #[error("Invalid value for field #{order} '{field}' in record {record} at byte offset {offset}: {reason} (raw {raw:?})")]
    InvalidValue {
        field: String,
        order: usize,
        record: u32,
        offset: u64,
        raw: String,
        reason: String,
    },

    /// A field cannot be expressed in the requested schema rendering.
    #[error("Field '{name}' is too large ({width}) to be rendered as an integer column")]
    UnrepresentableField { name: String, width: u8 },
}

impl DbfError {
    /// Returns `true` when the error stems from a single undecodable field value
    /// rather than from the layout of the byte source.
    pub fn is_value_error(&self) -> bool {
        matches!(self, DbfError::InvalidValue { .. })
    }
}

/// Names the legacy dBASE types that are recognised but deliberately not decoded.
pub(crate) fn legacy_type_name(tag: u8) -> Option<&'static str> {
    match tag {
        b'F' => Some("float"),
        b'B' => Some("binary"),
        b'M' => Some("memo"),
        b'@' => Some("timestamp"),
        b'I' => Some("long"),
        b'+' => Some("autoincrement"),
        b'O' => Some("double"),
        b'G' => Some("OLE"),
        _ => None,
    }
}

fn tag_char(tag: &u8) -> char {
    char::from(*tag)
}

fn legacy_type_suffix(tag: &u8) -> String {
    legacy_type_name(*tag)
        .map(|name| format!(" ({})", name))
        .unwrap_or_default()
}

/// A convenience `Result` type alias using the crate's `DbfError` type.
pub type Result<T> = std::result::Result<T, DbfError>;
