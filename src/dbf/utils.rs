//! Low-level byte reading and text decoding utilities

use std::io::{self, Read};
use log::debug;
use super::codec::charset::TextEncoding;
use super::types::error::{DbfError, Result};

/// Encoding label used when the caller does not name one.
pub const DEFAULT_ENCODING: &str = "iso-8859-1";

/// Resolve an encoding label (case-insensitive).
///
/// WHATWG labels and DOS code pages (`cp437`, `cp850`, ...) are accepted.
/// `None` selects [`DEFAULT_ENCODING`]. An unknown label is a hard failure.
pub fn parse_encoding(label: Option<&str>) -> Result<TextEncoding> {
    let label = label.unwrap_or(DEFAULT_ENCODING);
    let encoding = TextEncoding::for_label(label)
        .ok_or_else(|| DbfError::UnknownEncoding(label.to_string()))?;
    debug!("Text encoding '{}' resolved to {}", label, encoding.name());
    Ok(encoding)
}

/// Decode bytes with the table encoding, replacing malformed sequences.
pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> String {
    encoding.decode(bytes)
}

/// Fill `buf` from the reader, reporting a short read as [`DbfError::Truncated`].
pub fn read_exact_at(
    reader: &mut impl Read,
    buf: &mut [u8],
    context: &'static str,
    offset: u64,
) -> Result<()> {
    reader
        .read_exact(buf)
        .map_err(|e| truncated_or_io(e, context, offset))
}

/// Map an `UnexpectedEof` I/O error to [`DbfError::Truncated`].
pub fn truncated_or_io(err: io::Error, context: &'static str, offset: u64) -> DbfError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        DbfError::Truncated { context, offset }
    } else {
        DbfError::Io(err)
    }
}
