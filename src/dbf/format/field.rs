//! Field descriptor parsing.
//!
//! # Descriptor Structure
//! ```text
//! [11 bytes] Field name, NUL padded
//! [1 byte]   Type tag (N, D, L or C)
//! [4 bytes]  Ignored
//! [1 byte]   Width in bytes
//! [1 byte]   Decimal places
//! [1 byte]   Flags (undocumented, preserved)
//! [13 bytes] Ignored
//! ```

use log::trace;
use crate::dbf::codec::charset::TextEncoding;
use crate::dbf::types::error::{DbfError, Result};
use crate::dbf::types::models::{BLOCK_SIZE, FieldDescriptor, FieldType};
use crate::dbf::utils;

/// Length of the NUL-padded name at the start of a descriptor.
pub const NAME_LEN: usize = 11;

const TYPE_OFFSET: usize = 11;
const WIDTH_OFFSET: usize = 16;
const DECIMALS_OFFSET: usize = 17;
const FLAGS_OFFSET: usize = 18;

/// Decodes one 32-byte descriptor block.
///
/// `order` is the 1-based position of the descriptor in the header.
/// Tags outside `N`, `D`, `L`, `C` and zero widths are rejected here so a
/// malformed schema fails before any record is read.
pub fn parse(block: &[u8; BLOCK_SIZE], order: usize, encoding: TextEncoding) -> Result<FieldDescriptor> {
    let name = decode_name(&block[..NAME_LEN], encoding);
    let tag = block[TYPE_OFFSET];
    let width = block[WIDTH_OFFSET];
    let decimals = block[DECIMALS_OFFSET];
    let flags = block[FLAGS_OFFSET];

    let field_type = FieldType::try_from(tag)
        .map_err(|tag| DbfError::UnsupportedFieldType { tag, name: name.clone(), order })?;

    if width == 0 {
        return Err(DbfError::ZeroWidthField { name, order });
    }

    let field = FieldDescriptor {
        order,
        name,
        field_type,
        width,
        decimals,
        flags,
    };
    trace!("Parsed field descriptor {}", field);
    Ok(field)
}

/// Decodes the name area with every NUL byte removed, embedded ones included.
fn decode_name(raw: &[u8], encoding: TextEncoding) -> String {
    let bytes: Vec<u8> = raw.iter().copied().filter(|&b| b != 0).collect();
    utils::decode_text(&bytes, encoding)
}
