//! Table header parsing.
//!
//! This module handles:
//! - Decoding the fixed 32-byte prologue
//! - Deriving the field count from the declared header length
//! - Parsing every field descriptor block
//! - Validating the terminator byte
//!
//! Producers in the wild deviate from the nominal layout in a few known
//! ways. Those are returned as [`Deviation`]s next to the header instead of
//! failing the parse.

use std::io::Read;
use byteorder::{LittleEndian, ReadBytesExt};
use chrono::NaiveDate;
use log::{debug, info, trace, warn};
use crate::dbf::format::field;
use crate::dbf::codec::charset::TextEncoding;
use crate::dbf::types::error::{DbfError, Result};
use crate::dbf::types::models::{
    BLOCK_SIZE, Deviation, FieldDescriptor, Parsed, RESERVED_LEN, TERMINATOR, TOLERATED_TERMINATOR,
    TableHeader, field_count_for,
};
use crate::dbf::utils;

/// Parses the table header from the beginning of the source.
///
/// # Header Structure
/// ```text
/// [1 byte]   Format tag
/// [1 byte]   Last update year, offset from 1900
/// [1 byte]   Last update month
/// [1 byte]   Last update day
/// [4 bytes]  Record count (little-endian u32)
/// [2 bytes]  Header length (little-endian u16)
/// [22 bytes] Reserved, expected zero
/// [32 bytes] Field descriptor, repeated field count times
/// [1 byte]   Terminator (\r, \0 tolerated)
/// ```
///
/// On success the reader is positioned right after the terminator.
pub fn parse<R: Read>(reader: &mut R, encoding: TextEncoding) -> Result<Parsed<TableHeader>> {
    info!("Parsing table header");
    let mut deviations = Vec::new();

    // Step 1: Fixed prologue
    let mut prologue = [0u8; BLOCK_SIZE];
    utils::read_exact_at(reader, &mut prologue, "header", 0)?;
    let mut cursor = &prologue[..];
    let version = cursor.read_u8()?;
    let year = cursor.read_u8()?;
    let month = cursor.read_u8()?;
    let day = cursor.read_u8()?;
    let record_count = cursor.read_u32::<LittleEndian>()?;
    let header_length = cursor.read_u16::<LittleEndian>()?;
    let mut reserved = [0u8; RESERVED_LEN];
    cursor.read_exact(&mut reserved)?;
    trace!(
        "Prologue: version={:#04x}, records={}, header_length={}",
        version, record_count, header_length
    );

    if reserved.iter().any(|&b| b != 0) {
        deviations.push(Deviation::PollutedReserved(reserved));
    }

    // Step 2: Last update date
    let last_update = match last_update_date(year, month, day) {
        Ok(date) => date,
        Err(deviation) => {
            deviations.push(deviation);
            None
        }
    };

    // Step 3: Field count
    let (field_count, remainder) = field_count_for(header_length)?;
    if remainder != 0 {
        deviations.push(Deviation::InexactFieldBlock { header_length, remainder });
    }

    // Step 4: Field descriptors, record size starts at 1 for the deletion marker
    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(field_count);
    let mut record_size = 1usize;
    let mut block = [0u8; BLOCK_SIZE];
    for index in 0..field_count {
        let offset = (BLOCK_SIZE * (index + 1)) as u64;
        utils::read_exact_at(reader, &mut block, "field descriptor", offset)?;
        let descriptor = field::parse(&block, index + 1, encoding)?;
        record_size += descriptor.width as usize;
        fields.push(descriptor);
    }

    // Step 5: Terminator
    let terminator_offset = (BLOCK_SIZE * (field_count + 1)) as u64;
    let terminator = reader
        .read_u8()
        .map_err(|e| utils::truncated_or_io(e, "header terminator", terminator_offset))?;

    debug!(
        "Header: header_length={}, field_count={}, record_size={}, fields=[{}], terminator={:#04x}",
        header_length,
        field_count,
        record_size,
        fields.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
        terminator
    );

    match terminator {
        TERMINATOR => {}
        TOLERATED_TERMINATOR => deviations.push(Deviation::NonCanonicalTerminator(terminator)),
        other => return Err(DbfError::InvalidTerminator(other)),
    }

    for deviation in &deviations {
        warn!("{}", deviation);
    }

    let header = TableHeader {
        version,
        last_update,
        record_count,
        header_length,
        reserved,
        terminator,
        fields,
        record_size,
    };

    info!(
        "Header parsed: version={:#04x}, records={}, fields={}, record_size={}, file_size={}",
        header.version,
        header.record_count,
        header.field_count(),
        header.record_size,
        header.file_size()
    );

    Ok(Parsed { value: header, deviations })
}

/// Builds the last update date from the three raw header bytes.
///
/// A zero month or day means the producer left the date unset.
fn last_update_date(year: u8, month: u8, day: u8) -> std::result::Result<Option<NaiveDate>, Deviation> {
    if month == 0 || day == 0 {
        return Ok(None);
    }
    let year = 1900 + i32::from(year);
    NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))
        .map(Some)
        .ok_or(Deviation::InvalidUpdateDate { year, month, day })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prologue(records: u32, header_length: u16) -> Vec<u8> {
        let mut bytes = vec![0x03, 121, 7, 15];
        bytes.extend_from_slice(&records.to_le_bytes());
        bytes.extend_from_slice(&header_length.to_le_bytes());
        bytes.extend_from_slice(&[0u8; RESERVED_LEN]);
        bytes
    }

    fn descriptor(name: &str, tag: u8, width: u8, decimals: u8) -> Vec<u8> {
        let mut block = vec![0u8; BLOCK_SIZE];
        block[..name.len()].copy_from_slice(name.as_bytes());
        block[11] = tag;
        block[16] = width;
        block[17] = decimals;
        block
    }

    fn two_field_header(terminator: u8) -> Vec<u8> {
        let mut bytes = prologue(4, 32 + 2 * 32 + 1);
        bytes.extend(descriptor("NAME", b'C', 10, 0));
        bytes.extend(descriptor("AGE", b'N', 3, 0));
        bytes.push(terminator);
        bytes
    }

    #[test]
    fn parses_clean_header() {
        let bytes = two_field_header(b'\r');
        let parsed = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap();
        assert!(parsed.is_clean());

        let header = parsed.value;
        assert_eq!(header.version, 0x03);
        assert_eq!(header.version_number(), 3);
        assert!(!header.has_memo_file());
        assert_eq!(header.last_update, NaiveDate::from_ymd_opt(2021, 7, 15));
        assert_eq!(header.record_count, 4);
        assert_eq!(header.header_length, 97);
        assert_eq!(header.field_count(), 2);
        assert_eq!(header.record_size, 14);
        assert_eq!(header.terminator, b'\r');
        assert_eq!(header.file_size(), 97 + 14 * 4 + 1);
        assert_eq!(header.field("AGE").map(|f| f.order), Some(2));
    }

    #[test]
    fn reader_stops_after_terminator() {
        let mut bytes = two_field_header(b'\r');
        bytes.extend_from_slice(b" rest");
        let mut src = bytes.as_slice();
        parse(&mut src, encoding_rs::WINDOWS_1252.into()).unwrap();
        assert_eq!(src, b" rest");
    }

    #[test]
    fn nul_terminator_is_tolerated() {
        let bytes = two_field_header(0x00);
        let parsed = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap();
        assert_eq!(parsed.deviations, vec![Deviation::NonCanonicalTerminator(0x00)]);
        assert_eq!(parsed.value.terminator, 0x00);
    }

    #[test]
    fn other_terminator_fails() {
        let bytes = two_field_header(b'A');
        let err = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap_err();
        assert!(matches!(err, DbfError::InvalidTerminator(b'A')));
    }

    #[test]
    fn polluted_reserved_bytes_are_reported() {
        let mut bytes = two_field_header(b'\r');
        bytes[12] = 0x7f;
        bytes[31] = 0x01;
        let parsed = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap();
        match parsed.deviations.as_slice() {
            [Deviation::PollutedReserved(reserved)] => {
                assert_eq!(reserved[2], 0x7f);
                assert_eq!(reserved[21], 0x01);
            }
            other => panic!("unexpected deviations {:?}", other),
        }
        assert_eq!(parsed.value.reserved[2], 0x7f);
    }

    #[test]
    fn zero_month_or_day_leaves_date_absent() {
        for (month, day) in [(0, 15), (7, 0), (0, 0)] {
            let mut bytes = two_field_header(b'\r');
            bytes[2] = month;
            bytes[3] = day;
            let parsed = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap();
            assert_eq!(parsed.value.last_update, None);
            assert!(parsed.is_clean());
        }
    }

    #[test]
    fn impossible_date_is_a_deviation() {
        let mut bytes = two_field_header(b'\r');
        bytes[2] = 2;
        bytes[3] = 30;
        let parsed = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap();
        assert_eq!(parsed.value.last_update, None);
        assert_eq!(
            parsed.deviations,
            vec![Deviation::InvalidUpdateDate { year: 2021, month: 2, day: 30 }]
        );
    }

    #[test]
    fn inexact_header_length_truncates_field_list() {
        let mut bytes = two_field_header(b'\r');
        bytes[8..10].copy_from_slice(&(97u16 + 5).to_le_bytes());
        let parsed = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap();
        assert_eq!(parsed.value.field_count(), 2);
        assert_eq!(
            parsed.deviations,
            vec![Deviation::InexactFieldBlock { header_length: 102, remainder: 5 }]
        );
    }

    #[test]
    fn header_length_too_short_fails() {
        let mut bytes = prologue(0, 20);
        bytes.push(b'\r');
        let err = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap_err();
        assert!(matches!(err, DbfError::HeaderTooShort(20)));
    }

    #[test]
    fn empty_field_list_is_valid() {
        let mut bytes = prologue(0, 33);
        bytes.push(b'\r');
        let header = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap().value;
        assert_eq!(header.field_count(), 0);
        assert_eq!(header.record_size, 1);
    }

    #[test]
    fn short_prologue_is_truncated() {
        let bytes = prologue(1, 97);
        let err = parse(&mut &bytes[..20], encoding_rs::WINDOWS_1252.into()).unwrap_err();
        assert!(matches!(err, DbfError::Truncated { context: "header", offset: 0 }));
    }

    #[test]
    fn missing_descriptor_is_truncated() {
        let bytes = two_field_header(b'\r');
        let err = parse(&mut &bytes[..70], encoding_rs::WINDOWS_1252.into()).unwrap_err();
        assert!(matches!(err, DbfError::Truncated { context: "field descriptor", offset: 64 }));
    }

    #[test]
    fn missing_terminator_is_truncated() {
        let bytes = two_field_header(b'\r');
        let err = parse(&mut &bytes[..96], encoding_rs::WINDOWS_1252.into()).unwrap_err();
        assert!(matches!(err, DbfError::Truncated { context: "header terminator", offset: 96 }));
    }

    #[test]
    fn unsupported_descriptor_aborts_header() {
        let mut bytes = prologue(0, 32 + 32 + 1);
        bytes.extend(descriptor("MEMO", b'M', 10, 0));
        bytes.push(b'\r');
        let err = parse(&mut bytes.as_slice(), encoding_rs::WINDOWS_1252.into()).unwrap_err();
        assert!(matches!(err, DbfError::UnsupportedFieldType { tag: b'M', order: 1, .. }));
    }
}
