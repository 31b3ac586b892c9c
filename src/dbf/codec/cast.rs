//! Conversion of raw fixed-width field bytes into typed values.
//!
//! Every supported [`FieldType`] carries its own decode rule:
//! - `N`: NUL padding and leading blanks removed, blank is null,
//!   integer when the field has no decimals, floating point otherwise
//! - `D`: `YYYYMMDD`, malformed digits are an error
//! - `L`: `T` is true, `F` is false, anything else (`?`, blank) is null
//! - `C`: trailing whitespace removed, everything else kept

use std::num::IntErrorKind;
use chrono::NaiveDate;
use crate::dbf::codec::charset::TextEncoding;
use crate::dbf::types::models::{FieldDescriptor, FieldType};
use crate::dbf::types::value::Value;
use crate::dbf::utils;

/// Reason a raw field could not be cast, without record context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastError {
    /// The field bytes as decoded text.
    pub raw: String,
    pub reason: String,
}

impl CastError {
    fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self { raw: raw.to_string(), reason: reason.into() }
    }
}

/// Casts the raw bytes of one field of one record.
pub fn cast(field: &FieldDescriptor, raw: &[u8], encoding: TextEncoding) -> Result<Value, CastError> {
    let text = utils::decode_text(raw, encoding);
    match field.field_type {
        FieldType::Numeric => to_number(field, &text),
        FieldType::Date => to_date(&text),
        FieldType::Boolean => Ok(to_bool(&text)),
        FieldType::Text => Ok(Value::Text(text.trim_end().to_string())),
    }
}

fn to_number(field: &FieldDescriptor, text: &str) -> Result<Value, CastError> {
    let cleaned: String = text.chars().filter(|&c| c != '\0').collect();
    let digits = cleaned.trim();
    if digits.is_empty() {
        return Ok(Value::Null);
    }
    if field.decimals > 0 {
        digits
            .parse::<f64>()
            .map(Value::Decimal)
            .map_err(|e| CastError::new(text, format!("not a decimal number: {}", e)))
    } else {
        match digits.parse::<i128>() {
            Ok(n) => Ok(Value::Integer(n)),
            // More digits than an i128 holds: keep the magnitude as a float.
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => digits
                .parse::<f64>()
                .map(Value::Decimal)
                .map_err(|e| CastError::new(text, format!("not an integer: {}", e))),
            Err(e) => Err(CastError::new(text, format!("not an integer: {}", e))),
        }
    }
}

fn to_date(text: &str) -> Result<Value, CastError> {
    let part = |range: std::ops::Range<usize>, what: &str| -> Result<u32, CastError> {
        text.get(range)
            .map(str::trim)
            .and_then(|digits| digits.parse::<u32>().ok())
            .ok_or_else(|| CastError::new(text, format!("invalid {} in YYYYMMDD date", what)))
    };
    let year = part(0..4, "year")?;
    let month = part(4..6, "month")?;
    let day = part(6..8, "day")?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
        .map(Value::Date)
        .ok_or_else(|| CastError::new(text, "not a calendar date"))
}

fn to_bool(text: &str) -> Value {
    match text {
        "T" => Value::Boolean(true),
        "F" => Value::Boolean(false),
        _ => Value::Null,
    }
}
