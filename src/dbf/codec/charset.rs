//! Text encodings used for field names and character values.
//!
//! Labels are resolved in two steps. WHATWG labels known to `encoding_rs`
//! come first (`iso-8859-1`, `windows-1252`, `utf-8`, `ibm866`, ...). DOS
//! OEM code pages that `encoding_rs` lacks, such as `cp437` or `cp850`,
//! are served from the `oem_cp` tables.

use std::fmt;
use encoding_rs::Encoding;
use oem_cp::code_table::DECODING_TABLE_CP_MAP;
use oem_cp::code_table_type::TableType;

/// A resolved text encoding.
#[derive(Clone, Copy)]
pub enum TextEncoding {
    /// An encoding from the WHATWG registry.
    Whatwg(&'static Encoding),
    /// A single-byte DOS code page.
    Oem { code_page: u16, table: &'static TableType },
}

impl TextEncoding {
    /// Resolve a label, case-insensitively. `None` when nothing matches.
    pub fn for_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return Some(Self::Whatwg(encoding));
        }
        let code_page = oem_code_page(label)?;
        DECODING_TABLE_CP_MAP
            .get(&code_page)
            .map(|table| Self::Oem { code_page, table })
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> String {
        match self {
            Self::Whatwg(encoding) => encoding.name().to_string(),
            Self::Oem { code_page, .. } => format!("cp{}", code_page),
        }
    }

    /// Decode bytes, replacing malformed or unmapped sequences with U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Whatwg(encoding) => {
                let (text, _, _) = encoding.decode(bytes);
                text.into_owned()
            }
            Self::Oem { table, .. } => table.decode_string_lossy(bytes),
        }
    }
}

impl From<&'static Encoding> for TextEncoding {
    fn from(encoding: &'static Encoding) -> Self {
        Self::Whatwg(encoding)
    }
}

impl PartialEq for TextEncoding {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Whatwg(a), Self::Whatwg(b)) => a == b,
            (Self::Oem { code_page: a, .. }, Self::Oem { code_page: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for TextEncoding {}

impl fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TextEncoding({})", self.name())
    }
}

/// Code page number of an OEM label: `cp850`, `ibm850`, `oem850`, `dos-850`, `850`.
fn oem_code_page(label: &str) -> Option<u16> {
    let label = label.to_ascii_lowercase();
    let digits = ["cp", "ibm", "oem", "dos-", "dos"]
        .iter()
        .find_map(|prefix| label.strip_prefix(prefix))
        .unwrap_or(&label);
    let digits = digits.strip_prefix('-').unwrap_or(digits);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn whatwg_labels_come_first() {
        assert_eq!(TextEncoding::for_label("latin1"), Some(TextEncoding::Whatwg(encoding_rs::WINDOWS_1252)));
        assert_eq!(TextEncoding::for_label("cp1252"), Some(TextEncoding::Whatwg(encoding_rs::WINDOWS_1252)));
        assert_eq!(TextEncoding::for_label("ibm866"), Some(TextEncoding::Whatwg(encoding_rs::IBM866)));
    }

    #[test]
    fn dos_code_page_labels() {
        for label in ["cp850", "CP850", "ibm850", "IBM-850", "850", "dos-850"] {
            let encoding = TextEncoding::for_label(label).unwrap_or_else(|| panic!("{} should resolve", label));
            assert_eq!(encoding.name(), "cp850");
        }
        assert_eq!(TextEncoding::for_label("cp437").map(|e| e.name()), Some("cp437".to_string()));
    }

    #[test]
    fn decodes_dos_code_pages() {
        let cp850 = TextEncoding::for_label("cp850").unwrap();
        assert_eq!(cp850.decode(b"S\xc7O PAULO"), "SÃO PAULO");
        assert_eq!(cp850.decode(b"A\x87\xc6O"), "AçãO");

        let cp437 = TextEncoding::for_label("cp437").unwrap();
        assert_eq!(cp437.decode(b"\x80\x81\xac"), "Çü¼");
    }

    #[test]
    fn unknown_labels() {
        for label in ["klingon", "cp", "ibm", "cp99999", "cp12a", ""] {
            assert_eq!(TextEncoding::for_label(label), None, "{:?}", label);
        }
    }
}
