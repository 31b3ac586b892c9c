//! In-memory builder for dBASE table images used by the integration tests.

#![allow(dead_code)]

pub struct FieldSpec {
    pub name: &'static str,
    pub tag: u8,
    pub width: u8,
    pub decimals: u8,
}

pub fn field(name: &'static str, tag: u8, width: u8, decimals: u8) -> FieldSpec {
    FieldSpec { name, tag, width, decimals }
}

pub struct TableImage {
    pub version: u8,
    pub update: (u8, u8, u8),
    pub fields: Vec<FieldSpec>,
    /// Deletion marker and the concatenated field bytes of each record.
    pub records: Vec<(u8, Vec<u8>)>,
    pub terminator: u8,
    pub reserved: [u8; 22],
    /// Overrides the record count written to the header.
    pub declared_records: Option<u32>,
    /// Bytes appended after the terminator and counted in the header length.
    pub header_padding: usize,
    pub eof_marker: bool,
}

impl TableImage {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            version: 0x03,
            update: (121, 7, 1),
            fields,
            records: Vec::new(),
            terminator: b'\r',
            reserved: [0; 22],
            declared_records: None,
            header_padding: 0,
            eof_marker: true,
        }
    }

    /// Adds a live record from one value per field, each padded or cut to the field width.
    pub fn live(mut self, values: &[&[u8]]) -> Self {
        let data = self.pack(values);
        self.records.push((b' ', data));
        self
    }

    /// Adds a soft-deleted record.
    pub fn deleted(mut self, values: &[&[u8]]) -> Self {
        let data = self.pack(values);
        self.records.push((b'*', data));
        self
    }

    fn pack(&self, values: &[&[u8]]) -> Vec<u8> {
        assert_eq!(values.len(), self.fields.len(), "one value per field");
        let mut data = Vec::new();
        for (column, value) in self.fields.iter().zip(values) {
            let mut cell = value.to_vec();
            cell.resize(column.width as usize, b' ');
            data.extend(cell);
        }
        data
    }

    pub fn header_length(&self) -> u16 {
        (32 + 32 * self.fields.len() + 1 + self.header_padding) as u16
    }

    pub fn record_size(&self) -> usize {
        1 + self.fields.iter().map(|f| f.width as usize).sum::<usize>()
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = vec![self.version, self.update.0, self.update.1, self.update.2];
        let count = self.declared_records.unwrap_or(self.records.len() as u32);
        bytes.extend_from_slice(&count.to_le_bytes());
        bytes.extend_from_slice(&self.header_length().to_le_bytes());
        bytes.extend_from_slice(&self.reserved);

        for column in &self.fields {
            let mut block = [0u8; 32];
            block[..column.name.len()].copy_from_slice(column.name.as_bytes());
            block[11] = column.tag;
            block[16] = column.width;
            block[17] = column.decimals;
            bytes.extend_from_slice(&block);
        }
        bytes.push(self.terminator);
        bytes.extend(std::iter::repeat_n(0u8, self.header_padding));

        for (marker, data) in &self.records {
            bytes.push(*marker);
            bytes.extend_from_slice(data);
        }
        if self.eof_marker {
            bytes.push(0x1a);
        }
        bytes
    }
}

/// A small table mixing every supported field type.
pub fn people() -> TableImage {
    TableImage::new(vec![
        field("NAME", b'C', 10, 0),
        field("AGE", b'N', 3, 0),
        field("SALARY", b'N', 9, 2),
        field("BORN", b'D', 8, 0),
        field("ACTIVE", b'L', 1, 0),
    ])
    .live(&[b"Ana", b" 34", b"  1500.50", b"19900402", b"T"])
    .deleted(&[b"Bruno", b" 41", b"  2000.00", b"19830115", b"F"])
    .live(&[b"  Carla", b"   ", b"         ", b"20011231", b"?"])
    .live(&[b"Davi", b"  7", b"     0.10", b"20170709", b"F"])
}
