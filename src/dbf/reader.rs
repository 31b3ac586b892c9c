use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use log::info;

use super::codec::charset::TextEncoding;
use super::format;
use super::iter::RecordStream;
use super::types::error::Result;
use super::types::models::{Deviation, TableHeader};
use super::utils;

/// The main reader for dBASE table files.
///
/// Owns the byte source for its whole lifetime. The header is parsed once
/// when the reader is created; records are decoded lazily through
/// [`records()`](Self::records).
///
/// The source must already hold the plain table bytes. Compressed
/// containers have to be inflated by the caller first.
#[derive(Debug)]
pub struct DbfReader<R: Read + Seek> {
    source: R,
    header: TableHeader,
    deviations: Vec<Deviation>,
    encoding: TextEncoding,
}

impl DbfReader<BufReader<File>> {
    /// Open a table file from the given path.
    ///
    /// # Arguments
    /// * `path` - File path to the .dbf file
    /// * `encoding` - Optional text encoding label, `iso-8859-1` when `None`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The encoding label is unknown
    /// - File cannot be opened
    /// - The header is truncated or structurally invalid
    pub fn open(path: impl AsRef<Path>, encoding: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let encoding = utils::parse_encoding(encoding)?;
        info!("Opening table file: {}", path.display());
        let file = File::open(path)?;
        Self::with_encoding(BufReader::new(file), encoding)
    }
}

impl<R: Read + Seek> DbfReader<R> {
    /// Read a table from any seekable byte source positioned at its first byte.
    ///
    /// The encoding label is resolved before anything is read.
    pub fn new(source: R, encoding: Option<&str>) -> Result<Self> {
        let encoding = utils::parse_encoding(encoding)?;
        Self::with_encoding(source, encoding)
    }

    /// Like [`new`](Self::new), with an already resolved encoding.
    pub fn with_encoding(mut source: R, encoding: TextEncoding) -> Result<Self> {
        let parsed = format::header::parse(&mut source, encoding)?;
        if !parsed.is_clean() {
            info!("Header parsed with {} tolerated deviation(s)", parsed.deviations.len());
        }
        Ok(Self {
            source,
            header: parsed.value,
            deviations: parsed.deviations,
            encoding,
        })
    }

    /// The parsed header.
    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    /// Deviations from the nominal layout met while parsing the header.
    pub fn deviations(&self) -> &[Deviation] {
        &self.deviations
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Returns a stream over the live records of the table.
    ///
    /// Every call seeks back to the first record, so each stream sees the
    /// same rows in the same order. The stream holds the source exclusively
    /// until it is dropped.
    pub fn records(&mut self) -> Result<RecordStream<'_, R>> {
        self.source
            .seek(SeekFrom::Start(u64::from(self.header.header_length)))?;
        Ok(RecordStream::new(&mut self.source, &self.header, self.encoding))
    }

    /// Releases the byte source.
    pub fn into_inner(self) -> R {
        self.source
    }
}
