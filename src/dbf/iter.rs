//! Sequential access to the records of a table.
//!
//! [`RecordStream`] walks the records that follow the header one at a time.
//! It skips soft-deleted records and yields every live one as a [`Row`].
//!
//! # Example
//! ```no_run
//! # use dbf_reader::DbfReader;
//! let mut reader = DbfReader::open("table.dbf", None).unwrap();
//! for row in reader.records().unwrap() {
//!     let row = row.unwrap();
//!     println!("{:?}", row.get("NAME"));
//! }
//! ```

use std::io::Read;
use std::iter::FusedIterator;
use log::trace;

use super::codec::cast;
use super::codec::charset::TextEncoding;
use super::types::error::{DbfError, Result};
use super::types::models::{LIVE_MARKER, TableHeader};
use super::types::value::Row;
use super::utils;

/// Where the stream stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// The cursor sits at the start of a record that has not been looked at.
    Positioned,
    /// The declared record count was reached, or decoding failed.
    Exhausted,
}

/// Forward-only iterator over the live records of a table.
///
/// Each step reads exactly one record of `record_size` bytes. Deleted
/// records are consumed and counted but never yielded. The stream ends
/// after `record_count` records or at the first error.
///
/// Created by [`DbfReader::records()`](crate::DbfReader::records).
pub struct RecordStream<'a, R: Read> {
    source: &'a mut R,
    header: &'a TableHeader,
    encoding: TextEncoding,
    state: StreamState,
    /// Records consumed so far, deleted ones included.
    visited: u32,
    buf: Vec<u8>,
}

impl<'a, R: Read> RecordStream<'a, R> {
    /// Creates a stream over a source positioned at the first record.
    pub(super) fn new(source: &'a mut R, header: &'a TableHeader, encoding: TextEncoding) -> Self {
        let state = if header.record_count == 0 {
            StreamState::Exhausted
        } else {
            StreamState::Positioned
        };
        Self {
            source,
            header,
            encoding,
            state,
            visited: 0,
            buf: vec![0u8; header.record_size],
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of records consumed so far, deleted ones included.
    pub fn visited(&self) -> u32 {
        self.visited
    }

    /// Pulls the next live row, or `None` once the stream is exhausted.
    ///
    /// Equivalent to [`Iterator::next`] with the `Option` and `Result` swapped.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        self.next().transpose()
    }

    fn step(&mut self) -> Result<Option<Row>> {
        loop {
            if self.visited >= self.header.record_count {
                self.state = StreamState::Exhausted;
                return Ok(None);
            }

            let index = self.visited;
            let offset = self.header.record_offset(index);
            utils::read_exact_at(&mut *self.source, &mut self.buf, "record", offset)?;
            self.visited += 1;

            let marker = self.buf[0];
            if marker != LIVE_MARKER {
                trace!("Record {} is deleted (marker {:#04x}), skipping", index, marker);
                continue;
            }

            trace!("Decoding record {} at byte offset {}", index, offset);
            return self.decode(index, offset).map(Some);
        }
    }

    fn decode(&self, index: u32, offset: u64) -> Result<Row> {
        let mut row = Row::with_capacity(self.header.field_count());
        let mut start = 1usize;
        for field in &self.header.fields {
            let end = start + field.width as usize;
            let value = cast::cast(field, &self.buf[start..end], self.encoding).map_err(|e| {
                DbfError::InvalidValue {
                    field: field.name.clone(),
                    order: field.order,
                    record: index,
                    offset: offset + start as u64,
                    raw: e.raw,
                    reason: e.reason,
                }
            })?;
            row.push(field.name.clone(), value);
            start = end;
        }
        Ok(row)
    }
}

impl<R: Read> Iterator for RecordStream<'_, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == StreamState::Exhausted {
            return None;
        }
        match self.step() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => {
                self.state = StreamState::Exhausted;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.state {
            StreamState::Exhausted => (0, Some(0)),
            StreamState::Positioned => {
                let remaining = self.header.record_count.saturating_sub(self.visited);
                (0, Some(remaining as usize))
            }
        }
    }
}

impl<R: Read> FusedIterator for RecordStream<'_, R> {}
