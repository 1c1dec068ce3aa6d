//! Header-less cell grids read from bulletin CSV files.
//!
//! Bulletins carry several metadata and header rows before the data, so no
//! row is treated as a header here. Cells are kept verbatim; empty cells are
//! `None`. Files are read whole.

use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::SHIFT_JIS;

use crate::error::{IngestError, Result};

/// Character encoding of a bulletin CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    ShiftJis,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::ShiftJis => "Shift_JIS",
        }
    }
}

/// Rectangular-ish table of raw cells. Rows may differ in length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Builds a grid from string literals; empty strings become `None`.
    pub fn from_strings<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| non_empty(cell.as_ref())).collect())
            .collect();
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row length.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn row(&self, idx: usize) -> Option<&[Option<String>]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    /// Cell text, `None` when empty or out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// Drops the first `n` rows.
    pub fn skip_rows(mut self, n: usize) -> Self {
        let n = n.min(self.rows.len());
        self.rows.drain(..n);
        self
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Decodes raw bytes, stripping a UTF-8 byte-order mark.
pub fn decode_bytes(bytes: &[u8], encoding: TextEncoding, path: &Path) -> Result<String> {
    match encoding {
        TextEncoding::Utf8 => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            String::from_utf8(bytes.to_vec()).map_err(|_| IngestError::Decode {
                path: path.to_path_buf(),
                encoding: encoding.label(),
            })
        }
        TextEncoding::ShiftJis => {
            let (text, _, had_errors) = SHIFT_JIS.decode(bytes);
            if had_errors {
                tracing::debug!(
                    path = %path.display(),
                    "Shift_JIS decode replaced malformed sequences"
                );
            }
            Ok(text.into_owned())
        }
    }
}

/// Parses CSV text into a grid without header handling.
///
/// Blank lines are skipped by the CSV reader; rows may be ragged.
pub fn parse_csv_text(text: &str, path: &Path) -> Result<RawGrid> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(record.iter().map(non_empty).collect());
    }
    Ok(RawGrid { rows })
}

/// Reads a whole file as raw bytes.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| IngestError::file_read(path, e))
}

/// Reads and decodes a CSV file into a grid.
pub fn read_csv_grid(path: &Path, encoding: TextEncoding) -> Result<RawGrid> {
    let bytes = read_bytes(path)?;
    let text = decode_bytes(&bytes, encoding, path)?;
    parse_csv_text(&text, path)
}
