//! Excel workbook access for the historical confirmed-case files.
//!
//! Sheets are exposed as [`RawGrid`]s with absolute row/column positions:
//! calamine reports the used range only, so leading empty rows and columns
//! are padded back in.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto};

use idwr_common::format_numeric;

use crate::error::{IngestError, Result};
use crate::grid::RawGrid;

/// An open `.xls`/`.xlsx` workbook.
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(IngestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let sheets = open_workbook_auto(path).map_err(|e| IngestError::WorkbookOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.sheet_names().len()
    }

    /// Reads a sheet by 1-based position. Returns `Ok(None)` when the
    /// workbook has fewer sheets.
    pub fn sheet_grid(&mut self, sheet_id: usize) -> Result<Option<RawGrid>> {
        let Some(index) = sheet_id.checked_sub(1) else {
            return Ok(None);
        };
        match self.sheets.worksheet_range_at(index) {
            None => Ok(None),
            Some(Ok(range)) => Ok(Some(range_to_grid(&range))),
            Some(Err(e)) => Err(IngestError::SheetRead {
                path: self.path.clone(),
                sheet: sheet_id,
                message: e.to_string(),
            }),
        }
    }
}

/// Text form of a workbook cell. Whole floats print without a fraction so
/// counts read back as integers.
pub fn cell_text(value: &Data) -> Option<String> {
    match value {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_numeric(*f)),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let Some((start_row, start_col)) = range.start() else {
        return RawGrid::default();
    };
    let mut rows: Vec<Vec<Option<String>>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells: Vec<Option<String>> = vec![None; start_col as usize];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }
    RawGrid::new(rows)
}
