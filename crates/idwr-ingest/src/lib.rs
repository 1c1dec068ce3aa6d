//! Raw bulletin ingestion.
//!
//! Locates bulletin files, infers year/week from their names, and reads them
//! into header-less [`RawGrid`]s. Layout interpretation belongs to the
//! parsers in `idwr-core`.

pub mod discovery;
pub mod error;
pub mod filename;
pub mod grid;
pub mod workbook;

pub use discovery::{
    csv_inputs, is_workbook_for, list_csv_files, list_workbooks, workbook_inputs,
};
pub use error::{IngestError, Result};
pub use filename::{infer_sentinel_stem_week, infer_week, infer_year, infer_year_week};
pub use grid::{RawGrid, TextEncoding, decode_bytes, parse_csv_text, read_bytes, read_csv_grid};
pub use workbook::{Workbook, cell_text};
