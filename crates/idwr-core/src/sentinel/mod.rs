//! Weekly sentinel bulletins (`teiten` CSVs).
//!
//! Two layouts are published: a Shift_JIS Japanese table and a UTF-8
//! English table. Both pair each disease's count column with a
//! per-sentinel rate column.

mod en;
mod ja;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Result, bail};
use tracing::{debug, info, info_span};

use idwr_ingest::{RawGrid, TextEncoding, csv_inputs, decode_bytes, parse_csv_text, read_bytes};
use idwr_model::{DatasetKind, DiseaseNameTracker, SourceTag, SurveillanceRecord};
use idwr_transform::{iso_week_monday, normalize_disease_name, parse_sentinel_value, sentinel_count};

use crate::options::ParseOptions;
use crate::outcome::ParseOutcome;

pub use en::{parse_english_grid, week_from_title};
pub use ja::parse_japanese_grid;

/// Column layout of a sentinel CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentinelLayout {
    /// Shift_JIS, two metadata rows, disease row then marker row.
    Japanese,
    /// UTF-8 "rapid" table with a "current week" metric row.
    English,
}

impl SentinelLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentinelLayout::Japanese => "ja",
            SentinelLayout::English => "en",
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        match self {
            SentinelLayout::Japanese => TextEncoding::ShiftJis,
            SentinelLayout::English => TextEncoding::Utf8,
        }
    }

    /// UTF-8 content mentioning "current week" is the English layout;
    /// anything else is read as Japanese.
    pub fn detect(bytes: &[u8]) -> SentinelLayout {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        match std::str::from_utf8(bytes) {
            Ok(text) if text.to_lowercase().contains("current week") => SentinelLayout::English,
            _ => SentinelLayout::Japanese,
        }
    }
}

impl fmt::Display for SentinelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SentinelLayout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ja" | "japanese" => Ok(SentinelLayout::Japanese),
            "en" | "english" => Ok(SentinelLayout::English),
            other => bail!("unknown sentinel layout: {other}"),
        }
    }
}

/// Result of one sentinel file once its year and week are resolved.
#[derive(Debug)]
pub(crate) enum SentinelParse {
    Records(Vec<SurveillanceRecord>),
    /// The resolved week is outside the requested weeks.
    WeekFiltered(i32),
}

/// A disease with its count column and optional per-sentinel column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnPair {
    pub disease: String,
    pub count_col: usize,
    pub rate_col: Option<usize>,
}

/// Canonicalizes pair disease names and drops pairs left without a name.
pub(crate) fn normalize_pairs(
    pairs: Vec<ColumnPair>,
    tracker: &mut DiseaseNameTracker,
) -> Vec<ColumnPair> {
    pairs
        .into_iter()
        .filter_map(|pair| {
            let disease = normalize_disease_name(&pair.disease, tracker);
            (!disease.is_empty()).then_some(ColumnPair { disease, ..pair })
        })
        .collect()
}

/// Emits one record per disease pair for the prefecture on `row`.
pub(crate) fn pair_records(
    grid: &RawGrid,
    row: usize,
    prefecture: &str,
    year: i32,
    week: i32,
    pairs: &[ColumnPair],
) -> Vec<SurveillanceRecord> {
    let date = iso_week_monday(year, week);
    pairs
        .iter()
        .map(|pair| {
            let count = parse_sentinel_value(grid.cell(row, pair.count_col));
            let rate = pair
                .rate_col
                .and_then(|col| parse_sentinel_value(grid.cell(row, col)));
            SurveillanceRecord::new(
                prefecture,
                year,
                week,
                pair.disease.as_str(),
                SourceTag::SentinelSurveillance,
            )
            .with_date(date)
            .with_count(sentinel_count(count))
            .with_per_sentinel(rate)
        })
        .collect()
}

/// Parses one sentinel file into `outcome`.
pub fn parse_sentinel_file(
    path: &Path,
    options: &ParseOptions,
    tracker: &mut DiseaseNameTracker,
    outcome: &mut ParseOutcome,
) {
    let _span = info_span!("sentinel", path = %path.display()).entered();
    let bytes = match read_bytes(path) {
        Ok(bytes) => bytes,
        Err(error) => {
            outcome.skip_file(path, error.to_string());
            return;
        }
    };
    let layout = options
        .sentinel_layout
        .unwrap_or_else(|| SentinelLayout::detect(&bytes));
    let grid = match decode_bytes(&bytes, layout.encoding(), path)
        .and_then(|text| parse_csv_text(&text, path))
    {
        Ok(grid) => grid,
        Err(error) => {
            outcome.skip_file(path, error.to_string());
            return;
        }
    };
    let parsed = match layout {
        SentinelLayout::Japanese => ja::parse_japanese_file(grid, path, options, tracker),
        SentinelLayout::English => en::parse_english_file(grid, path, options, tracker),
    };
    match parsed {
        Ok(SentinelParse::WeekFiltered(week)) => {
            debug!(week, "week not requested");
        }
        Ok(SentinelParse::Records(records)) => {
            info!(layout = %layout, rows = records.len(), "parsed sentinel bulletin");
            outcome.records.extend(records);
            outcome.files_read += 1;
        }
        Err(reason) => outcome.skip_file(path, reason),
    }
}

/// Parses a sentinel CSV, or every CSV in a directory.
///
/// The week filter applies to the week each layout resolves, so English
/// files named without a week are matched on their title.
pub fn parse_sentinel(
    path: &Path,
    options: &ParseOptions,
    tracker: &mut DiseaseNameTracker,
) -> Result<ParseOutcome> {
    let mut outcome = ParseOutcome::new(DatasetKind::Sentinel);
    for file in csv_inputs(path)? {
        parse_sentinel_file(&file, options, tracker, &mut outcome);
    }
    Ok(outcome)
}
