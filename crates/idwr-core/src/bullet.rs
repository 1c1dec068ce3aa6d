//! Modern weekly all-case bulletins (`zensu` CSVs, 2024 onward).
//!
//! Layout: three metadata rows, one header row with bilingual disease
//! names, one subheader row ("current week" / "cumulative"), then one row
//! per prefecture. Each disease occupies two columns; the second repeats the
//! header (or leaves it blank) and holds the cumulative count.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use tracing::{info, info_span};

use idwr_ingest::{RawGrid, TextEncoding, csv_inputs, infer_week, infer_year, read_csv_grid};
use idwr_model::{DatasetKind, DiseaseNameTracker, SourceTag, SurveillanceRecord};
use idwr_transform::{
    clean_bullet_column_name, coerce_count, iso_week_sunday, normalize_disease_name,
    normalize_fullwidth,
};

use crate::options::ParseOptions;
use crate::outcome::ParseOutcome;

const METADATA_ROWS: usize = 3;
const HEADER_ROW: usize = 0;
const FIRST_DATA_ROW: usize = 2;

/// Columns that carry current-week counts: first occurrence of each
/// non-empty header, with its cleaned disease name.
fn count_columns(header: &[Option<String>]) -> Vec<(usize, String)> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns = Vec::new();
    for (idx, cell) in header.iter().enumerate().skip(1) {
        let Some(raw) = cell.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        if !seen.insert(raw) {
            continue;
        }
        if let Some(name) = clean_bullet_column_name(raw) {
            columns.push((idx, name));
        }
    }
    columns
}

fn clean_prefecture(raw: Option<&str>) -> Option<String> {
    let text = normalize_fullwidth(raw?);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parses one bulletin grid (metadata rows included) into long records.
pub fn parse_bullet_grid(
    grid: RawGrid,
    year: i32,
    week: i32,
    tracker: &mut DiseaseNameTracker,
) -> Vec<SurveillanceRecord> {
    let grid = grid.skip_rows(METADATA_ROWS);
    let header = grid.row(HEADER_ROW).unwrap_or_default();
    let columns: Vec<(usize, String)> = count_columns(header)
        .into_iter()
        .map(|(idx, name)| (idx, normalize_disease_name(&name, tracker)))
        .filter(|(_, disease)| !disease.is_empty())
        .collect();

    let date = iso_week_sunday(year, week);
    let mut records = Vec::new();
    for row in FIRST_DATA_ROW..grid.height() {
        let Some(prefecture) = clean_prefecture(grid.cell(row, 0)) else {
            continue;
        };
        for (col, disease) in &columns {
            records.push(
                SurveillanceRecord::new(
                    prefecture.as_str(),
                    year,
                    week,
                    disease.as_str(),
                    SourceTag::AllCaseReporting,
                )
                .with_date(date)
                .with_count(Some(coerce_count(grid.cell(row, *col)))),
            );
        }
    }
    records
}

/// Parses one bulletin file into `outcome`.
pub fn parse_bullet_file(
    path: &Path,
    options: &ParseOptions,
    tracker: &mut DiseaseNameTracker,
    outcome: &mut ParseOutcome,
) {
    let _span = info_span!("bulletin", path = %path.display()).entered();
    let Some(year) = options.year.or_else(|| infer_year(path)) else {
        outcome.skip_file(path, "no year in file name");
        return;
    };
    let Some(week) = infer_week(path) else {
        outcome.skip_file(path, "no week in file name");
        return;
    };
    let grid = match read_csv_grid(path, TextEncoding::Utf8) {
        Ok(grid) => grid,
        Err(error) => {
            outcome.skip_file(path, error.to_string());
            return;
        }
    };
    let records = parse_bullet_grid(grid, year, week, tracker);
    info!(year, week, rows = records.len(), "parsed all-case bulletin");
    outcome.records.extend(records);
    outcome.files_read += 1;
}

/// Parses an all-case bulletin CSV, or every CSV in a directory.
pub fn parse_bullet(
    path: &Path,
    options: &ParseOptions,
    tracker: &mut DiseaseNameTracker,
) -> Result<ParseOutcome> {
    let mut outcome = ParseOutcome::new(DatasetKind::Bullet);
    for file in csv_inputs(path)? {
        if !options.accepts_week(infer_week(&file)) {
            continue;
        }
        parse_bullet_file(&file, options, tracker, &mut outcome);
    }
    Ok(outcome)
}
