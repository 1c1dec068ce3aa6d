//! Japanese legacy sentinel layout.
//!
//! After two metadata rows: a disease row (name in the first column of each
//! pair), a marker row (non-blank over the per-sentinel column), then one
//! row per prefecture.

use std::path::Path;

use idwr_ingest::{RawGrid, infer_week, infer_year};
use idwr_model::{DiseaseNameTracker, SurveillanceRecord};
use idwr_transform::clean_cell_text;

use super::{ColumnPair, SentinelParse, normalize_pairs, pair_records};
use crate::options::ParseOptions;

const METADATA_ROWS: usize = 2;
const MIN_ROWS: usize = 3;
const DISEASE_ROW: usize = 0;
const MARKER_ROW: usize = 1;
const FIRST_DATA_ROW: usize = 2;
const TOTAL_MARKERS: [&str; 2] = ["総数", "合計"];

/// Walks the disease and marker rows left to right.
///
/// A named disease cell opens a pair on its column; the next blank-named
/// column with a marker closes it as the rate column. A pair still open when
/// the next disease starts, or at the end, has no rate column.
fn column_pairs(grid: &RawGrid) -> Vec<ColumnPair> {
    let mut pairs = Vec::new();
    let mut open: Option<ColumnPair> = None;
    for col in 1..grid.width() {
        let disease = clean_cell_text(grid.cell(DISEASE_ROW, col));
        let marker = clean_cell_text(grid.cell(MARKER_ROW, col));
        match (disease, marker) {
            (Some(disease), _) => {
                pairs.extend(open.take());
                open = Some(ColumnPair {
                    disease,
                    count_col: col,
                    rate_col: None,
                });
            }
            (None, Some(_)) => {
                if let Some(mut pair) = open.take() {
                    pair.rate_col = Some(col);
                    pairs.push(pair);
                }
            }
            (None, None) => {}
        }
    }
    pairs.extend(open);
    pairs
}

fn is_total_row(prefecture: &str) -> bool {
    TOTAL_MARKERS.iter().any(|marker| prefecture.contains(marker))
}

/// Parses a decoded Japanese sentinel grid, metadata rows included.
pub fn parse_japanese_grid(
    grid: RawGrid,
    year: i32,
    week: i32,
    tracker: &mut DiseaseNameTracker,
) -> Result<Vec<SurveillanceRecord>, String> {
    let grid = grid.skip_rows(METADATA_ROWS);
    if grid.height() < MIN_ROWS {
        return Err(format!("only {} rows after metadata", grid.height()));
    }
    let pairs = normalize_pairs(column_pairs(&grid), tracker);

    let mut records = Vec::new();
    for row in FIRST_DATA_ROW..grid.height() {
        let Some(prefecture) = clean_cell_text(grid.cell(row, 0)) else {
            continue;
        };
        if is_total_row(&prefecture) {
            continue;
        }
        records.extend(pair_records(&grid, row, &prefecture, year, week, &pairs));
    }
    Ok(records)
}

pub(super) fn parse_japanese_file(
    grid: RawGrid,
    path: &Path,
    options: &ParseOptions,
    tracker: &mut DiseaseNameTracker,
) -> Result<SentinelParse, String> {
    let year = options
        .year
        .or_else(|| infer_year(path))
        .ok_or("no year in file name")?;
    let week = infer_week(path).ok_or("no week in file name")?;
    if !options.accepts_week(Some(week)) {
        return Ok(SentinelParse::WeekFiltered(week));
    }
    parse_japanese_grid(grid, year, week, tracker).map(SentinelParse::Records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> RawGrid {
        RawGrid::from_strings([
            vec!["定点把握", "", "", "", ""],
            vec!["2025年4週", "", "", "", ""],
            vec!["", "インフルエンザ", "", "ＲＳウイルス感染症", "咽頭結膜熱"],
            vec!["", "報告", "定当", "報告", ""],
            vec!["総数", "9,000", "20.00", "100", "5"],
            vec!["北海道", "1,794", "8.08", "-", ""],
            vec!["合計", "1", "1", "1", "1"],
        ])
    }

    #[test]
    fn pairs_close_on_marker_and_stay_open_otherwise() {
        let pairs = column_pairs(&grid().skip_rows(METADATA_ROWS));
        let shape: Vec<(usize, Option<usize>)> =
            pairs.iter().map(|p| (p.count_col, p.rate_col)).collect();
        assert_eq!(shape, vec![(1, Some(2)), (3, None), (4, None)]);
        assert_eq!(pairs[1].disease, "RSウイルス感染症");
    }

    #[test]
    fn prefecture_rows_become_records() {
        let mut tracker = DiseaseNameTracker::new();
        let records = parse_japanese_grid(grid(), 2025, 4, &mut tracker).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.prefecture == "北海道"));
        assert_eq!(records[0].count, Some(1794));
        assert_eq!(records[0].per_sentinel, Some(8.08));
        assert_eq!(records[1].count, None);
        assert_eq!(records[1].per_sentinel, None);
        assert_eq!(records[2].count, None);
        assert_eq!(records[0].date, chrono::NaiveDate::from_ymd_opt(2025, 1, 20));
    }

    #[test]
    fn too_few_rows_is_rejected() {
        let grid = RawGrid::from_strings([["a"], ["b"], ["c"], ["d"]]);
        let mut tracker = DiseaseNameTracker::new();
        assert!(parse_japanese_grid(grid, 2025, 4, &mut tracker).is_err());
    }
}
