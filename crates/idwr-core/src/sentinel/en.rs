//! English "rapid" sentinel layout.
//!
//! Row 1 carries the bulletin title ("4th week, 2025"). Somewhere below, a
//! metric row labels each pair "Current week" / "Per sentinel"; the row
//! above it names the diseases. Prefecture rows follow the metric row.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use idwr_ingest::{RawGrid, infer_sentinel_stem_week, infer_year};
use idwr_model::{DiseaseNameTracker, SurveillanceRecord};
use idwr_transform::clean_label_text;

use super::{ColumnPair, SentinelParse, normalize_pairs, pair_records};
use crate::options::ParseOptions;

const MIN_ROWS: usize = 6;
const TITLE_ROW: usize = 1;
const METRIC_MARKER: &str = "current week";

static TITLE_WEEK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)(?:st|nd|rd|th)\s+week,\s*(\d{4})").expect("title week pattern")
});

/// Week and year from a title such as `"4th week, 2025"`.
pub fn week_from_title(title: &str) -> Option<(i32, i32)> {
    let caps = TITLE_WEEK.captures(title)?;
    let week = caps.get(1)?.as_str().parse().ok()?;
    let year = caps.get(2)?.as_str().parse().ok()?;
    Some((week, year))
}

fn title_text(grid: &RawGrid) -> String {
    grid.row(TITLE_ROW)
        .unwrap_or_default()
        .iter()
        .filter_map(|cell| cell.as_deref().map(str::trim).filter(|s| !s.is_empty()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn metric_row(grid: &RawGrid) -> Option<usize> {
    grid.rows.iter().position(|row| {
        row.iter()
            .flatten()
            .any(|cell| cell.to_lowercase().contains(METRIC_MARKER))
    })
}

/// Diseases sit on odd columns; the per-sentinel column follows each one.
fn column_pairs(grid: &RawGrid, disease_row: usize) -> Vec<ColumnPair> {
    let width = grid.width();
    (1..width)
        .step_by(2)
        .filter_map(|col| {
            let disease = clean_label_text(grid.cell(disease_row, col))?;
            Some(ColumnPair {
                disease,
                count_col: col,
                rate_col: (col + 1 < width).then_some(col + 1),
            })
        })
        .collect()
}

/// Parses a decoded English sentinel grid for a known year and week.
pub fn parse_english_grid(
    grid: &RawGrid,
    year: i32,
    week: i32,
    tracker: &mut DiseaseNameTracker,
) -> Result<Vec<SurveillanceRecord>, String> {
    if grid.height() < MIN_ROWS {
        return Err(format!("only {} rows", grid.height()));
    }
    let metric = match metric_row(grid) {
        Some(0) => return Err("metric row has no disease row above it".to_string()),
        Some(row) => row,
        None => return Err("no current-week metric row".to_string()),
    };
    let pairs = normalize_pairs(column_pairs(grid, metric - 1), tracker);

    let mut records = Vec::new();
    for row in metric + 1..grid.height() {
        let Some(prefecture) = clean_label_text(grid.cell(row, 0)) else {
            continue;
        };
        if prefecture.to_lowercase().starts_with("total") {
            continue;
        }
        records.extend(pair_records(grid, row, &prefecture, year, week, &pairs));
    }
    Ok(records)
}

/// Resolves year and week (argument, then title, then file name), applies
/// the week filter and parses.
pub(super) fn parse_english_file(
    grid: RawGrid,
    path: &Path,
    options: &ParseOptions,
    tracker: &mut DiseaseNameTracker,
) -> Result<SentinelParse, String> {
    let titled = week_from_title(&title_text(&grid));
    let week = titled
        .map(|(week, _)| week)
        .or_else(|| infer_sentinel_stem_week(path))
        .ok_or("no week in title or file name")?;
    let year = options
        .year
        .or(titled.map(|(_, year)| year))
        .or_else(|| infer_year(path))
        .ok_or("no year in title or file name")?;
    if !options.accepts_week(Some(week)) {
        return Ok(SentinelParse::WeekFiltered(week));
    }
    parse_english_grid(&grid, year, week, tracker).map(SentinelParse::Records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_parsing() {
        assert_eq!(week_from_title("Sentinel, 4th week, 2025"), Some((4, 2025)));
        assert_eq!(week_from_title("52ND WEEK,2024"), Some((52, 2024)));
        assert_eq!(week_from_title("week 4"), None);
    }

    #[test]
    fn qualified_disease_names_keep_their_qualifier() {
        let grid = RawGrid::from_strings([
            vec!["IDWR", "", "", "", ""],
            vec!["Sentinel", "4th week, 2025", "", "", ""],
            vec!["", "Infectious gastroenteritis (only rotavirus)", "", "Influenza", ""],
            vec!["", "Current week", "Per sentinel", "Current week", "Per sentinel"],
            vec!["Total", "10", "0.5", "9000", "18.2"],
            vec!["Hokkaido", "2", "0.1", "1794", "8.08"],
        ]);
        let pairs = column_pairs(&grid, 2);
        assert_eq!(pairs[0].disease, "Infectious gastroenteritis (only rotavirus)");
        assert_eq!(pairs[1].disease, "Influenza");
    }

    #[test]
    fn grid_without_metric_row_is_rejected() {
        let grid = RawGrid::from_strings(vec![vec!["x"]; 6]);
        let mut tracker = DiseaseNameTracker::new();
        assert!(parse_english_grid(&grid, 2025, 4, &mut tracker).is_err());
    }

    #[test]
    fn metric_row_at_top_is_rejected() {
        let mut rows = vec![vec!["", "Current week"]];
        rows.extend(vec![vec!["x", "1"]; 5]);
        let grid = RawGrid::from_strings(rows);
        let mut tracker = DiseaseNameTracker::new();
        assert!(parse_english_grid(&grid, 2025, 4, &mut tracker).is_err());
    }
}
