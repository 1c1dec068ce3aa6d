//! Historical confirmed-case workbooks (sex and place-of-infection tables).
//!
//! One workbook per year, one sheet per week. Sheet layout, with absolute
//! row numbers:
//!
//! | row | content                                    |
//! |-----|--------------------------------------------|
//! | 0-1 | title                                      |
//! | 2   | disease names, first cell of merged blocks |
//! | 3   | category per column                        |
//! | 4+  | one row per prefecture                     |

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, info_span, warn};

use idwr_ingest::{RawGrid, Workbook, infer_year, workbook_inputs};
use idwr_model::{Category, DatasetKind, DiseaseNameTracker, SourceTag, SurveillanceRecord};
use idwr_transform::{
    clean_cell_text, coerce_count, is_duplicate_header_artifact, iso_week_sunday,
    normalize_disease_name, resolve_headers, split_header_label,
};

use crate::outcome::ParseOutcome;

const DISEASE_ROW: usize = 2;
const CATEGORY_ROW: usize = 3;
const FIRST_DATA_ROW: usize = 4;
const MIN_SHEET_ROWS: usize = 5;

/// Which sheets of a yearly workbook hold weekly tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetPlan {
    /// First 1-based sheet id.
    pub first: usize,
    /// Exclusive end sheet id.
    pub end: usize,
    /// Added to the sheet id to get the week number.
    pub week_offset: i32,
}

impl SheetPlan {
    /// The 1999 workbook starts in April; 53-week years carry one more sheet.
    pub fn for_year(year: i32) -> Self {
        match year {
            1999 => Self {
                first: 2,
                end: 41,
                week_offset: 12,
            },
            2004 | 2009 | 2015 => Self {
                first: 2,
                end: 55,
                week_offset: -1,
            },
            _ => Self {
                first: 2,
                end: 54,
                week_offset: -1,
            },
        }
    }

    pub fn sheets(&self) -> std::ops::Range<usize> {
        self.first..self.end
    }

    pub fn week_for_sheet(&self, sheet_id: usize) -> i32 {
        sheet_id as i32 + self.week_offset
    }
}

/// Why a sheet was not parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetRejection {
    TooShort { rows: usize },
    NoTotalCategory,
}

impl SheetRejection {
    pub fn reason(&self) -> String {
        match self {
            SheetRejection::TooShort { rows } => format!("sheet has only {rows} rows"),
            SheetRejection::NoTotalCategory => "no total column in category row".to_string(),
        }
    }
}

fn is_total_label(text: &str) -> bool {
    text.to_lowercase().contains("total")
}

/// Parses one weekly sheet into long records.
///
/// Columns whose resolved label is a duplicate-header artifact are dropped.
/// Rows whose cleaned prefecture is blank or a total row are dropped.
/// Counts are coerced to non-negative integers.
pub fn parse_confirmed_sheet(
    grid: &RawGrid,
    year: i32,
    week: i32,
    tracker: &mut DiseaseNameTracker,
) -> std::result::Result<Vec<SurveillanceRecord>, SheetRejection> {
    if grid.height() < MIN_SHEET_ROWS {
        return Err(SheetRejection::TooShort {
            rows: grid.height(),
        });
    }
    let disease_row = grid.row(DISEASE_ROW).unwrap_or_default();
    let category_row = grid.row(CATEGORY_ROW).unwrap_or_default();
    let has_total = category_row
        .iter()
        .filter_map(|cell| clean_cell_text(cell.as_deref()))
        .any(|text| is_total_label(&text));
    if !has_total {
        return Err(SheetRejection::NoTotalCategory);
    }

    let headers = resolve_headers(disease_row, category_row);
    let columns: Vec<(usize, String, Category)> = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, label)| !is_duplicate_header_artifact(label))
        .filter_map(|(idx, label)| {
            let (disease_raw, category) = split_header_label(label)?;
            let category = category.parse::<Category>().ok()?;
            let disease = normalize_disease_name(disease_raw, tracker);
            (!disease.is_empty()).then_some((idx, disease, category))
        })
        .collect();

    let date = iso_week_sunday(year, week);
    let mut records = Vec::new();
    for row in FIRST_DATA_ROW..grid.height() {
        let Some(prefecture) = clean_cell_text(grid.cell(row, 0)) else {
            continue;
        };
        if is_total_label(&prefecture) {
            continue;
        }
        for (col, disease, category) in &columns {
            records.push(
                SurveillanceRecord::new(
                    prefecture.as_str(),
                    year,
                    week,
                    disease.as_str(),
                    SourceTag::ConfirmedCases,
                )
                .with_date(date)
                .with_category(*category)
                .with_count(Some(coerce_count(grid.cell(row, *col)))),
            );
        }
    }
    Ok(records)
}

/// Parses every weekly sheet of one workbook into `outcome`.
///
/// Unreadable sheets and rejected sheets are recorded and skipped.
pub fn parse_confirmed_workbook(
    path: &Path,
    tracker: &mut DiseaseNameTracker,
    outcome: &mut ParseOutcome,
) {
    let _span = info_span!("workbook", path = %path.display()).entered();
    let Some(year) = infer_year(path) else {
        outcome.skip_file(path, "no year in file name");
        return;
    };
    let mut workbook = match Workbook::open(path) {
        Ok(workbook) => workbook,
        Err(error) => {
            outcome.skip_file(path, error.to_string());
            return;
        }
    };

    let plan = SheetPlan::for_year(year);
    let before = outcome.records.len();
    for sheet_id in plan.sheets() {
        let grid = match workbook.sheet_grid(sheet_id) {
            Ok(Some(grid)) => grid,
            Ok(None) => {
                debug!(sheet = sheet_id, "workbook has no more sheets");
                break;
            }
            Err(error) => {
                warn!(sheet = sheet_id, %error, "failed to read sheet");
                outcome.skip_sheet(path, sheet_id, error.to_string());
                continue;
            }
        };
        let week = plan.week_for_sheet(sheet_id);
        match parse_confirmed_sheet(&grid, year, week, tracker) {
            Ok(records) => outcome.records.extend(records),
            Err(rejection) => {
                debug!(sheet = sheet_id, reason = %rejection.reason(), "sheet rejected");
                outcome.skip_sheet(path, sheet_id, rejection.reason());
            }
        }
    }
    outcome.files_read += 1;
    info!(
        year,
        rows = outcome.records.len() - before,
        "parsed confirmed-case workbook"
    );
}

/// Parses a historical workbook, or every workbook of `kind` in a directory.
///
/// Only a missing or unreadable input path is an error; everything below
/// that is skipped and recorded in the outcome.
pub fn parse_confirmed(
    path: &Path,
    kind: DatasetKind,
    tracker: &mut DiseaseNameTracker,
) -> Result<ParseOutcome> {
    let mut outcome = ParseOutcome::new(kind);
    for file in workbook_inputs(path, kind)? {
        parse_confirmed_workbook(&file, tracker, &mut outcome);
    }
    Ok(outcome)
}
