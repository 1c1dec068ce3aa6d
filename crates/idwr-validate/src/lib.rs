//! Checks run on the unified table before it is written.
//!
//! Each check returns the first problem it finds as a [`ValidationError`].
//! [`validate_unified`] runs schema, uniqueness and range checks in that
//! order and stops at the first failure; [`check_unified`] runs all of them
//! and collects the outcome for reporting.

mod error;

pub use error::{Result, ValidationError};

use std::collections::HashMap;

use polars::prelude::DataFrame;
use serde::Serialize;

use idwr_common::{column_i64, column_value_string, has_column};
use idwr_model::{CATEGORY, KEY_COLUMNS, REQUIRED_COLUMNS, WEEK, WEEK_RANGE, YEAR, YEAR_RANGE};

/// Requires prefecture, year, week, disease and count.
pub fn validate_schema(df: &DataFrame) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !has_column(df, name))
        .map(|name| (*name).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingColumns(missing))
    }
}

/// Rejects repeated keys. `category` is part of the key when present.
pub fn validate_no_duplicates(df: &DataFrame) -> Result<()> {
    let columns: Vec<&str> = KEY_COLUMNS
        .iter()
        .copied()
        .filter(|name| *name != CATEGORY || has_column(df, CATEGORY))
        .collect();
    let mut counts: HashMap<Vec<String>, usize> = HashMap::with_capacity(df.height());
    for idx in 0..df.height() {
        let key = columns
            .iter()
            .map(|name| column_value_string(df, name, idx))
            .collect();
        *counts.entry(key).or_insert(0) += 1;
    }
    let groups = counts.values().filter(|count| **count > 1).count();
    if groups == 0 {
        Ok(())
    } else {
        tracing::debug!(groups, "duplicate key groups");
        Err(ValidationError::DuplicateKeys {
            groups,
            columns: columns.iter().map(|name| (*name).to_string()).collect(),
        })
    }
}

fn min_max(df: &DataFrame, column: &str) -> Result<Option<(i64, i64)>> {
    let mut bounds: Option<(i64, i64)> = None;
    let mut nulls = 0;
    for idx in 0..df.height() {
        match column_i64(df, column, idx) {
            Some(value) => {
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(value), hi.max(value)),
                    None => (value, value),
                });
            }
            None => nulls += 1,
        }
    }
    if nulls > 0 {
        return Err(ValidationError::NullValues {
            column: column.to_string(),
            count: nulls,
        });
    }
    Ok(bounds)
}

/// Year within 1999–2030 and week within 1–53, with no nulls.
pub fn validate_date_ranges(df: &DataFrame) -> Result<()> {
    if let Some((min, max)) = min_max(df, YEAR)? {
        if min < i64::from(YEAR_RANGE.0) || max > i64::from(YEAR_RANGE.1) {
            return Err(ValidationError::YearOutOfRange { min, max });
        }
    }
    if let Some((min, max)) = min_max(df, WEEK)? {
        if min < i64::from(WEEK_RANGE.0) || max > i64::from(WEEK_RANGE.1) {
            return Err(ValidationError::WeekOutOfRange { min, max });
        }
    }
    Ok(())
}

/// Schema, uniqueness, then ranges; stops at the first failure.
pub fn validate_unified(df: &DataFrame) -> Result<()> {
    validate_schema(df)?;
    validate_no_duplicates(df)?;
    validate_date_ranges(df)
}

/// Outcome of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub check: &'static str,
    pub passed: bool,
    pub message: Option<String>,
}

/// All checks, each run independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub rows: usize,
    pub checks: Vec<CheckOutcome>,
}

impl ValidationSummary {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }
}

/// Runs every check and reports each outcome. Range and uniqueness checks
/// are skipped when the schema check fails.
pub fn check_unified(df: &DataFrame) -> ValidationSummary {
    let outcome = |check: &'static str, result: Result<()>| CheckOutcome {
        check,
        passed: result.is_ok(),
        message: result.err().map(|e| e.to_string()),
    };
    let schema = validate_schema(df);
    let schema_ok = schema.is_ok();
    let mut checks = vec![outcome("schema", schema)];
    if schema_ok {
        checks.push(outcome("duplicates", validate_no_duplicates(df)));
        checks.push(outcome("date_ranges", validate_date_ranges(df)));
    }
    ValidationSummary {
        rows: df.height(),
        checks,
    }
}
