//! Per-disease coverage of the unified table.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;
use serde::Serialize;

use idwr_common::{column_i64, column_string};
use idwr_model::{COUNT, DISEASE, SOURCE, WEEK, YEAR};

/// Reporting span and volume of one disease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseCoverage {
    pub disease: String,
    pub first_year: i32,
    pub first_week: i32,
    pub last_year: i32,
    pub last_week: i32,
    pub sources: BTreeSet<String>,
    /// Sum of non-null counts.
    pub total_count: i64,
    pub rows: usize,
}

impl DiseaseCoverage {
    fn new(disease: String, year: i32, week: i32) -> Self {
        Self {
            disease,
            first_year: year,
            first_week: week,
            last_year: year,
            last_week: week,
            sources: BTreeSet::new(),
            total_count: 0,
            rows: 0,
        }
    }

    pub fn first(&self) -> (i32, i32) {
        (self.first_year, self.first_week)
    }

    pub fn last(&self) -> (i32, i32) {
        (self.last_year, self.last_week)
    }

    fn observe(&mut self, year: i32, week: i32, source: Option<String>, count: Option<i64>) {
        if (year, week) < self.first() {
            (self.first_year, self.first_week) = (year, week);
        }
        if (year, week) > self.last() {
            (self.last_year, self.last_week) = (year, week);
        }
        if let Some(source) = source {
            self.sources.insert(source);
        }
        self.total_count += count.unwrap_or(0);
        self.rows += 1;
    }
}

/// One entry per disease, sorted by disease name. Rows without a disease,
/// year or week are ignored.
pub fn disease_coverage(df: &DataFrame) -> Vec<DiseaseCoverage> {
    let mut by_disease: BTreeMap<String, DiseaseCoverage> = BTreeMap::new();
    for idx in 0..df.height() {
        let Some(disease) = column_string(df, DISEASE, idx) else {
            continue;
        };
        let year = column_i64(df, YEAR, idx).and_then(|v| i32::try_from(v).ok());
        let week = column_i64(df, WEEK, idx).and_then(|v| i32::try_from(v).ok());
        let (Some(year), Some(week)) = (year, week) else {
            continue;
        };
        by_disease
            .entry(disease.clone())
            .or_insert_with(|| DiseaseCoverage::new(disease, year, week))
            .observe(
                year,
                week,
                column_string(df, SOURCE, idx),
                column_i64(df, COUNT, idx),
            );
    }
    by_disease.into_values().collect()
}
