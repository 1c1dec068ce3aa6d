//! Row filters over loaded tables.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use polars::prelude::{DataFrame, PolarsResult};
use serde::{Deserialize, Serialize};

use idwr_common::{column_i64, column_string, column_value_string};
use idwr_model::{DISEASE, PREFECTURE, SOURCE, SourceFilter, WEEK, YEAR};
use idwr_transform::retain_rows;

/// Filter set applied by [`DataQuery::apply`]. Empty lists and unset
/// ranges match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuery {
    /// Case-insensitive substrings; a row matches if any one matches.
    pub diseases: Vec<String>,
    /// Exact prefecture names.
    pub prefectures: Vec<String>,
    pub years: Option<(i32, i32)>,
    pub weeks: Option<(i32, i32)>,
    pub source: SourceFilter,
    pub limit: Option<usize>,
}

impl DataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disease(mut self, pattern: impl Into<String>) -> Self {
        self.diseases.push(pattern.into());
        self
    }

    pub fn prefecture(mut self, name: impl Into<String>) -> Self {
        self.prefectures.push(name.into());
        self
    }

    pub fn years(mut self, range: RangeInclusive<i32>) -> Self {
        self.years = Some((*range.start(), *range.end()));
        self
    }

    pub fn weeks(mut self, range: RangeInclusive<i32>) -> Self {
        self.weeks = Some((*range.start(), *range.end()));
        self
    }

    pub fn source(mut self, source: SourceFilter) -> Self {
        self.source = source;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, df: &DataFrame, idx: usize, patterns: &[String]) -> bool {
        if !patterns.is_empty() {
            let disease = column_value_string(df, DISEASE, idx).to_lowercase();
            if !patterns.iter().any(|p| disease.contains(p.as_str())) {
                return false;
            }
        }
        if !self.prefectures.is_empty() {
            let prefecture = column_value_string(df, PREFECTURE, idx);
            if !self.prefectures.contains(&prefecture) {
                return false;
            }
        }
        if !in_range(column_i64(df, YEAR, idx), self.years)
            || !in_range(column_i64(df, WEEK, idx), self.weeks)
        {
            return false;
        }
        self.source == SourceFilter::All
            || column_string(df, SOURCE, idx).is_some_and(|source| self.source.matches(&source))
    }

    /// Returns the matching rows in input order, truncated to `limit`.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        let patterns: Vec<String> = self.diseases.iter().map(|p| p.to_lowercase()).collect();
        let keep: Vec<bool> = (0..df.height())
            .map(|idx| self.matches(df, idx, &patterns))
            .collect();
        let mut out = df.clone();
        retain_rows(&mut out, &keep)?;
        Ok(match self.limit {
            Some(limit) => out.head(Some(limit)),
            None => out,
        })
    }
}

fn in_range(value: Option<i64>, range: Option<(i32, i32)>) -> bool {
    match range {
        None => true,
        Some((lo, hi)) => value.is_some_and(|v| v >= i64::from(lo) && v <= i64::from(hi)),
    }
}

fn distinct(df: &DataFrame, column: &str, keep: impl Fn(usize) -> bool) -> Vec<String> {
    (0..df.height())
        .filter(|idx| keep(*idx))
        .filter_map(|idx| column_string(df, column, idx))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct disease names among rows passing `source`.
pub fn list_diseases(df: &DataFrame, source: SourceFilter) -> Vec<String> {
    distinct(df, DISEASE, |idx| {
        source == SourceFilter::All
            || column_string(df, SOURCE, idx).is_some_and(|s| source.matches(&s))
    })
}

pub fn list_prefectures(df: &DataFrame) -> Vec<String> {
    distinct(df, PREFECTURE, |_| true)
}

/// Most recent (year, week) present in the table.
pub fn latest_week(df: &DataFrame) -> Option<(i32, i32)> {
    (0..df.height())
        .filter_map(|idx| {
            let year = i32::try_from(column_i64(df, YEAR, idx)?).ok()?;
            let week = i32::try_from(column_i64(df, WEEK, idx)?).ok()?;
            Some((year, week))
        })
        .max()
}
