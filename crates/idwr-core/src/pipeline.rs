//! Unified table build: merge, deduplicate, validate, sort, hand off.
//!
//! # Build states
//!
//! `Empty → Loading → Merging → Deduplicating → Validating → Written`,
//! with `Aborted` reachable from any step after loading. A validation
//! failure aborts the build and nothing is handed to the writer.

use std::fmt;

use anyhow::{Context, Result};
use polars::prelude::{DataFrame, PlSmallStr, SortMultipleOptions};
use tracing::{debug, info, info_span, warn};

use idwr_common::has_column;
use idwr_model::{DatasetKind, SORT_COLUMNS};
use idwr_validate::validate_unified;

use crate::dedupe::dedupe_by_key;
use crate::merge::{MergeReport, MergeSources, log_merge, merge_stage_tables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildState {
    Empty,
    Loading,
    Merging,
    Deduplicating,
    Validating,
    Written,
    Aborted,
}

impl BuildState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildState::Empty => "empty",
            BuildState::Loading => "loading",
            BuildState::Merging => "merging",
            BuildState::Deduplicating => "deduplicating",
            BuildState::Validating => "validating",
            BuildState::Written => "written",
            BuildState::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Written | BuildState::Aborted)
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct UnifiedBuild {
    pub frame: DataFrame,
    pub input_rows: Vec<(DatasetKind, usize)>,
    pub merge: MergeReport,
    pub state: BuildState,
}

/// Stateful builder over the stage tables.
#[derive(Debug)]
pub struct UnifiedBuilder {
    state: BuildState,
    sources: MergeSources,
}

impl Default for UnifiedBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UnifiedBuilder {
    pub fn new() -> Self {
        Self {
            state: BuildState::Empty,
            sources: MergeSources::new(),
        }
    }

    pub fn from_sources(sources: MergeSources) -> Self {
        let state = if sources.is_empty() {
            BuildState::Empty
        } else {
            BuildState::Loading
        };
        Self { state, sources }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn sources(&self) -> &MergeSources {
        &self.sources
    }

    fn transition(&mut self, next: BuildState) {
        debug!(from = %self.state, to = %next, "build state");
        self.state = next;
    }

    /// Adds one stage table.
    pub fn load(&mut self, kind: DatasetKind, df: DataFrame) {
        if self.state != BuildState::Loading {
            self.transition(BuildState::Loading);
        }
        info!(kind = %kind, rows = df.height(), "loaded stage table");
        self.sources.insert(kind, df);
    }

    /// Runs the build and passes the sorted table to `write`.
    ///
    /// The state ends at `Written` on success and `Aborted` on any failure,
    /// including a failing writer.
    pub fn build_with<F>(&mut self, write: F) -> Result<UnifiedBuild>
    where
        F: FnOnce(&mut DataFrame) -> Result<()>,
    {
        let _span = info_span!("build_unified").entered();
        match self.run(write) {
            Ok(build) => Ok(build),
            Err(error) => {
                warn!(state = %self.state, %error, "build aborted");
                self.transition(BuildState::Aborted);
                Err(error)
            }
        }
    }

    /// Runs the build without writing anything.
    pub fn build(&mut self) -> Result<UnifiedBuild> {
        self.build_with(|_| Ok(()))
    }

    fn run<F>(&mut self, write: F) -> Result<UnifiedBuild>
    where
        F: FnOnce(&mut DataFrame) -> Result<()>,
    {
        let input_rows = self.sources.row_counts();

        self.transition(BuildState::Merging);
        let (mut merged, mut merge) =
            merge_stage_tables(&self.sources).context("merge stage tables")?;

        self.transition(BuildState::Deduplicating);
        merge.duplicates_removed = dedupe_by_key(&mut merged).context("deduplicate")?;
        log_merge(&merged, &merge);

        self.transition(BuildState::Validating);
        validate_unified(&merged).context("unified table failed validation")?;

        let mut frame = sort_unified(&merged)?;
        write(&mut frame).context("write unified table")?;
        self.transition(BuildState::Written);
        info!(rows = frame.height(), "unified table built");

        Ok(UnifiedBuild {
            frame,
            input_rows,
            merge,
            state: self.state,
        })
    }
}

/// Sorts by date, prefecture, category, disease and source; nulls last,
/// ties keep their input order.
pub fn sort_unified(df: &DataFrame) -> Result<DataFrame> {
    let by: Vec<PlSmallStr> = SORT_COLUMNS
        .iter()
        .filter(|name| has_column(df, name))
        .map(|name| (*name).into())
        .collect();
    if by.is_empty() || df.height() == 0 {
        return Ok(df.clone());
    }
    let options = SortMultipleOptions::default()
        .with_nulls_last(true)
        .with_maintain_order(true);
    df.sort(by, options).context("sort unified table")
}

/// Merges, validates and sorts the stage tables in one call.
pub fn build_unified(sources: MergeSources) -> Result<UnifiedBuild> {
    UnifiedBuilder::from_sources(sources).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use idwr_common::{column_date, column_value_string};
    use idwr_model::{Category, SourceTag, SurveillanceRecord};
    use idwr_transform::build_stage_frame;

    fn sex(records: &[SurveillanceRecord]) -> DataFrame {
        build_stage_frame(DatasetKind::Sex, records).unwrap()
    }

    fn record(pref: &str, year: i32, week: i32) -> SurveillanceRecord {
        SurveillanceRecord::new(pref, year, week, "Measles", SourceTag::ConfirmedCases)
            .with_date(NaiveDate::from_isoywd_opt(year, week as u32, chrono::Weekday::Sun))
            .with_category(Category::Total)
            .with_count(Some(1))
    }

    #[test]
    fn build_sorts_by_date_then_prefecture() {
        let df = sex(&[record("Tokyo", 2020, 2), record("Osaka", 2020, 2), record("Tokyo", 2020, 1)]);
        let mut builder = UnifiedBuilder::new();
        assert_eq!(builder.state(), BuildState::Empty);
        builder.load(DatasetKind::Sex, df);
        assert_eq!(builder.state(), BuildState::Loading);

        let build = builder.build().unwrap();
        assert_eq!(build.state, BuildState::Written);
        assert_eq!(builder.state(), BuildState::Written);
        let prefectures: Vec<String> = (0..3)
            .map(|idx| column_value_string(&build.frame, "prefecture", idx))
            .collect();
        assert_eq!(prefectures, ["Tokyo", "Osaka", "Tokyo"]);
        assert_eq!(column_date(&build.frame, "date", 0), NaiveDate::from_ymd_opt(2020, 1, 5));
    }

    #[test]
    fn null_dates_sort_last() {
        let undated = SurveillanceRecord::new("Aichi", 2020, 53, "Measles", SourceTag::ConfirmedCases)
            .with_category(Category::Total)
            .with_count(Some(0));
        let df = sex(&[undated, record("Tokyo", 2020, 1)]);
        let build = build_unified(MergeSources::new().with(DatasetKind::Sex, df)).unwrap();
        assert_eq!(column_value_string(&build.frame, "prefecture", 1), "Aichi");
    }

    #[test]
    fn validation_failure_aborts_without_writing() {
        let df = sex(&[record("Tokyo", 1990, 1)]);
        let mut builder = UnifiedBuilder::from_sources(MergeSources::new().with(DatasetKind::Sex, df));
        let mut written = false;
        let result = builder.build_with(|_| {
            written = true;
            Ok(())
        });
        let error = result.unwrap_err();
        assert!(format!("{error:#}").contains("Year values out of expected range: 1990-1990"));
        assert!(!written);
        assert_eq!(builder.state(), BuildState::Aborted);
    }

    #[test]
    fn writer_receives_sorted_table() {
        let df = sex(&[record("Tokyo", 2020, 2), record("Tokyo", 2020, 1)]);
        let mut builder = UnifiedBuilder::from_sources(MergeSources::new().with(DatasetKind::Sex, df));
        let mut seen = 0;
        builder
            .build_with(|frame| {
                seen = frame.height();
                Ok(())
            })
            .unwrap();
        assert_eq!(seen, 2);
    }
}
