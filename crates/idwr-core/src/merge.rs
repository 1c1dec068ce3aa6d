//! Multi-source merge of the stage tables into one long table.
//!
//! Historical workbooks and modern bulletins overlap in time; modern
//! all-case data wins for any year it covers. Within modern data,
//! confirmed-case reporting wins over sentinel data for the same disease.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::{debug, info};

use idwr_common::{column_i64, column_string, column_value_string, has_column};
use idwr_model::{CATEGORY, Category, DISEASE, DatasetKind, SOURCE, SourceClass, SourceTag, YEAR};
use idwr_transform::{align_to_columns, concat_aligned, retain_rows};

use crate::dedupe::dedupe_by_key;

/// Stage tables available to a merge. Absent stages are skipped.
#[derive(Debug, Clone, Default)]
pub struct MergeSources {
    pub sex: Option<DataFrame>,
    pub place: Option<DataFrame>,
    pub bullet: Option<DataFrame>,
    pub sentinel: Option<DataFrame>,
}

impl MergeSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a stage table under its kind. Unified tables are not a merge
    /// input and are ignored.
    pub fn insert(&mut self, kind: DatasetKind, df: DataFrame) {
        match kind {
            DatasetKind::Sex => self.sex = Some(df),
            DatasetKind::Place => self.place = Some(df),
            DatasetKind::Bullet => self.bullet = Some(df),
            DatasetKind::Sentinel => self.sentinel = Some(df),
            DatasetKind::Unified => debug!("unified table is not a merge input"),
        }
    }

    pub fn with(mut self, kind: DatasetKind, df: DataFrame) -> Self {
        self.insert(kind, df);
        self
    }

    pub fn get(&self, kind: DatasetKind) -> Option<&DataFrame> {
        match kind {
            DatasetKind::Sex => self.sex.as_ref(),
            DatasetKind::Place => self.place.as_ref(),
            DatasetKind::Bullet => self.bullet.as_ref(),
            DatasetKind::Sentinel => self.sentinel.as_ref(),
            DatasetKind::Unified => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sex.is_none() && self.place.is_none() && self.bullet.is_none() && self.sentinel.is_none()
    }

    /// Row count per present stage.
    pub fn row_counts(&self) -> Vec<(DatasetKind, usize)> {
        [
            DatasetKind::Sex,
            DatasetKind::Place,
            DatasetKind::Bullet,
            DatasetKind::Sentinel,
        ]
        .into_iter()
        .filter_map(|kind| self.get(kind).map(|df| (kind, df.height())))
        .collect()
    }
}

/// Summary of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub modern_years: BTreeSet<i32>,
    pub historical_rows_dropped: usize,
    pub sentinel_rows_dropped: usize,
    pub duplicates_removed: usize,
}

fn source_class(df: &DataFrame, idx: usize) -> Option<SourceClass> {
    column_string(df, SOURCE, idx)
        .and_then(|source| source.parse::<SourceTag>().ok())
        .map(|tag| tag.class())
}

/// Years covered by confirmed modern reporting.
pub fn modern_years(bullet: Option<&DataFrame>) -> BTreeSet<i32> {
    let Some(df) = bullet else {
        return BTreeSet::new();
    };
    (0..df.height())
        .filter(|&idx| source_class(df, idx) == Some(SourceClass::Confirmed))
        .filter_map(|idx| column_i64(df, YEAR, idx))
        .filter_map(|year| i32::try_from(year).ok())
        .collect()
}

/// Drops historical rows in modern years. With `totals_only`, also drops
/// rows whose category is not `total`.
fn filter_historical(
    df: &DataFrame,
    years: &BTreeSet<i32>,
    totals_only: bool,
) -> Result<(DataFrame, usize)> {
    let check_category = totals_only && has_column(df, CATEGORY);
    let keep: Vec<bool> = (0..df.height())
        .map(|idx| {
            let modern = column_i64(df, YEAR, idx)
                .and_then(|year| i32::try_from(year).ok())
                .is_some_and(|year| years.contains(&year));
            let total = !check_category
                || column_string(df, CATEGORY, idx).as_deref() == Some(Category::Total.as_str());
            !modern && total
        })
        .collect();
    let mut out = df.clone();
    let dropped = keep.iter().filter(|k| !**k).count();
    if dropped > 0 {
        retain_rows(&mut out, &keep)?;
    }
    Ok((out, dropped))
}

/// Modern rows: every confirmed row, plus sentinel rows for diseases that
/// confirmed reporting does not cover.
fn merge_modern(
    bullet: Option<&DataFrame>,
    sentinel: Option<&DataFrame>,
) -> Result<(Vec<DataFrame>, usize)> {
    let modern: Vec<DataFrame> = [bullet, sentinel].into_iter().flatten().cloned().collect();
    if modern.is_empty() {
        return Ok((Vec::new(), 0));
    }
    let combined = concat_aligned(&modern).context("combine modern tables")?;

    let classes: Vec<Option<SourceClass>> =
        (0..combined.height()).map(|idx| source_class(&combined, idx)).collect();
    let confirmed_diseases: BTreeSet<String> = classes
        .iter()
        .enumerate()
        .filter(|(_, class)| **class == Some(SourceClass::Confirmed))
        .map(|(idx, _)| column_value_string(&combined, DISEASE, idx))
        .collect();

    let mut confirmed = combined.clone();
    let confirmed_mask: Vec<bool> = classes
        .iter()
        .map(|class| *class == Some(SourceClass::Confirmed))
        .collect();
    retain_rows(&mut confirmed, &confirmed_mask)?;

    let mut sentinel_only = combined.clone();
    let sentinel_mask: Vec<bool> = classes
        .iter()
        .enumerate()
        .map(|(idx, class)| {
            *class == Some(SourceClass::Sentinel)
                && !confirmed_diseases.contains(&column_value_string(&combined, DISEASE, idx))
        })
        .collect();
    let sentinel_total = classes
        .iter()
        .filter(|class| **class == Some(SourceClass::Sentinel))
        .count();
    retain_rows(&mut sentinel_only, &sentinel_mask)?;
    let dropped = sentinel_total - sentinel_only.height();

    Ok((vec![confirmed, sentinel_only], dropped))
}

/// Replaces null categories with `total`.
fn fill_category(df: &mut DataFrame) -> Result<()> {
    if !has_column(df, CATEGORY) {
        return Ok(());
    }
    let values: Vec<String> = (0..df.height())
        .map(|idx| {
            column_string(df, CATEGORY, idx).unwrap_or_else(|| Category::Total.as_str().to_string())
        })
        .collect();
    df.with_column(Series::new(CATEGORY.into(), values))?;
    Ok(())
}

/// Merge steps before deduplication.
///
/// Finds the modern years, drops overlapping historical rows (sex keeps
/// totals only), keeps confirmed modern rows and sentinel-exclusive
/// diseases, concatenates over the unified columns and defaults categories
/// to `total`.
pub fn merge_stage_tables(sources: &MergeSources) -> Result<(DataFrame, MergeReport)> {
    let mut report = MergeReport {
        modern_years: modern_years(sources.bullet.as_ref()),
        ..MergeReport::default()
    };
    debug!(years = ?report.modern_years, "modern years");

    let mut parts: Vec<DataFrame> = Vec::new();
    for (kind, df) in [(DatasetKind::Sex, &sources.sex), (DatasetKind::Place, &sources.place)] {
        let Some(df) = df else { continue };
        let (kept, dropped) = filter_historical(df, &report.modern_years, kind == DatasetKind::Sex)
            .with_context(|| format!("filter {kind} table"))?;
        report.historical_rows_dropped += dropped;
        parts.push(kept);
    }

    let (modern, sentinel_dropped) =
        merge_modern(sources.bullet.as_ref(), sources.sentinel.as_ref())?;
    report.sentinel_rows_dropped = sentinel_dropped;
    parts.extend(modern);

    let combined = concat_aligned(&parts).context("concatenate stage tables")?;
    let mut merged = align_to_columns(&combined, DatasetKind::Unified.columns())
        .context("align to unified schema")?;
    fill_category(&mut merged)?;
    Ok((merged, report))
}

/// Full merge: [`merge_stage_tables`], then key deduplication keeping the
/// first row.
pub fn smart_merge_with_report(sources: &MergeSources) -> Result<(DataFrame, MergeReport)> {
    let (mut merged, mut report) = merge_stage_tables(sources)?;
    report.duplicates_removed = dedupe_by_key(&mut merged)?;
    log_merge(&merged, &report);
    Ok((merged, report))
}

pub(crate) fn log_merge(merged: &DataFrame, report: &MergeReport) {
    info!(
        rows = merged.height(),
        historical_dropped = report.historical_rows_dropped,
        sentinel_dropped = report.sentinel_rows_dropped,
        duplicates = report.duplicates_removed,
        "merged stage tables"
    );
}

/// [`smart_merge_with_report`] without the report.
pub fn smart_merge(sources: &MergeSources) -> Result<DataFrame> {
    smart_merge_with_report(sources).map(|(df, _)| df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idwr_model::SurveillanceRecord;
    use idwr_transform::build_stage_frame;

    fn sex() -> DataFrame {
        let records = [
            SurveillanceRecord::new("Tokyo", 2020, 1, "Measles", SourceTag::ConfirmedCases)
                .with_category(Category::Total)
                .with_count(Some(2)),
            SurveillanceRecord::new("Tokyo", 2020, 1, "Measles", SourceTag::ConfirmedCases)
                .with_category(Category::Male)
                .with_count(Some(1)),
            SurveillanceRecord::new("Tokyo", 2024, 1, "Measles", SourceTag::ConfirmedCases)
                .with_category(Category::Total)
                .with_count(Some(7)),
        ];
        build_stage_frame(DatasetKind::Sex, &records).unwrap()
    }

    fn bullet() -> DataFrame {
        let records = [
            SurveillanceRecord::new("Tokyo", 2024, 1, "Measles", SourceTag::AllCaseReporting)
                .with_count(Some(3)),
        ];
        build_stage_frame(DatasetKind::Bullet, &records).unwrap()
    }

    fn sentinel() -> DataFrame {
        let records = [
            SurveillanceRecord::new("Tokyo", 2024, 1, "Measles", SourceTag::SentinelSurveillance)
                .with_count(Some(40)),
            SurveillanceRecord::new("Tokyo", 2024, 1, "Influenza", SourceTag::SentinelSurveillance)
                .with_count(Some(100))
                .with_per_sentinel(Some(2.5)),
        ];
        build_stage_frame(DatasetKind::Sentinel, &records).unwrap()
    }

    #[test]
    fn modern_years_come_from_confirmed_bullet_rows() {
        assert_eq!(modern_years(Some(&bullet())), BTreeSet::from([2024]));
        assert!(modern_years(Some(&sentinel())).is_empty());
        assert!(modern_years(None).is_empty());
    }

    #[test]
    fn merge_prefers_modern_confirmed_data() {
        let sources = MergeSources::new()
            .with(DatasetKind::Sex, sex())
            .with(DatasetKind::Bullet, bullet())
            .with(DatasetKind::Sentinel, sentinel());
        let (merged, report) = smart_merge_with_report(&sources).unwrap();

        assert_eq!(merged.height(), 3);
        assert_eq!(report.historical_rows_dropped, 2);
        assert_eq!(report.sentinel_rows_dropped, 1);
        assert_eq!(report.duplicates_removed, 0);

        let diseases: Vec<String> = (0..merged.height())
            .map(|idx| column_value_string(&merged, DISEASE, idx))
            .collect();
        assert_eq!(diseases, ["Measles", "Measles", "Influenza"]);
        assert_eq!(column_i64(&merged, "count", 1), Some(3));
        assert!(
            (0..merged.height())
                .all(|idx| column_string(&merged, CATEGORY, idx).as_deref() == Some("total"))
        );
    }

    #[test]
    fn merged_table_has_unified_columns() {
        let merged = smart_merge(&MergeSources::new().with(DatasetKind::Bullet, bullet())).unwrap();
        let names: Vec<String> = merged
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, DatasetKind::Unified.columns());
    }

    #[test]
    fn merging_nothing_yields_empty_unified_table() {
        let merged = smart_merge(&MergeSources::new()).unwrap();
        assert_eq!(merged.height(), 0);
        assert_eq!(merged.width(), DatasetKind::Unified.columns().len());
    }
}
