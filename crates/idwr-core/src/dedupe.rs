use std::collections::HashSet;

use anyhow::Result;
use polars::prelude::DataFrame;

use idwr_common::{column_value_string, has_column};
use idwr_model::KEY_COLUMNS;
use idwr_transform::retain_rows;

/// Key columns present in `df`; `category` takes part only when present.
pub fn key_columns(df: &DataFrame) -> Vec<&'static str> {
    KEY_COLUMNS
        .iter()
        .copied()
        .filter(|name| has_column(df, name))
        .collect()
}

/// Drops rows whose key repeats an earlier row, keeping the first.
///
/// Returns the number of rows removed. A second run removes nothing.
pub fn dedupe_by_key(df: &mut DataFrame) -> Result<usize> {
    let keys = key_columns(df);
    if keys.is_empty() || df.height() == 0 {
        return Ok(0);
    }
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(df.height());
    let keep: Vec<bool> = (0..df.height())
        .map(|idx| {
            let composite: Vec<String> = keys
                .iter()
                .map(|name| column_value_string(df, name, idx))
                .collect();
            seen.insert(composite)
        })
        .collect();
    let removed = keep.iter().filter(|kept| !**kept).count();
    if removed > 0 {
        retain_rows(df, &keep)?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idwr_model::{Category, DatasetKind, SourceTag, SurveillanceRecord};
    use idwr_transform::build_stage_frame;

    fn record(pref: &str, category: Category, count: i64) -> SurveillanceRecord {
        SurveillanceRecord::new(pref, 2020, 1, "Measles", SourceTag::ConfirmedCases)
            .with_category(category)
            .with_count(Some(count))
    }

    #[test]
    fn first_row_wins_and_second_pass_is_noop() {
        let mut df = build_stage_frame(
            DatasetKind::Sex,
            &[
                record("Tokyo", Category::Total, 1),
                record("Tokyo", Category::Male, 1),
                record("Tokyo", Category::Total, 9),
            ],
        )
        .unwrap();
        assert_eq!(dedupe_by_key(&mut df).unwrap(), 1);
        assert_eq!(df.height(), 2);
        assert_eq!(idwr_common::column_i64(&df, "count", 0), Some(1));
        assert_eq!(dedupe_by_key(&mut df).unwrap(), 0);
    }

    #[test]
    fn category_is_ignored_when_absent() {
        let records = [
            SurveillanceRecord::new("Tokyo", 2024, 1, "Measles", SourceTag::AllCaseReporting),
            SurveillanceRecord::new("Tokyo", 2024, 1, "Measles", SourceTag::AllCaseReporting),
        ];
        let mut df = build_stage_frame(DatasetKind::Bullet, &records).unwrap();
        assert_eq!(key_columns(&df), ["prefecture", "year", "week", "disease"]);
        assert_eq!(dedupe_by_key(&mut df).unwrap(), 1);
    }
}
