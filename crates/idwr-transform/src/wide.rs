//! Long ↔ wide reshaping of count tables.
//!
//! The wide form has one row per (prefecture, year, week, date) and one
//! `Int64` column per disease.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use polars::prelude::{Column, DataFrame, NamedFrom, PolarsError, PolarsResult};

use idwr_common::{column_date, column_i64, column_string, has_column};
use idwr_model::{COUNT, DATE, DISEASE, PREFECTURE, WEEK, WIDE_ID_COLUMNS, YEAR};

use crate::frame_builder::date_column;

type WideKey = (String, i32, i32, Option<NaiveDate>);

fn require(df: &DataFrame, names: &[&str]) -> PolarsResult<()> {
    for name in names {
        if !has_column(df, name) {
            return Err(PolarsError::ColumnNotFound((*name).to_string().into()));
        }
    }
    Ok(())
}

fn row_key(df: &DataFrame, idx: usize) -> PolarsResult<WideKey> {
    let int = |name: &str| -> PolarsResult<i32> {
        column_i64(df, name, idx)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| PolarsError::ComputeError(format!("row {idx}: invalid {name}").into()))
    };
    Ok((
        column_string(df, PREFECTURE, idx).unwrap_or_default(),
        int(YEAR)?,
        int(WEEK)?,
        column_date(df, DATE, idx),
    ))
}

fn id_columns(keys: &[WideKey]) -> PolarsResult<Vec<Column>> {
    let dates: Vec<Option<NaiveDate>> = keys.iter().map(|k| k.3).collect();
    Ok(vec![
        Column::new(
            PREFECTURE.into(),
            keys.iter().map(|k| k.0.as_str()).collect::<Vec<_>>(),
        ),
        Column::new(YEAR.into(), keys.iter().map(|k| k.1).collect::<Vec<i32>>()),
        Column::new(WEEK.into(), keys.iter().map(|k| k.2).collect::<Vec<i32>>()),
        date_column(DATE, &dates)?,
    ])
}

/// Pivots a long table to wide form.
///
/// Rows keep the first-seen order of their id tuple; disease columns are
/// sorted by name. When several rows share an id tuple and disease (other
/// categories or sources), the first non-null count wins.
pub fn pivot_wide(df: &DataFrame) -> PolarsResult<DataFrame> {
    require(df, &[PREFECTURE, YEAR, WEEK, DISEASE, COUNT])?;

    let mut keys: Vec<WideKey> = Vec::new();
    let mut rows: HashMap<WideKey, usize> = HashMap::new();
    let mut diseases: BTreeSet<String> = BTreeSet::new();
    let mut cells: HashMap<(usize, String), i64> = HashMap::new();

    for idx in 0..df.height() {
        let key = row_key(df, idx)?;
        let row = match rows.get(&key) {
            Some(row) => *row,
            None => {
                keys.push(key.clone());
                rows.insert(key, keys.len() - 1);
                keys.len() - 1
            }
        };
        let Some(disease) = column_string(df, DISEASE, idx).filter(|d| !d.is_empty()) else {
            continue;
        };
        if let Some(count) = column_i64(df, COUNT, idx) {
            cells.entry((row, disease.clone())).or_insert(count);
        }
        diseases.insert(disease);
    }

    let mut columns = id_columns(&keys)?;
    for disease in &diseases {
        let values: Vec<Option<i64>> = (0..keys.len())
            .map(|row| cells.get(&(row, disease.clone())).copied())
            .collect();
        columns.push(Column::new(disease.as_str().into(), values));
    }
    DataFrame::new(columns)
}

/// Melts a wide table back to (prefecture, year, week, date, disease, count).
///
/// Every column other than the id columns is a disease. Null cells produce
/// no row.
pub fn melt_long(df: &DataFrame) -> PolarsResult<DataFrame> {
    require(df, &[PREFECTURE, YEAR, WEEK])?;
    let disease_columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .filter(|name| !WIDE_ID_COLUMNS.contains(&name.as_str()))
        .collect();

    let mut keys: Vec<WideKey> = Vec::new();
    let mut diseases: Vec<&str> = Vec::new();
    let mut counts: Vec<i64> = Vec::new();
    for idx in 0..df.height() {
        let key = row_key(df, idx)?;
        for disease in &disease_columns {
            if let Some(count) = column_i64(df, disease, idx) {
                keys.push(key.clone());
                diseases.push(disease.as_str());
                counts.push(count);
            }
        }
    }

    let mut columns = id_columns(&keys)?;
    columns.push(Column::new(DISEASE.into(), diseases));
    columns.push(Column::new(COUNT.into(), counts));
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idwr_model::{DatasetKind, SourceTag, SurveillanceRecord};

    use crate::frame_builder::build_stage_frame;

    fn long() -> DataFrame {
        let records = vec![
            SurveillanceRecord::new("Tokyo", 2024, 1, "Measles", SourceTag::AllCaseReporting)
                .with_count(Some(2)),
            SurveillanceRecord::new("Tokyo", 2024, 1, "Rubella", SourceTag::AllCaseReporting)
                .with_count(Some(0)),
            SurveillanceRecord::new("Osaka", 2024, 1, "Measles", SourceTag::AllCaseReporting)
                .with_count(Some(5)),
        ];
        build_stage_frame(DatasetKind::Bullet, &records).unwrap()
    }

    #[test]
    fn pivot_has_one_column_per_disease() {
        let wide = pivot_wide(&long()).unwrap();
        let names: Vec<String> = wide.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["prefecture", "year", "week", "date", "Measles", "Rubella"]);
        assert_eq!(wide.height(), 2);
        assert_eq!(column_i64(&wide, "Measles", 1), Some(5));
        assert_eq!(column_i64(&wide, "Rubella", 1), None);
    }

    #[test]
    fn melt_skips_null_cells() {
        let long = melt_long(&pivot_wide(&long()).unwrap()).unwrap();
        assert_eq!(long.height(), 3);
    }

    #[test]
    fn melt_requires_id_columns() {
        let df = DataFrame::new(vec![Column::new("Measles".into(), vec![1i64])]).unwrap();
        assert!(melt_long(&df).is_err());
    }
}
