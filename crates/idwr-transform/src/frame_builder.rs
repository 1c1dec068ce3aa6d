//! Typed stage frames built from parsed records.
//!
//! Every stage table uses the same column names and dtypes; the column set
//! varies per [`DatasetKind`]. Concatenation of frames with different column
//! sets fills the missing columns with typed nulls.

use chrono::{Datelike, NaiveDate};
use polars::prelude::{
    BooleanChunked, Column, DataFrame, DataType, IntoColumn, NamedFrom, NewChunkedArray,
    PolarsError, PolarsResult, Series,
};

use idwr_common::{column_date, column_f64, column_i64, column_string, has_column};
use idwr_model::{
    CATEGORY, COUNT, Category, DATE, DISEASE, DatasetKind, PER_SENTINEL, PREFECTURE, SOURCE,
    SourceTag, SurveillanceRecord, WEEK, YEAR,
};

/// Days between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Canonical dtype of a known column.
pub fn column_dtype(name: &str) -> Option<DataType> {
    match name {
        PREFECTURE | DISEASE | CATEGORY | SOURCE => Some(DataType::String),
        YEAR | WEEK => Some(DataType::Int32),
        DATE => Some(DataType::Date),
        COUNT => Some(DataType::Int64),
        PER_SENTINEL => Some(DataType::Float64),
        _ => None,
    }
}

pub fn epoch_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// A `Date` column from optional dates.
pub fn date_column(name: &str, dates: &[Option<NaiveDate>]) -> PolarsResult<Column> {
    let days: Vec<Option<i32>> = dates.iter().map(|d| d.map(epoch_days)).collect();
    Ok(Series::new(name.into(), days)
        .cast(&DataType::Date)?
        .into_column())
}

fn record_column(name: &str, records: &[SurveillanceRecord]) -> PolarsResult<Column> {
    let column = match name {
        PREFECTURE => Column::new(
            name.into(),
            records.iter().map(|r| r.prefecture.as_str()).collect::<Vec<_>>(),
        ),
        YEAR => Column::new(name.into(), records.iter().map(|r| r.year).collect::<Vec<i32>>()),
        WEEK => Column::new(name.into(), records.iter().map(|r| r.week).collect::<Vec<i32>>()),
        DATE => {
            let dates: Vec<Option<NaiveDate>> = records.iter().map(|r| r.date).collect();
            date_column(name, &dates)?
        }
        DISEASE => Column::new(
            name.into(),
            records.iter().map(|r| r.disease.as_str()).collect::<Vec<_>>(),
        ),
        CATEGORY => Column::new(
            name.into(),
            records
                .iter()
                .map(|r| r.category.map(|c| c.as_str()))
                .collect::<Vec<Option<&str>>>(),
        ),
        COUNT => Column::new(
            name.into(),
            records.iter().map(|r| r.count).collect::<Vec<Option<i64>>>(),
        ),
        PER_SENTINEL => Column::new(
            name.into(),
            records
                .iter()
                .map(|r| r.per_sentinel)
                .collect::<Vec<Option<f64>>>(),
        ),
        SOURCE => Column::new(
            name.into(),
            records.iter().map(|r| r.source.as_str()).collect::<Vec<_>>(),
        ),
        other => {
            return Err(PolarsError::ColumnNotFound(
                format!("no record field for column {other}").into(),
            ));
        }
    };
    Ok(column)
}

/// Builds the stage table of `kind` from records, in the kind's column order.
///
/// An empty record slice yields an empty frame that still carries the full
/// typed schema.
pub fn build_stage_frame(
    kind: DatasetKind,
    records: &[SurveillanceRecord],
) -> PolarsResult<DataFrame> {
    let columns = kind
        .columns()
        .iter()
        .map(|name| record_column(name, records))
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

/// Empty stage table of `kind`.
pub fn empty_stage_frame(kind: DatasetKind) -> PolarsResult<DataFrame> {
    build_stage_frame(kind, &[])
}

fn row_error(column: &str, idx: usize, detail: &str) -> PolarsError {
    PolarsError::ComputeError(format!("row {idx}: {column} {detail}").into())
}

fn required_i32(df: &DataFrame, name: &str, idx: usize) -> PolarsResult<i32> {
    let value = column_i64(df, name, idx).ok_or_else(|| row_error(name, idx, "is null"))?;
    i32::try_from(value).map_err(|_| row_error(name, idx, "is out of range"))
}

/// Reads a stage or unified table back into records.
///
/// `prefecture`, `year`, `week`, `disease` and `source` are required;
/// the other columns are optional and read as null when absent.
pub fn records_from_frame(df: &DataFrame) -> PolarsResult<Vec<SurveillanceRecord>> {
    for name in [PREFECTURE, YEAR, WEEK, DISEASE, SOURCE] {
        if !has_column(df, name) {
            return Err(PolarsError::ColumnNotFound(name.into()));
        }
    }
    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let source = column_string(df, SOURCE, idx)
            .ok_or_else(|| row_error(SOURCE, idx, "is null"))?
            .parse::<SourceTag>()
            .map_err(|e| PolarsError::ComputeError(format!("row {idx}: {e}").into()))?;
        let category = column_string(df, CATEGORY, idx)
            .map(|value| value.parse::<Category>())
            .transpose()
            .map_err(|e| PolarsError::ComputeError(format!("row {idx}: {e}").into()))?;
        records.push(SurveillanceRecord {
            prefecture: column_string(df, PREFECTURE, idx).unwrap_or_default(),
            year: required_i32(df, YEAR, idx)?,
            week: required_i32(df, WEEK, idx)?,
            date: column_date(df, DATE, idx),
            disease: column_string(df, DISEASE, idx).unwrap_or_default(),
            category,
            count: column_i64(df, COUNT, idx),
            per_sentinel: column_f64(df, PER_SENTINEL, idx),
            source,
        });
    }
    Ok(records)
}

fn align_to_schema(df: &DataFrame, schema: &[(String, DataType)]) -> PolarsResult<DataFrame> {
    let height = df.height();
    let mut columns = Vec::with_capacity(schema.len());
    for (name, dtype) in schema {
        let column = match df.column(name) {
            Ok(existing) if existing.dtype() == dtype => existing.clone(),
            Ok(existing) => existing.cast(dtype)?,
            Err(_) => Series::full_null(name.as_str().into(), height, dtype).into_column(),
        };
        columns.push(column);
    }
    DataFrame::new(columns)
}

/// Projects `df` onto `columns`, casting known columns to their canonical
/// dtype and filling absent ones with typed nulls. Columns not listed are
/// dropped.
pub fn align_to_columns(df: &DataFrame, columns: &[&str]) -> PolarsResult<DataFrame> {
    let schema: Vec<(String, DataType)> = columns
        .iter()
        .map(|name| {
            let dtype = column_dtype(name)
                .or_else(|| df.column(name).ok().map(|c| c.dtype().clone()))
                .unwrap_or(DataType::String);
            (name.to_string(), dtype)
        })
        .collect();
    align_to_schema(df, &schema)
}

/// Union of the column sets of `frames`: canonical columns first in unified
/// order, then unknown columns in first-seen order.
pub fn union_columns(frames: &[DataFrame]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for df in frames {
        for name in df.get_column_names() {
            if !seen.iter().any(|s| s == name.as_str()) {
                seen.push(name.to_string());
            }
        }
    }
    let mut ordered: Vec<String> = DatasetKind::Unified
        .columns()
        .iter()
        .filter(|name| seen.iter().any(|s| s == *name))
        .map(|name| name.to_string())
        .collect();
    for name in seen {
        if !ordered.contains(&name) {
            ordered.push(name);
        }
    }
    ordered
}

/// Column-union concatenation. Row order is preserved frame by frame.
pub fn concat_aligned(frames: &[DataFrame]) -> PolarsResult<DataFrame> {
    let schema: Vec<(String, DataType)> = union_columns(frames)
        .into_iter()
        .map(|name| {
            let dtype = column_dtype(&name)
                .or_else(|| {
                    frames
                        .iter()
                        .find_map(|df| df.column(&name).ok().map(|c| c.dtype().clone()))
                })
                .unwrap_or(DataType::String);
            (name, dtype)
        })
        .collect();

    let mut iter = frames.iter();
    let Some(first) = iter.next() else {
        return Ok(DataFrame::empty());
    };
    let mut combined = align_to_schema(first, &schema)?;
    for df in iter {
        combined.vstack_mut(&align_to_schema(df, &schema)?)?;
    }
    Ok(combined)
}

/// Keeps the rows whose flag is `true`.
pub fn retain_rows(df: &mut DataFrame, keep: &[bool]) -> PolarsResult<()> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    *df = df.filter(&mask)?;
    Ok(())
}
