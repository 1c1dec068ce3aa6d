//! Row-wise column accessors over a `DataFrame`.
//!
//! Missing columns and out-of-range indices read as null rather than
//! erroring; callers that need a column to exist check [`has_column`].

use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};

use crate::polars::{any_to_date, any_to_f64, any_to_i64, any_to_string};

fn cell<'a>(df: &'a DataFrame, name: &str, idx: usize) -> AnyValue<'a> {
    match df.column(name) {
        Ok(column) => column.get(idx).unwrap_or(AnyValue::Null),
        Err(_) => AnyValue::Null,
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Cell as a string; nulls and missing columns read as `""`.
pub fn column_value_string(df: &DataFrame, name: &str, idx: usize) -> String {
    any_to_string(cell(df, name, idx))
}

/// Cell as an optional string; nulls read as `None`.
pub fn column_string(df: &DataFrame, name: &str, idx: usize) -> Option<String> {
    match cell(df, name, idx) {
        AnyValue::Null => None,
        value => Some(any_to_string(value)),
    }
}

pub fn column_i64(df: &DataFrame, name: &str, idx: usize) -> Option<i64> {
    any_to_i64(cell(df, name, idx))
}

pub fn column_f64(df: &DataFrame, name: &str, idx: usize) -> Option<f64> {
    any_to_f64(cell(df, name, idx))
}

pub fn column_date(df: &DataFrame, name: &str, idx: usize) -> Option<NaiveDate> {
    any_to_date(cell(df, name, idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, DataType, IntoColumn, NamedFrom, Series};

    fn sample() -> DataFrame {
        let date = Series::new("date".into(), vec![Some(19_727i32), None])
            .cast(&DataType::Date)
            .unwrap();
        DataFrame::new(vec![
            Column::new("prefecture".into(), vec![Some("Tokyo"), None]),
            Column::new("count".into(), vec![Some(4i64), None]),
            Column::new("rate".into(), vec![Some(1.25f64), None]),
            date.into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn reads_present_values() {
        let df = sample();
        assert_eq!(column_value_string(&df, "prefecture", 0), "Tokyo");
        assert_eq!(column_string(&df, "prefecture", 0), Some("Tokyo".to_string()));
        assert_eq!(column_i64(&df, "count", 0), Some(4));
        assert_eq!(column_f64(&df, "rate", 0), Some(1.25));
        assert_eq!(column_date(&df, "date", 0), NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn nulls_and_missing_columns_read_as_none() {
        let df = sample();
        assert_eq!(column_value_string(&df, "prefecture", 1), "");
        assert_eq!(column_string(&df, "prefecture", 1), None);
        assert_eq!(column_i64(&df, "count", 1), None);
        assert_eq!(column_date(&df, "date", 1), None);
        assert_eq!(column_string(&df, "missing", 0), None);
        assert!(!has_column(&df, "missing"));
        assert_eq!(column_i64(&df, "count", 99), None);
    }
}
