//! Canonical long-format surveillance record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{Category, SourceTag};

pub const PREFECTURE: &str = "prefecture";
pub const YEAR: &str = "year";
pub const WEEK: &str = "week";
pub const DATE: &str = "date";
pub const DISEASE: &str = "disease";
pub const CATEGORY: &str = "category";
pub const COUNT: &str = "count";
pub const PER_SENTINEL: &str = "per_sentinel";
pub const SOURCE: &str = "source";

/// Uniqueness key of the unified table. `category` takes part only when the
/// table carries that column.
pub const KEY_COLUMNS: [&str; 5] = [PREFECTURE, YEAR, WEEK, DISEASE, CATEGORY];

/// Columns every published table must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [PREFECTURE, YEAR, WEEK, DISEASE, COUNT];

/// Deterministic output ordering of the unified table.
pub const SORT_COLUMNS: [&str; 5] = [DATE, PREFECTURE, CATEGORY, DISEASE, SOURCE];

/// Columns that identify a row in wide (one column per disease) form.
pub const WIDE_ID_COLUMNS: [&str; 4] = [PREFECTURE, YEAR, WEEK, DATE];

/// Accepted range for the `year` column.
pub const YEAR_RANGE: (i32, i32) = (1999, 2030);

/// Accepted range for the `week` column.
pub const WEEK_RANGE: (i32, i32) = (1, 53);

/// One row of a parsed or unified table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveillanceRecord {
    pub prefecture: String,
    pub year: i32,
    pub week: i32,
    pub date: Option<NaiveDate>,
    pub disease: String,
    pub category: Option<Category>,
    pub count: Option<i64>,
    pub per_sentinel: Option<f64>,
    pub source: SourceTag,
}

impl SurveillanceRecord {
    /// Creates a record with no category, count or rate.
    pub fn new(
        prefecture: impl Into<String>,
        year: i32,
        week: i32,
        disease: impl Into<String>,
        source: SourceTag,
    ) -> Self {
        Self {
            prefecture: prefecture.into(),
            year,
            week,
            date: None,
            disease: disease.into(),
            category: None,
            count: None,
            per_sentinel: None,
            source,
        }
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_count(mut self, count: Option<i64>) -> Self {
        self.count = count;
        self
    }

    pub fn with_per_sentinel(mut self, value: Option<f64>) -> Self {
        self.per_sentinel = value;
        self
    }
}
