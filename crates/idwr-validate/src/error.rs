use thiserror::Error;

/// A failed check on the unified table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Found {groups} duplicate key groups on ({})", .columns.join(", "))]
    DuplicateKeys { groups: usize, columns: Vec<String> },

    #[error("Year values out of expected range: {min}-{max}")]
    YearOutOfRange { min: i64, max: i64 },

    #[error("Week values out of valid range: {min}-{max}")]
    WeekOutOfRange { min: i64, max: i64 },

    #[error("Null values in {column}: {count} rows")]
    NullValues { column: String, count: usize },
}

pub type Result<T> = std::result::Result<T, ValidationError>;
