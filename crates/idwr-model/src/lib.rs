//! Data model for IDWR surveillance tables.
//!
//! Defines the canonical long-format record, the closed enums used for
//! dispatch and provenance, the disease-name tracker, and configuration.

pub mod enums;
pub mod error;
pub mod options;
pub mod record;
pub mod tracker;

pub use enums::{Category, DatasetKind, SourceClass, SourceFilter, SourceTag};
pub use error::{ModelError, Result};
pub use options::IdwrConfig;
pub use record::{
    CATEGORY, COUNT, DATE, DISEASE, KEY_COLUMNS, PER_SENTINEL, PREFECTURE, REQUIRED_COLUMNS,
    SORT_COLUMNS, SOURCE, SurveillanceRecord, WEEK, WEEK_RANGE, WIDE_ID_COLUMNS, YEAR,
    YEAR_RANGE,
};
pub use tracker::DiseaseNameTracker;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unified_columns_cover_every_stage() {
        let unified = DatasetKind::Unified.columns();
        for kind in DatasetKind::ALL {
            for column in kind.columns() {
                assert!(unified.contains(column), "{kind}: {column}");
            }
        }
    }

    #[test]
    fn key_and_required_columns_are_in_unified_schema() {
        let unified = DatasetKind::Unified.columns();
        for column in KEY_COLUMNS.iter().chain(REQUIRED_COLUMNS.iter()) {
            assert!(unified.contains(column));
        }
    }

    #[test]
    fn record_builder_sets_fields() {
        let record = SurveillanceRecord::new("Tokyo", 2020, 5, "Measles", SourceTag::ConfirmedCases)
            .with_category(Category::Total)
            .with_count(Some(3));
        assert_eq!(record.category, Some(Category::Total));
        assert_eq!(record.count, Some(3));
        assert!(record.per_sentinel.is_none());
    }
}
