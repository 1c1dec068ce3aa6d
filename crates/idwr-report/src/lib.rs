//! Persisted datasets and read-side reports.
//!
//! - **Parquet**: stage tables written with their canonical column set
//! - **Catalog**: named access to the stage files in a data directory
//! - **Query**: row filters and distinct listings over loaded tables
//! - **Coverage**: per-disease reporting span

mod catalog;
mod coverage;
mod error;
mod parquet;
mod query;

pub use catalog::DatasetCatalog;
pub use coverage::{DiseaseCoverage, disease_coverage};
pub use error::{CatalogError, Result};
pub use parquet::{read_parquet, write_parquet};
pub use query::{DataQuery, latest_week, list_diseases, list_prefectures};
