//! Error types for persisted datasets.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while locating, reading or writing stage files.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Name does not match any dataset kind or alias.
    #[error("unknown dataset: {0} (expected sex, place, bullet, sentinel or unified)")]
    UnknownDataset(String),

    /// Stage file has not been produced yet.
    #[error("dataset file not found: {path}")]
    MissingFile { path: PathBuf },

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
