//! Error types for bulletin ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading raw bulletin files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Decoding Errors ===
    /// Bytes could not be decoded with the expected encoding.
    #[error("failed to decode {path} as {encoding}")]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },

    /// Malformed CSV record.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // === Workbook Errors ===
    /// Workbook could not be opened.
    #[error("failed to open workbook {path}: {message}")]
    WorkbookOpen { path: PathBuf, message: String },

    /// Sheet could not be read.
    #[error("failed to read sheet {sheet} of {path}: {message}")]
    SheetRead {
        path: PathBuf,
        sheet: usize,
        message: String,
    },
}

impl IngestError {
    pub(crate) fn file_read(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
