//! Parquet persistence of stage tables.

use std::fs::File;
use std::path::Path;

use polars::prelude::{DataFrame, ParquetReader, ParquetWriter, SerReader};
use tempfile::NamedTempFile;
use tracing::debug;

use idwr_model::DatasetKind;
use idwr_transform::align_to_columns;

use crate::error::{CatalogError, Result};

/// Writes `df` projected onto the canonical columns of `kind`.
///
/// Missing columns are written as typed nulls; extra columns are dropped.
/// An existing file at `path` is only replaced once the new file is complete.
pub fn write_parquet(path: &Path, kind: DatasetKind, df: &DataFrame) -> Result<()> {
    let mut aligned = align_to_columns(df, kind.columns())?;
    replace_file(path, |file| {
        ParquetWriter::new(file).finish(&mut aligned)?;
        Ok(())
    })?;
    debug!(path = %path.display(), rows = aligned.height(), "wrote parquet");
    Ok(())
}

/// Runs `write` against a temporary file next to `path`, then renames it
/// over `path`. On error the temporary file is removed.
fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    let io_error = |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(parent).map_err(|source| CatalogError::Io {
        path: parent.to_path_buf(),
        source,
    })?;
    let mut staged = NamedTempFile::new_in(parent).map_err(io_error)?;
    write(staged.as_file_mut())?;
    staged.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

pub fn read_parquet(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(CatalogError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let df = ParquetReader::new(file).finish()?;
    debug!(path = %path.display(), rows = df.height(), "read parquet");
    Ok(df)
}
