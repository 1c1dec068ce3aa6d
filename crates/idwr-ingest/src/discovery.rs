//! File discovery for bulletin directories.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use idwr_model::DatasetKind;

use crate::error::{IngestError, Result};

static SEX_WORKBOOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Syu_01_1|01_1)\.(xls|xlsx)$").expect("sex workbook pattern")
});
static PLACE_WORKBOOK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Syu_02_1|02_1)\.(xls|xlsx)$").expect("place workbook pattern")
});
static ANY_WORKBOOK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Syu_0[12]_1\.(xls|xlsx)$").expect("workbook pattern"));

fn list_files_matching(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && keep(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Lists all CSV files in a directory, sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    list_files_matching(dir, |path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    })
}

/// Returns true if `name` is a workbook of the given historical kind.
///
/// Non-historical kinds accept either workbook family.
pub fn is_workbook_for(kind: DatasetKind, name: &str) -> bool {
    let pattern = match kind {
        DatasetKind::Sex => &SEX_WORKBOOK,
        DatasetKind::Place => &PLACE_WORKBOOK,
        _ => &ANY_WORKBOOK,
    };
    pattern.is_match(name)
}

/// Lists the confirmed-case workbooks of a directory for a dataset kind,
/// sorted by filename.
pub fn list_workbooks(dir: &Path, kind: DatasetKind) -> Result<Vec<PathBuf>> {
    list_files_matching(dir, |path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| is_workbook_for(kind, name))
    })
}

/// Resolves a parser input: a directory expands to its CSV files, a file is
/// returned as-is.
pub fn csv_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        list_csv_files(path)
    } else if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else {
        Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Resolves a workbook input the same way as [`csv_inputs`].
pub fn workbook_inputs(path: &Path, kind: DatasetKind) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        list_workbooks(path, kind)
    } else if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else {
        Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}
