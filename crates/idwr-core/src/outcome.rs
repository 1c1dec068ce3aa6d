//! Result of a best-effort parser run.

use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, PolarsResult};

use idwr_model::{DatasetKind, SurveillanceRecord};
use idwr_transform::build_stage_frame;

/// An input unit (file or sheet) that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInput {
    pub path: PathBuf,
    /// 1-based sheet id for workbook sheets.
    pub sheet: Option<usize>,
    pub reason: String,
}

/// Records produced by one parser call plus what was skipped on the way.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub kind: DatasetKind,
    pub records: Vec<SurveillanceRecord>,
    pub files_read: usize,
    pub skipped: Vec<SkippedInput>,
}

impl ParseOutcome {
    pub fn new(kind: DatasetKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            files_read: 0,
            skipped: Vec::new(),
        }
    }

    pub fn skip_file(&mut self, path: &Path, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(path = %path.display(), %reason, "skipping file");
        self.skipped.push(SkippedInput {
            path: path.to_path_buf(),
            sheet: None,
            reason,
        });
    }

    pub fn skip_sheet(&mut self, path: &Path, sheet: usize, reason: impl Into<String>) {
        self.skipped.push(SkippedInput {
            path: path.to_path_buf(),
            sheet: Some(sheet),
            reason: reason.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The stage table of this outcome's kind.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        build_stage_frame(self.kind, &self.records)
    }
}
