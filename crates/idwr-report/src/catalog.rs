//! Named access to the persisted stage tables in a data directory.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::info;

use idwr_model::{DatasetKind, SurveillanceRecord};
use idwr_transform::build_stage_frame;

use crate::error::{CatalogError, Result};
use crate::parquet::{read_parquet, write_parquet};

/// Stage files under one data directory, one per [`DatasetKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCatalog {
    data_dir: PathBuf,
}

impl DatasetCatalog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    pub fn exists(&self, kind: DatasetKind) -> bool {
        self.path_for(kind).is_file()
    }

    /// Kinds whose stage file is present, in catalog order.
    pub fn available(&self) -> Vec<DatasetKind> {
        DatasetKind::ALL
            .into_iter()
            .filter(|kind| self.exists(*kind))
            .collect()
    }

    /// Resolves a catalog name or alias to a kind.
    pub fn resolve(name: &str) -> Result<DatasetKind> {
        name.parse::<DatasetKind>()
            .map_err(|_| CatalogError::UnknownDataset(name.to_string()))
    }

    pub fn load(&self, kind: DatasetKind) -> Result<DataFrame> {
        read_parquet(&self.path_for(kind))
    }

    /// Loads by catalog name (`sex_prefecture`, `bullet`, ...) or by the
    /// short aliases `sex` and `place`. Unknown names fail before any file
    /// is touched.
    pub fn load_by_name(&self, name: &str) -> Result<DataFrame> {
        let kind = Self::resolve(name)?;
        self.load(kind)
    }

    /// Writes `df` as the stage file of `kind` and returns its path.
    pub fn write(&self, kind: DatasetKind, df: &DataFrame) -> Result<PathBuf> {
        let path = self.path_for(kind);
        write_parquet(&path, kind, df)?;
        info!(dataset = kind.catalog_name(), rows = df.height(), path = %path.display(), "saved dataset");
        Ok(path)
    }

    /// Builds the stage frame of `kind` from parsed records and writes it.
    pub fn write_stage(&self, kind: DatasetKind, records: &[SurveillanceRecord]) -> Result<PathBuf> {
        let df = build_stage_frame(kind, records)?;
        self.write(kind, &df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idwr_model::{Category, SourceTag};
    use tempfile::TempDir;

    #[test]
    fn paths_use_catalog_names() {
        let catalog = DatasetCatalog::new("/srv/idwr");
        assert_eq!(
            catalog.path_for(DatasetKind::Sex),
            PathBuf::from("/srv/idwr/sex_prefecture.parquet")
        );
        assert_eq!(
            catalog.path_for(DatasetKind::Sentinel),
            PathBuf::from("/srv/idwr/sentinel.parquet")
        );
    }

    #[test]
    fn unknown_name_fails_immediately() {
        let catalog = DatasetCatalog::new("/nonexistent");
        let err = catalog.load_by_name("influenza").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownDataset(name) if name == "influenza"));
    }

    #[test]
    fn aliases_load_the_same_file() {
        let dir = TempDir::new().unwrap();
        let catalog = DatasetCatalog::new(dir.path());
        let records = vec![
            SurveillanceRecord::new("Tokyo", 2020, 1, "Measles", SourceTag::ConfirmedCases)
                .with_category(Category::Total)
                .with_count(Some(3)),
        ];
        catalog.write_stage(DatasetKind::Sex, &records).unwrap();

        assert_eq!(catalog.available(), vec![DatasetKind::Sex]);
        let by_alias = catalog.load_by_name("sex").unwrap();
        let by_name = catalog.load_by_name("sex_prefecture").unwrap();
        assert!(by_alias.equals_missing(&by_name));
        assert_eq!(by_alias.height(), 1);
    }

    #[test]
    fn missing_stage_is_reported_with_its_path() {
        let dir = TempDir::new().unwrap();
        let catalog = DatasetCatalog::new(dir.path());
        let err = catalog.load(DatasetKind::Unified).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "dataset file not found: {}",
                dir.path().join("unified.parquet").display()
            )
        );
    }
}
