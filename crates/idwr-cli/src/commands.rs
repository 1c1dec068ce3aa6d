use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use idwr_core::{ParseOptions, SkippedInput, UnifiedBuild, UnifiedBuilder, parse_dataset};
use idwr_model::{DatasetKind, DiseaseNameTracker, SourceFilter};
use idwr_report::{
    DataQuery, DatasetCatalog, DiseaseCoverage, disease_coverage, list_diseases, list_prefectures,
    write_parquet,
};
use idwr_validate::{ValidationSummary, check_unified};

/// Inputs of `idwr parse`.
#[derive(Debug, Clone)]
pub struct ParseRequest {
    pub kind: DatasetKind,
    pub input: PathBuf,
    pub options: ParseOptions,
    /// Overrides the catalog path of the stage file.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ParseReport {
    pub kind: DatasetKind,
    pub records: usize,
    pub files_read: usize,
    pub skipped: Vec<SkippedInput>,
    pub output: PathBuf,
    pub mappings: BTreeMap<String, String>,
}

pub fn run_parse(catalog: &DatasetCatalog, request: &ParseRequest) -> Result<ParseReport> {
    let _span = info_span!("parse", kind = %request.kind).entered();
    let mut tracker = DiseaseNameTracker::new();
    let outcome = parse_dataset(request.kind, &request.input, &request.options, &mut tracker)?;
    let frame = outcome.to_frame().context("build stage table")?;

    let output = match &request.output {
        Some(path) => {
            write_parquet(path, request.kind, &frame)
                .with_context(|| format!("write {}", path.display()))?;
            path.clone()
        }
        None => catalog
            .write(request.kind, &frame)
            .with_context(|| format!("write {} stage", request.kind))?,
    };
    info!(records = outcome.len(), skipped = outcome.skipped.len(), "parse finished");

    Ok(ParseReport {
        kind: request.kind,
        records: outcome.len(),
        files_read: outcome.files_read,
        skipped: outcome.skipped,
        output,
        mappings: tracker.into_inner(),
    })
}

#[derive(Debug, Clone)]
pub struct BuildReport {
    pub build: UnifiedBuild,
    /// `None` on a dry run.
    pub output: Option<PathBuf>,
}

/// Loads every stage file present in the catalog and builds the unified
/// table from them.
pub fn run_build(catalog: &DatasetCatalog, dry_run: bool) -> Result<BuildReport> {
    let stages: Vec<DatasetKind> = catalog
        .available()
        .into_iter()
        .filter(|kind| *kind != DatasetKind::Unified)
        .collect();
    if stages.is_empty() {
        bail!("no stage tables found in {}", catalog.data_dir().display());
    }

    let mut builder = UnifiedBuilder::new();
    for kind in stages {
        let df = catalog
            .load(kind)
            .with_context(|| format!("load {} stage", kind.catalog_name()))?;
        builder.load(kind, df);
    }

    let mut output = None;
    let build = builder.build_with(|frame| {
        if !dry_run {
            output = Some(catalog.write(DatasetKind::Unified, frame)?);
        }
        Ok(())
    })?;
    Ok(BuildReport { build, output })
}

fn load(catalog: &DatasetCatalog, dataset: &str) -> Result<DataFrame> {
    catalog
        .load_by_name(dataset)
        .with_context(|| format!("load dataset {dataset}"))
}

pub fn run_coverage(catalog: &DatasetCatalog, dataset: &str) -> Result<Vec<DiseaseCoverage>> {
    Ok(disease_coverage(&load(catalog, dataset)?))
}

pub fn run_query(catalog: &DatasetCatalog, dataset: &str, query: &DataQuery) -> Result<DataFrame> {
    query
        .apply(&load(catalog, dataset)?)
        .context("apply query filters")
}

pub fn run_diseases(
    catalog: &DatasetCatalog,
    dataset: &str,
    source: SourceFilter,
) -> Result<Vec<String>> {
    Ok(list_diseases(&load(catalog, dataset)?, source))
}

pub fn run_prefectures(catalog: &DatasetCatalog, dataset: &str) -> Result<Vec<String>> {
    Ok(list_prefectures(&load(catalog, dataset)?))
}

/// Runs every unified-table check against a stored dataset.
pub fn run_validate(catalog: &DatasetCatalog, dataset: &str) -> Result<ValidationSummary> {
    let summary = check_unified(&load(catalog, dataset)?);
    info!(rows = summary.rows, passed = summary.passed(), "validation finished");
    Ok(summary)
}
