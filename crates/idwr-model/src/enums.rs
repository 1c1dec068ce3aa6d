//! Closed enumerations for surveillance datasets.
//!
//! The bulletins encode these concepts as free-form strings; the enums here
//! fix the accepted set so that dispatch and merge decisions never depend on
//! string comparison.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::{
    CATEGORY, COUNT, DATE, DISEASE, PER_SENTINEL, PREFECTURE, SOURCE, WEEK, YEAR,
};

/// Dataset stage produced by the pipeline.
///
/// Each kind has its own parser (or, for [`DatasetKind::Unified`], the merge
/// step) and its own persisted stage file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatasetKind {
    /// Historical sex-disaggregated confirmed cases (Excel, 1999-2023).
    Sex,
    /// Historical place-of-infection confirmed cases (Excel, 2001-2023).
    Place,
    /// Modern weekly all-case bulletin (CSV, 2024+).
    Bullet,
    /// Modern weekly sentinel bulletin (CSV, 2024+).
    Sentinel,
    /// Merged and validated table.
    Unified,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Sex,
        DatasetKind::Place,
        DatasetKind::Bullet,
        DatasetKind::Sentinel,
        DatasetKind::Unified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Sex => "sex",
            DatasetKind::Place => "place",
            DatasetKind::Bullet => "bullet",
            DatasetKind::Sentinel => "sentinel",
            DatasetKind::Unified => "unified",
        }
    }

    /// Name used by the dataset catalog and the persisted file stem.
    pub fn catalog_name(&self) -> &'static str {
        match self {
            DatasetKind::Sex => "sex_prefecture",
            DatasetKind::Place => "place_prefecture",
            DatasetKind::Bullet => "bullet",
            DatasetKind::Sentinel => "sentinel",
            DatasetKind::Unified => "unified",
        }
    }

    /// File name of the persisted stage table.
    pub fn file_name(&self) -> String {
        format!("{}.parquet", self.catalog_name())
    }

    /// Ordered column set of this kind's stage table.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Sex | DatasetKind::Place => &[
                PREFECTURE, YEAR, WEEK, DATE, DISEASE, CATEGORY, COUNT, SOURCE,
            ],
            DatasetKind::Bullet => &[PREFECTURE, YEAR, WEEK, DATE, DISEASE, COUNT, SOURCE],
            DatasetKind::Sentinel => &[
                PREFECTURE,
                YEAR,
                WEEK,
                DATE,
                DISEASE,
                COUNT,
                PER_SENTINEL,
                SOURCE,
            ],
            DatasetKind::Unified => &[
                PREFECTURE,
                YEAR,
                WEEK,
                DATE,
                DISEASE,
                CATEGORY,
                COUNT,
                PER_SENTINEL,
                SOURCE,
            ],
        }
    }

    /// True for the Excel-backed historical kinds.
    pub fn is_historical(&self) -> bool {
        matches!(self, DatasetKind::Sex | DatasetKind::Place)
    }

    /// Guess the dataset kind from a file or directory name.
    ///
    /// This is a fallback for callers that do not know the kind up front;
    /// explicit kinds always take precedence.
    pub fn infer_from_path(path: &Path) -> Option<DatasetKind> {
        let name = path.file_name()?.to_str()?;
        let lower = name.to_lowercase();
        if lower.contains("teiten") {
            return Some(DatasetKind::Sentinel);
        }
        if lower.ends_with(".csv") || lower.contains("zensu") {
            return Some(DatasetKind::Bullet);
        }
        if name.contains("Syu_01") || lower.contains("sex") {
            return Some(DatasetKind::Sex);
        }
        if name.contains("Syu_02") || lower.contains("place") {
            return Some(DatasetKind::Place);
        }
        None
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DatasetKind {
    type Err = ModelError;

    /// Accepts both the short kind names and the catalog names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sex" | "sex_prefecture" => Ok(DatasetKind::Sex),
            "place" | "place_prefecture" => Ok(DatasetKind::Place),
            "bullet" => Ok(DatasetKind::Bullet),
            "sentinel" => Ok(DatasetKind::Sentinel),
            "unified" => Ok(DatasetKind::Unified),
            _ => Err(ModelError::UnknownDataset(s.to_string())),
        }
    }
}

/// Disaggregation category of a historical confirmed-case column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Total,
    Male,
    Female,
    Japan,
    Others,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Total => "total",
            Category::Male => "male",
            Category::Female => "female",
            Category::Japan => "japan",
            Category::Others => "others",
            Category::Unknown => "unknown",
        }
    }

    /// Keyword-match a cleaned header cell against the category set.
    ///
    /// Matching is a case-insensitive substring test. "female" is tested
    /// before "male" because the latter is a substring of the former.
    /// Returns `None` when no keyword is present.
    pub fn from_label(label: &str) -> Option<Category> {
        let lower = label.to_lowercase();
        if lower.contains("total") {
            Some(Category::Total)
        } else if lower.contains("female") {
            Some(Category::Female)
        } else if lower.contains("male") {
            Some(Category::Male)
        } else if lower.contains("japan") {
            Some(Category::Japan)
        } else if lower.contains("others") {
            Some(Category::Others)
        } else if lower.contains("unknown") {
            Some(Category::Unknown)
        } else {
            None
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "total" => Ok(Category::Total),
            "male" => Ok(Category::Male),
            "female" => Ok(Category::Female),
            "japan" => Ok(Category::Japan),
            "others" => Ok(Category::Others),
            "unknown" => Ok(Category::Unknown),
            _ => Err(ModelError::UnknownCategory(s.to_string())),
        }
    }
}

/// Provenance tag written to the `source` column.
///
/// The agency has published confirmed-case data under two labels over the
/// years; both belong to [`SourceClass::Confirmed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceTag {
    ConfirmedCases,
    AllCaseReporting,
    SentinelSurveillance,
}

/// Equivalence class of provenance tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceClass {
    Confirmed,
    Sentinel,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::ConfirmedCases => "Confirmed cases",
            SourceTag::AllCaseReporting => "All-case reporting",
            SourceTag::SentinelSurveillance => "Sentinel surveillance",
        }
    }

    pub fn class(&self) -> SourceClass {
        match self {
            SourceTag::ConfirmedCases | SourceTag::AllCaseReporting => SourceClass::Confirmed,
            SourceTag::SentinelSurveillance => SourceClass::Sentinel,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.class() == SourceClass::Confirmed
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "confirmed cases" => Ok(SourceTag::ConfirmedCases),
            "all-case reporting" => Ok(SourceTag::AllCaseReporting),
            "sentinel surveillance" => Ok(SourceTag::SentinelSurveillance),
            _ => Err(ModelError::UnknownSource(s.to_string())),
        }
    }
}

/// Source selection used by the loader query layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceFilter {
    Confirmed,
    Sentinel,
    #[default]
    All,
}

impl SourceFilter {
    /// Returns true if a raw `source` value passes this filter.
    ///
    /// Unrecognized tags only pass [`SourceFilter::All`].
    pub fn matches(&self, source: &str) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::Confirmed => source
                .parse::<SourceTag>()
                .is_ok_and(|tag| tag.class() == SourceClass::Confirmed),
            SourceFilter::Sentinel => source
                .parse::<SourceTag>()
                .is_ok_and(|tag| tag.class() == SourceClass::Sentinel),
        }
    }
}

impl FromStr for SourceFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => Ok(SourceFilter::Confirmed),
            "sentinel" => Ok(SourceFilter::Sentinel),
            "all" => Ok(SourceFilter::All),
            _ => Err(ModelError::UnknownSourceFilter(s.to_string())),
        }
    }
}
