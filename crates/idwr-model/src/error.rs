use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("unknown source tag: {0}")]
    UnknownSource(String),
    #[error("unknown source filter: {0} (expected confirmed, sentinel or all)")]
    UnknownSourceFilter(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
