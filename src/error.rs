use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Selector error: {0}")]
    Selector(String),
    #[error("Required input file not found: {0}")]
    MissingInput(PathBuf),
    #[error("Column '{column}' is missing from {file}")]
    MissingColumn { file: String, column: String },
    #[error("Primary category '{0}' has no usable data")]
    PrimaryUnavailable(String),
    #[error("Clustering failed: {0}")]
    Clustering(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
