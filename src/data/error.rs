use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::model::Field;

/// The source table does not have the shape the dashboard needs.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("required column '{field}' is missing (accepted headers: {accepted})")]
    MissingColumn { field: Field, accepted: String },
}

/// Failure to turn a file into a [`Dataset`](super::model::Dataset).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("malformed input: {0}")]
    Malformed(String),
    #[error("the file contains no sheets or no header row")]
    Empty,
}

/// A query that has no meaningful answer for the current data.
/// Rendered as "N/A" rather than treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no records for year {year}")]
    EmptyGroup { year: i64 },
    #[error("the selected record has no index value")]
    MissingScore,
}
