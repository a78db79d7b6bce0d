//! Error types for the table store.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table '{table}' does not exist")]
    TableNotFound { table: String },

    #[error("table '{table}' has no rows")]
    EmptyTable { table: String },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A row has a different number of cells than the row set has columns.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// The backend refused the request.
    #[error("table '{table}' rejected the request: {reason}")]
    Rejected { table: String, reason: String },

    #[error("insert batch {batch} into '{table}' failed: {source}")]
    BatchFailed {
        table: String,
        batch: usize,
        #[source]
        source: Box<StoreError>,
    },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for StoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
