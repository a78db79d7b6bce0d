//! Error types for report ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading source exports.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No file in the directory matched any of the patterns.
    #[error("no report matching {patterns} found in {dir}")]
    NoReportFound { dir: PathBuf, patterns: String },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file-name pattern that does not compile.
    #[error("invalid file pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file has no header line.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// File starts with a byte-order mark we cannot read.
    #[error("unsupported encoding {encoding} in {path}; re-export as UTF-8")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === Schema Errors ===
    /// Declared required columns are absent from the source.
    #[error("{schema} is missing required column(s): {}", columns.join(", "))]
    MissingColumns {
        schema: &'static str,
        columns: Vec<String>,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
