use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("column '{column}' not found")]
    ColumnNotFound { column: String },
    #[error("column '{column}' has {actual} values, frame has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
