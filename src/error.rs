//! Error types for the credit-approval workflow

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for credit-approval operations
pub type Result<T> = std::result::Result<T, CreditError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum CreditError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Target column '{0}' not in data")]
    TargetNotFound(String),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Transform already fitted; build a new one to refit")]
    AlreadyFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported column type for '{name}': {dtype}")]
    UnsupportedColumn { name: String, dtype: String },

    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("Plot error: {0}")]
    PlotError(String),
}

impl From<polars::error::PolarsError> for CreditError {
    fn from(err: polars::error::PolarsError) -> Self {
        CreditError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CreditError {
    fn from(err: serde_json::Error) -> Self {
        CreditError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CreditError {
    fn from(err: ndarray::ShapeError) -> Self {
        CreditError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CreditError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");

        let err = CreditError::TargetNotFound("approved".to_string());
        assert_eq!(err.to_string(), "Target column 'approved' not in data");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CreditError = io_err.into();
        assert!(matches!(err, CreditError::IoError(_)));
    }

    #[test]
    fn test_input_not_found_shows_path() {
        let err = CreditError::InputNotFound(PathBuf::from("data/credit.csv"));
        assert_eq!(err.to_string(), "Input file not found: data/credit.csv");
    }
}
