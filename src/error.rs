use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Drugrecall
#[derive(Error, Debug)]
pub enum DrugrecallError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A drug-set cell is not a list/set literal of strings
    #[error("Parse error: {0}")]
    Parse(String),

    /// An input table lacks one of its fixed columns
    #[error("Missing column '{column}' in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// micro_recall denominator is zero
    #[error("Run '{0}' has no ground-truth drugs; micro recall is undefined")]
    ZeroGroundTruth(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chart rendering errors
    #[error("Plot error: {0}")]
    Plot(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using DrugrecallError
pub type Result<T> = std::result::Result<T, DrugrecallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DrugrecallError::Config("Test error".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_missing_column_display() {
        let err = DrugrecallError::MissingColumn {
            path: PathBuf::from("data/testing_data.csv"),
            column: "drugs".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'drugs'"));
        assert!(msg.contains("testing_data.csv"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DrugrecallError = io_err.into();
        assert!(matches!(err, DrugrecallError::Io(_)));
    }

    #[test]
    fn test_zero_ground_truth_names_run() {
        let err = DrugrecallError::ZeroGroundTruth("Top 30".to_string());
        assert!(err.to_string().contains("Top 30"));
    }
}
