//! Error types for MovieLens data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a whole CSV source from being read.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to open or read the file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Header row could not be parsed.
    #[error("failed to parse CSV header in {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Required column not present in the header row.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },
}

impl IngestError {
    pub(crate) fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// A single data row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {index}: {kind}")]
pub struct RowReadError {
    /// Zero-based data row index (header excluded).
    pub index: usize,
    pub kind: RowReadErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowReadErrorKind {
    /// The CSV reader rejected the row (bad quoting, invalid UTF-8, I/O).
    #[error("malformed row: {0}")]
    Malformed(String),

    /// The row ended before a mapped column.
    #[error("missing value for column '{0}'")]
    MissingField(&'static str),
}
