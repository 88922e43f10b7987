use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// File-level failures: the whole file could not be turned into rows.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("workbook '{0}' has no sheet")]
    NoSheet(String),

    #[error("'{0}' has no header row")]
    NoHeader(String),

    #[error("'{file}' is missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("unsupported file type: '{0}' (expected .csv, .xlsx, .xls or .ods)")]
    UnsupportedFormat(String),

    #[error("invalid amount pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Why a single row could not be normalized.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum RejectReason {
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
}

/// A row that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("row {row}: {reason}")]
pub struct RejectedRow {
    pub row: usize,
    pub reason: RejectReason,
}
