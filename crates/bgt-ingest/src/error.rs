//! Error types for budget spreadsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating or reading input files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Directory not found or not readable.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Input path does not exist.
    #[error("input not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension is not a supported spreadsheet format.
    #[error("unsupported file type: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Workbook could not be opened or a sheet could not be read.
    #[error("failed to read workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Workbook has no worksheets.
    #[error("workbook has no sheets: {path}")]
    NoSheets { path: PathBuf },

    /// Requested sheet does not exist.
    #[error("sheet '{sheet}' not found in {path}")]
    SheetNotFound { path: PathBuf, sheet: String },

    /// A title pattern does not compile or lacks its capture groups.
    #[error("invalid title pattern '{pattern}': {reason}")]
    InvalidTitlePattern { pattern: String, reason: String },

    /// CSV file could not be parsed.
    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Errors raised while turning a raw grid into a table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The sheet has no rows at all.
    #[error("sheet is empty")]
    EmptyGrid,

    /// A pinned header row lies outside the sheet.
    #[error("header row {row} is outside the sheet ({rows} rows)")]
    HeaderRowOutOfRange { row: usize, rows: usize },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = IngestError::DirectoryNotFound {
            path: PathBuf::from("/data/budget"),
        };
        assert_eq!(err.to_string(), "directory not found: /data/budget");

        let err = IngestError::SheetNotFound {
            path: PathBuf::from("a.xlsx"),
            sheet: "5รายละเอียด".to_string(),
        };
        assert_eq!(err.to_string(), "sheet '5รายละเอียด' not found in a.xlsx");

        let err = ExtractError::HeaderRowOutOfRange { row: 9, rows: 3 };
        assert_eq!(err.to_string(), "header row 9 is outside the sheet (3 rows)");
    }
}
