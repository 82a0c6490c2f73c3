//! Error types for sheetstream

use thiserror::Error;

/// Result type alias for spreadsheet operations
pub type Result<T> = std::result::Result<T, SpreadsheetError>;

/// Main error type for all spreadsheet operations
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// A row, note, table or image operation was invoked with no worksheet open
    #[error("No worksheet is open; call start_worksheet first")]
    NoActiveWorksheet,

    /// A worksheet was started while another one is still open
    #[error("Worksheet '{0}' is still open; finish it before starting another")]
    WorksheetAlreadyOpen(String),

    /// The spreadsheet has already been finished
    #[error("The spreadsheet has already been finished")]
    Finished,

    /// An earlier sink failure or cancellation left the spreadsheet unusable
    #[error("The spreadsheet is unusable after an earlier failure")]
    Faulted,

    /// An argument failed validation
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Worksheet names must be unique (case-insensitive)
    #[error("A worksheet named '{0}' already exists")]
    DuplicateWorksheetName(String),

    /// Named styles must be unique
    #[error("A style named '{0}' already exists")]
    DuplicateStyleName(String),

    /// Table names must be unique across the workbook (case-insensitive)
    #[error("A table named '{0}' already exists")]
    DuplicateTableName(String),

    /// Invalid cell reference
    #[error("Invalid cell reference: {0}")]
    InvalidCell(String),

    /// The operation is not allowed in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The worksheet already holds the maximum number of rows
    #[error("Row {0} exceeds the worksheet row limit")]
    RowLimitExceeded(u32),

    /// Image data is not a PNG or JPEG that we can read dimensions from
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Cancellation was requested; observed at a flush boundary
    #[error("The operation was cancelled")]
    Cancelled,

    /// IO error wrapper
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by the archive sink
    #[error("Archive error: {0}")]
    ArchiveError(String),
}

impl SpreadsheetError {
    /// Whether the error was caused by calling the API in an invalid state or
    /// with invalid arguments (as opposed to a sink failure).
    pub fn is_usage_error(&self) -> bool {
        !matches!(
            self,
            SpreadsheetError::IoError(_)
                | SpreadsheetError::ArchiveError(_)
                | SpreadsheetError::Cancelled
        )
    }

    pub(crate) fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        SpreadsheetError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn archive(err: impl std::fmt::Display) -> Self {
        SpreadsheetError::ArchiveError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_classification() {
        assert!(SpreadsheetError::NoActiveWorksheet.is_usage_error());
        assert!(SpreadsheetError::Finished.is_usage_error());
        assert!(!SpreadsheetError::Cancelled.is_usage_error());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(!SpreadsheetError::from(io).is_usage_error());
    }

    #[test]
    fn test_messages() {
        let err = SpreadsheetError::invalid_argument("name", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'name': must not be empty"
        );
    }
}
