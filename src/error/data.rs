// Recording and window error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Data error code constants
///
/// Error code range: 1001-1008
pub struct DataErrorCodes {}

impl DataErrorCodes {
    /// Recording file could not be opened or read
    pub const FILE_UNREADABLE: i32 = 1001;

    /// CSV record could not be parsed
    pub const MALFORMED_CSV: i32 = 1002;

    /// Required column absent from the header row
    pub const MISSING_COLUMN: i32 = 1003;

    /// Amplitude cell is not a floating point number
    pub const INVALID_AMPLITUDE: i32 = 1004;

    /// Recording holds fewer samples than one window
    pub const RECORDING_TOO_SHORT: i32 = 1005;

    /// Feature extraction was handed an empty window
    pub const EMPTY_WINDOW: i32 = 1006;

    /// Training window carries no label votes
    pub const MISSING_LABEL: i32 = 1007;

    /// Recording file could not be created or written
    pub const FILE_UNWRITABLE: i32 = 1008;
}

/// Log a data error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_data_error(err: &DataError, context: &str) {
    error!(
        "Data error in {}: code={}, component=Recording, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Recording ingestion and windowing errors
///
/// Error code ranges: 1001-1008
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// File open or read failure
    FileUnreadable { path: String, reason: String },

    /// CSV reader rejected a record
    MalformedCsv { reason: String },

    /// Header row lacks a required column
    MissingColumn { column: &'static str },

    /// Amplitude cell could not be parsed (row is 1-based, header excluded)
    InvalidAmplitude { row: usize, value: String },

    /// Recording is shorter than the requested window
    RecordingTooShort { required: usize, available: usize },

    /// Empty window handed to feature extraction
    EmptyWindow,

    /// Window used for training has no label votes
    MissingLabel { window: usize },

    /// File create or write failure
    FileUnwritable { path: String, reason: String },
}

impl ErrorCode for DataError {
    fn code(&self) -> i32 {
        match self {
            DataError::FileUnreadable { .. } => DataErrorCodes::FILE_UNREADABLE,
            DataError::MalformedCsv { .. } => DataErrorCodes::MALFORMED_CSV,
            DataError::MissingColumn { .. } => DataErrorCodes::MISSING_COLUMN,
            DataError::InvalidAmplitude { .. } => DataErrorCodes::INVALID_AMPLITUDE,
            DataError::RecordingTooShort { .. } => DataErrorCodes::RECORDING_TOO_SHORT,
            DataError::EmptyWindow => DataErrorCodes::EMPTY_WINDOW,
            DataError::MissingLabel { .. } => DataErrorCodes::MISSING_LABEL,
            DataError::FileUnwritable { .. } => DataErrorCodes::FILE_UNWRITABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            DataError::FileUnreadable { path, reason } => {
                format!("Failed to read recording {}: {}", path, reason)
            }
            DataError::MalformedCsv { reason } => format!("Malformed CSV: {}", reason),
            DataError::MissingColumn { column } => {
                format!("Recording has no '{}' column", column)
            }
            DataError::InvalidAmplitude { row, value } => {
                format!("Invalid amplitude '{}' at row {}", value, row)
            }
            DataError::RecordingTooShort {
                required,
                available,
            } => {
                format!(
                    "Recording too short: need {} samples, got {}",
                    required, available
                )
            }
            DataError::EmptyWindow => "Cannot extract features from an empty window".to_string(),
            DataError::MissingLabel { window } => {
                format!("Window {} has no labels to vote on", window)
            }
            DataError::FileUnwritable { path, reason } => {
                format!("Failed to write recording {}: {}", path, reason)
            }
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DataError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DataError {}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::MalformedCsv {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_codes() {
        assert_eq!(
            DataError::FileUnreadable {
                path: "EEG.csv".to_string(),
                reason: "missing".to_string()
            }
            .code(),
            1001
        );
        assert_eq!(
            DataError::MalformedCsv {
                reason: "test".to_string()
            }
            .code(),
            1002
        );
        assert_eq!(
            DataError::MissingColumn {
                column: "Amplitude"
            }
            .code(),
            1003
        );
        assert_eq!(
            DataError::InvalidAmplitude {
                row: 3,
                value: "abc".to_string()
            }
            .code(),
            1004
        );
        assert_eq!(
            DataError::RecordingTooShort {
                required: 256,
                available: 10
            }
            .code(),
            1005
        );
        assert_eq!(DataError::EmptyWindow.code(), 1006);
        assert_eq!(DataError::MissingLabel { window: 0 }.code(), 1007);
        assert_eq!(
            DataError::FileUnwritable {
                path: "EEG.csv".to_string(),
                reason: "read-only".to_string()
            }
            .code(),
            1008
        );
    }

    #[test]
    fn test_data_error_messages() {
        let err = DataError::RecordingTooShort {
            required: 256,
            available: 100,
        };
        assert!(err.message().contains("need 256"));
        assert!(err.message().contains("got 100"));

        let err = DataError::MissingColumn { column: "Label" };
        assert!(err.to_string().contains("code 1003"));
        assert!(err.to_string().contains("'Label'"));
    }
}
