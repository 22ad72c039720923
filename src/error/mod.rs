// Error types for the EEG classifier
//
// This module defines custom error types for recording ingestion and model
// operations, providing structured error handling with stable error codes.

mod data;
mod model;

pub use data::{log_data_error, DataError, DataErrorCodes};
pub use model::{log_model_error, ModelError, ModelErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the CLI and HTTP boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
