// Classifier model error types and constants

use crate::error::{DataError, ErrorCode};
use log::error;
use std::fmt;

/// Model error code constants
///
/// Error code range: 2001-2006
pub struct ModelErrorCodes {}

impl ModelErrorCodes {
    /// Tensor backend reported a failure
    pub const TENSOR: i32 = 2001;

    /// Model artifact could not be read or written
    pub const ARTIFACT_IO: i32 = 2002;

    /// Model manifest is malformed or inconsistent
    pub const INVALID_MANIFEST: i32 = 2003;

    /// Not enough windows to train on
    pub const INSUFFICIENT_WINDOWS: i32 = 2004;

    /// Feature matrix width does not match the network input
    pub const DIMENSION_MISMATCH: i32 = 2005;

    /// Training data could not be assembled
    pub const DATA: i32 = 2006;
}

/// Log a model error with structured context
///
/// The logging is non-blocking and will not panic on failure.
pub fn log_model_error(err: &ModelError, context: &str) {
    error!(
        "Model error in {}: code={}, component=Classifier, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Classifier training, persistence and inference errors
///
/// Error code ranges: 2001-2006
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Candle tensor operation failed
    Tensor { details: String },

    /// Weights or manifest file I/O failed
    ArtifactIo { path: String, reason: String },

    /// Manifest JSON could not be parsed or is inconsistent
    InvalidManifest { reason: String },

    /// Fewer training windows than required
    InsufficientWindows { required: usize, available: usize },

    /// Feature vector width differs from the network input size
    DimensionMismatch { expected: usize, actual: usize },

    /// Underlying recording/window failure while building the dataset
    Data(DataError),
}

impl ErrorCode for ModelError {
    fn code(&self) -> i32 {
        match self {
            ModelError::Tensor { .. } => ModelErrorCodes::TENSOR,
            ModelError::ArtifactIo { .. } => ModelErrorCodes::ARTIFACT_IO,
            ModelError::InvalidManifest { .. } => ModelErrorCodes::INVALID_MANIFEST,
            ModelError::InsufficientWindows { .. } => ModelErrorCodes::INSUFFICIENT_WINDOWS,
            ModelError::DimensionMismatch { .. } => ModelErrorCodes::DIMENSION_MISMATCH,
            ModelError::Data(_) => ModelErrorCodes::DATA,
        }
    }

    fn message(&self) -> String {
        match self {
            ModelError::Tensor { details } => format!("Tensor error: {}", details),
            ModelError::ArtifactIo { path, reason } => {
                format!("Model artifact {} unavailable: {}", path, reason)
            }
            ModelError::InvalidManifest { reason } => {
                format!("Invalid model manifest: {}", reason)
            }
            ModelError::InsufficientWindows {
                required,
                available,
            } => {
                format!(
                    "Insufficient training windows: need {}, got {}",
                    required, available
                )
            }
            ModelError::DimensionMismatch { expected, actual } => {
                format!(
                    "Feature dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
            ModelError::Data(err) => err.message(),
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ModelError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ModelError {}

impl From<candle_core::Error> for ModelError {
    fn from(err: candle_core::Error) -> Self {
        ModelError::Tensor {
            details: err.to_string(),
        }
    }
}

impl From<DataError> for ModelError {
    fn from(err: DataError) -> Self {
        ModelError::Data(err)
    }
}
