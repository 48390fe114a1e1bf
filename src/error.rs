//! Error types for gesture recognition.
//!
//! None of these errors is fatal to a capture session: the session logs
//! them and skips the recognition cycle that produced them.

use thiserror::Error;

/// Main error type for gesture recognition operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecognitionError {
    /// The raster canvas could not be allocated or the geometry was unusable.
    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    /// The classifier is not loaded or inference failed.
    #[error("Classification unavailable: {0}")]
    ClassificationUnavailable(String),

    /// The classifier returned a score vector of the wrong length.
    #[error("Score vector length mismatch: expected {expected} scores, got {actual}")]
    ScoreLengthMismatch { expected: usize, actual: usize },

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A serialized record could not be converted.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Result type alias for gesture recognition operations.
pub type Result<T> = std::result::Result<T, RecognitionError>;

impl RecognitionError {
    /// Create a rasterization error.
    #[must_use]
    pub fn rasterization(msg: impl Into<String>) -> Self {
        Self::Rasterization(msg.into())
    }

    /// Create a classification-unavailable error.
    #[must_use]
    pub fn classification_unavailable(msg: impl Into<String>) -> Self {
        Self::ClassificationUnavailable(msg.into())
    }

    /// Create a score length mismatch error.
    #[must_use]
    pub const fn score_length_mismatch(expected: usize, actual: usize) -> Self {
        Self::ScoreLengthMismatch { expected, actual }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid record error.
    #[must_use]
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }
}
