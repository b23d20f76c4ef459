//! Error types for the transform pipeline.

use thiserror::Error;

/// Errors produced while validating parameters or running a pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// A parameter is outside its declared range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The pixel buffer cannot be interpreted as RGB or RGBA.
    #[error("unsupported image format ({channels} channels): {reason}")]
    UnsupportedImageFormat { channels: usize, reason: String },

    /// A fixed-size crop does not fit inside the resized image.
    #[error("crop of {crop}px does not fit a {width}x{height} image")]
    CropOutOfBounds { crop: u32, width: u32, height: u32 },

    /// An injected random source failed to produce a sample.
    #[error("noise source failure: {0}")]
    NoiseSourceFailure(String),
}

impl TransformError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        TransformError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Error returned by a strict batch run: the first image that failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("image {index} failed: {source}")]
pub struct BatchError {
    /// Position of the failing image in the input batch.
    pub index: usize,
    #[source]
    pub source: TransformError,
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, TransformError>;
