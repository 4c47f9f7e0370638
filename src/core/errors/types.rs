//! Core error types for the logo embedding pipeline.
//!
//! This module defines the error taxonomy shared by every pipeline component:
//! region extraction, normalization, batching and the feature store.

use std::path::Path;
use thiserror::Error;

/// Convenient result alias used throughout the crate.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors produced by the logo embedding pipeline.
///
/// Every failure propagates immediately to the caller; no component retries
/// internally. Operations either return a fully formed, shape-correct result
/// or one of these variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Error occurred while loading or decoding an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error indicating invalid input.
    ///
    /// Raised for degenerate (zero-area) crops where a content-dependent
    /// fill is required, zero batch sizes, empty batch sources, and
    /// label/feature misalignment on save.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a padding target smaller than the image to pad.
    ///
    /// Padding never truncates; a negative pad amount on either axis
    /// fails fast with this variant.
    #[error(
        "target size ({target_width}, {target_height}) smaller than the image ({image_width}, {image_height})"
    )]
    TargetTooSmall {
        /// The requested target width.
        target_width: u32,
        /// The requested target height.
        target_height: u32,
        /// The width of the image to pad.
        image_width: u32,
        /// The height of the image to pad.
        image_height: u32,
    },

    /// IO error from the feature store or image loading paths.
    #[error("io")]
    Io(#[from] std::io::Error),

    /// Error indicating a feature store file that is present but
    /// structurally invalid. Never auto-repaired.
    #[error("corrupt feature store '{path}': {reason}")]
    CorruptStore {
        /// Path of the offending store file.
        path: String,
        /// What was wrong with its structure.
        reason: String,
    },
}

impl From<image::ImageError> for PipelineError {
    /// Converts an image::ImageError to PipelineError::ImageLoad.
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl PipelineError {
    /// Creates an InvalidInput error from any displayable message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a CorruptStore error for the given store path.
    pub fn corrupt_store(path: &Path, reason: impl Into<String>) -> Self {
        Self::CorruptStore {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}
