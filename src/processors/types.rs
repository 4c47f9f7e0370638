//! Types used in image processing operations
//!
//! This module defines the bounding box geometry produced by the upstream
//! detector and the option enums consumed by the resize/pad normalizer.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// An axis-aligned detection box in `(xmin, ymin, xmax, ymax)` pixel order.
///
/// Detectors may attach a class id and a confidence score; both are carried
/// through untouched and ignored by region extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge in pixels.
    pub xmin: f32,
    /// Top edge in pixels.
    pub ymin: f32,
    /// Right edge in pixels.
    pub xmax: f32,
    /// Bottom edge in pixels.
    pub ymax: f32,
    /// Detector class index, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<usize>,
    /// Detector confidence, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl BoundingBox {
    /// Creates a bounding box from its four corner coordinates.
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            class_id: None,
            score: None,
        }
    }

    /// Attaches detector metadata to the box.
    pub fn with_detection(mut self, class_id: usize, score: f32) -> Self {
        self.class_id = Some(class_id);
        self.score = Some(score);
        self
    }
}

/// Specifies the pixel values written into padded regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Uniform grayscale fill equal to the mean intensity of the source
    /// crop, computed over all pixels and channels before any resizing.
    ConstantMean,
    /// Uniform grayscale fill with an explicit value.
    Constant(u8),
    /// Replicate the nearest edge pixel of the image being padded.
    Edge,
}

impl Default for FillMode {
    fn default() -> Self {
        FillMode::ConstantMean
    }
}

/// Resampling filter used when scaling crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    /// Nearest neighbor.
    Nearest,
    /// Bilinear interpolation.
    #[default]
    Triangle,
    /// Bicubic interpolation.
    CatmullRom,
    /// Lanczos with window 3.
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}
