//! Image loading and measurement helpers.

use crate::core::errors::PipelineResult;
use image::{Rgb, RgbImage};
use std::path::Path;

/// Loads an image from disk and converts it to RGB.
///
/// # Arguments
///
/// * `path` - Path of the image file
///
/// # Returns
///
/// The decoded image, or [`crate::core::PipelineError::ImageLoad`] when the
/// file cannot be opened or decoded.
pub fn load_image(path: impl AsRef<Path>) -> PipelineResult<RgbImage> {
    let img = image::open(path.as_ref())?;
    Ok(img.to_rgb8())
}

/// Creates an RGB image of the given size filled with a single pixel value.
pub fn create_rgb_image(width: u32, height: u32, fill: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, fill)
}

/// Mean intensity over every pixel and channel of `img`.
///
/// Returns `None` for a zero-area image, whose mean is undefined.
pub fn mean_intensity(img: &RgbImage) -> Option<f32> {
    let raw = img.as_raw();
    if raw.is_empty() {
        return None;
    }
    let sum: u64 = raw.iter().map(|&v| v as u64).sum();
    Some(sum as f32 / raw.len() as f32)
}
