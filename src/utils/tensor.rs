//! Batch to tensor conversion for the embedding model.

use crate::core::errors::{PipelineError, PipelineResult};
use image::RgbImage;
use ndarray::Array4;

/// Converts a batch of equally sized images into an NCHW float tensor.
///
/// Pixel values are scaled to `[0, 1]`. The embedding model has one fixed
/// input shape, so every image in the batch must already share it; run
/// crops through the resize/pad normalizer first.
///
/// # Arguments
///
/// * `images` - The normalized batch
///
/// # Returns
///
/// A tensor of shape `(batch, 3, height, width)`. An empty batch yields an
/// empty tensor.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] when image dimensions differ
/// within the batch.
pub fn batch_to_tensor(images: &[RgbImage]) -> PipelineResult<Array4<f32>> {
    let Some(first) = images.first() else {
        return Ok(Array4::zeros((0, 0, 0, 0)));
    };

    let (width, height) = first.dimensions();
    for (i, img) in images.iter().enumerate() {
        if img.dimensions() != (width, height) {
            return Err(PipelineError::invalid_input(format!(
                "all images in a batch must share dimensions: image 0 is {}x{}, image {} is {}x{}",
                width,
                height,
                i,
                img.width(),
                img.height()
            )));
        }
    }

    let mut tensor = Array4::zeros((images.len(), 3, height as usize, width as usize));
    for (n, img) in images.iter().enumerate() {
        for (x, y, pixel) in img.enumerate_pixels() {
            for c in 0..3 {
                tensor[[n, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
            }
        }
    }

    Ok(tensor)
}
