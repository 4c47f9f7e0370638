//! Bounding box based region extraction.

use crate::processors::BoundingBox;
use image::{RgbImage, imageops};

/// Extracts detection regions out of a source image.
pub struct RegionCrop;

impl RegionCrop {
    /// Crops the region of `image` covered by a single bounding box.
    ///
    /// Box corners are divided by `expand` before conversion to pixel
    /// indices, which supports boxes expressed at a different resolution
    /// than `image` (for example when the detector ran on an upscaled
    /// copy). The minimum corner is floored, the maximum corner rounded to
    /// nearest, and both are clamped to the image extent, so out-of-range
    /// boxes silently yield smaller crops instead of failing.
    ///
    /// A box with equal (or inverted) min/max on an axis yields a crop
    /// with zero extent on that axis. That is valid output, not an error;
    /// it becomes one only when such a crop later meets a content-dependent
    /// operation like mean-fill normalization.
    ///
    /// # Arguments
    ///
    /// * `image` - The source image
    /// * `bbox` - The box defining the crop region
    /// * `expand` - Scale divisor applied to box coordinates
    ///
    /// # Returns
    ///
    /// The cropped image, possibly with zero extent on one or both axes.
    pub fn crop_region(image: &RgbImage, bbox: &BoundingBox, expand: f32) -> RgbImage {
        let img_w = image.width() as i64;
        let img_h = image.height() as i64;

        let x1 = ((bbox.xmin / expand).floor() as i64).clamp(0, img_w) as u32;
        let y1 = ((bbox.ymin / expand).floor() as i64).clamp(0, img_h) as u32;
        let x2 = ((bbox.xmax / expand).round() as i64).clamp(0, img_w) as u32;
        let y2 = ((bbox.ymax / expand).round() as i64).clamp(0, img_h) as u32;

        let width = x2.saturating_sub(x1);
        let height = y2.saturating_sub(y1);

        imageops::crop_imm(image, x1, y1, width, height).to_image()
    }

    /// Crops every bounding box in `bboxes` out of the same source image.
    ///
    /// The output order matches the input order. Fields beyond the four
    /// corner coordinates (class id, score) are ignored.
    ///
    /// # Arguments
    ///
    /// * `image` - The source image
    /// * `bboxes` - The boxes to crop
    /// * `expand` - Scale divisor applied to box coordinates
    ///
    /// # Returns
    ///
    /// One crop per input box, in input order.
    pub fn crop_regions(image: &RgbImage, bboxes: &[BoundingBox], expand: f32) -> Vec<RgbImage> {
        bboxes
            .iter()
            .map(|bbox| Self::crop_region(image, bbox, expand))
            .collect()
    }
}
