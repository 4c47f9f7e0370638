//! Aspect-preserving resize and pad normalization.
//!
//! Crops arriving from region extraction have arbitrary shapes; the
//! embedding model expects one fixed input shape. Normalization scales a
//! crop uniformly until the larger relative dimension exactly fills its
//! target axis, then center-pads the other axis. Content is never cropped
//! or distorted.

use crate::core::errors::{PipelineError, PipelineResult};
use crate::processors::types::{FillMode, ResizeFilter};
use crate::utils::image::mean_intensity;
use image::{Rgb, RgbImage, imageops};

/// Configuration for [`resize_and_pad`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResizePadConfig {
    /// Target shape as `(height, width)`.
    pub target: (u32, u32),
    /// Fill policy for padded pixels.
    #[serde(default)]
    pub fill: FillMode,
    /// Resampling filter used for the scale step.
    #[serde(default)]
    pub filter: ResizeFilter,
}

impl ResizePadConfig {
    /// Creates a configuration with the default mean fill and bilinear
    /// resampling.
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            target: (height, width),
            fill: FillMode::default(),
            filter: ResizeFilter::default(),
        }
    }

    /// Replaces the fill policy.
    pub fn with_fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }

    /// Replaces the resampling filter.
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Fill policy with any content-dependent value already computed.
#[derive(Debug, Clone, Copy)]
enum ResolvedFill {
    Constant(u8),
    Edge,
}

/// Computes the concrete fill for `img`, taking the mean before any resize.
fn resolve_fill(fill: FillMode, img: &RgbImage) -> PipelineResult<ResolvedFill> {
    match fill {
        FillMode::Constant(value) => Ok(ResolvedFill::Constant(value)),
        FillMode::ConstantMean => {
            let mean = mean_intensity(img).ok_or_else(|| {
                PipelineError::invalid_input(
                    "mean fill is undefined for a zero-area image",
                )
            })?;
            Ok(ResolvedFill::Constant(mean.round() as u8))
        }
        FillMode::Edge => {
            if img.width() == 0 || img.height() == 0 {
                return Err(PipelineError::invalid_input(
                    "edge fill is undefined for a zero-area image",
                ));
            }
            Ok(ResolvedFill::Edge)
        }
    }
}

/// Resizes a crop with preserved aspect ratio and pads it to an exact shape.
///
/// The crop is scaled by `min(target_w / crop_w, target_h / crop_h)`, so
/// the binding axis exactly fills its target dimension and the other ends
/// up no larger than its target. The remainder on each axis is split as
/// `(floor(pad / 2), ceil(pad / 2))`: the leading side takes the floor and
/// the trailing side absorbs any odd unit.
///
/// With [`FillMode::ConstantMean`] the fill value is the mean intensity of
/// the original, unresized crop, replicated across all channels.
///
/// # Arguments
///
/// * `img` - The crop to normalize
/// * `config` - Target shape, fill policy and resampling filter
///
/// # Returns
///
/// An image of exactly `config.target`, or an error.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] when the crop has zero area.
pub fn resize_and_pad(img: &RgbImage, config: &ResizePadConfig) -> PipelineResult<RgbImage> {
    let (img_w, img_h) = img.dimensions();
    if img_w == 0 || img_h == 0 {
        return Err(PipelineError::invalid_input(format!(
            "cannot normalize a zero-area crop ({img_w}x{img_h})"
        )));
    }

    // Content-dependent fills are computed from the unresized crop.
    let fill = resolve_fill(config.fill, img)?;

    let (target_h, target_w) = config.target;
    let scale = (target_w as f32 / img_w as f32).min(target_h as f32 / img_h as f32);
    // Extreme aspect ratios may round the short axis to zero pixels, which
    // the resampler cannot represent; keep at least one.
    let scaled_w = ((img_w as f32 * scale).round() as u32).max(1);
    let scaled_h = ((img_h as f32 * scale).round() as u32).max(1);

    let resized = imageops::resize(img, scaled_w, scaled_h, config.filter.into());
    pad_resolved(&resized, config.target, fill)
}

/// Center-pads an image to an exact shape without resizing it.
///
/// Padding on each axis is split as `(floor(pad / 2), ceil(pad / 2))`.
/// When called standalone with [`FillMode::ConstantMean`], the mean is
/// taken over the image passed in.
///
/// # Arguments
///
/// * `img` - The image to pad
/// * `target` - Target shape as `(height, width)`
/// * `fill` - Fill policy for the padded pixels
///
/// # Returns
///
/// An image of exactly `target`, or an error.
///
/// # Errors
///
/// Returns [`PipelineError::TargetTooSmall`] when `target` is smaller than
/// the image on either axis; padding never truncates.
pub fn pad_image(img: &RgbImage, target: (u32, u32), fill: FillMode) -> PipelineResult<RgbImage> {
    let fill = resolve_fill(fill, img)?;
    pad_resolved(img, target, fill)
}

fn pad_resolved(
    img: &RgbImage,
    target: (u32, u32),
    fill: ResolvedFill,
) -> PipelineResult<RgbImage> {
    let (img_w, img_h) = img.dimensions();
    let (target_h, target_w) = target;

    if img_w > target_w || img_h > target_h {
        return Err(PipelineError::TargetTooSmall {
            target_width: target_w,
            target_height: target_h,
            image_width: img_w,
            image_height: img_h,
        });
    }

    let pad_left = (target_w - img_w) / 2;
    let pad_top = (target_h - img_h) / 2;

    let padded = match fill {
        ResolvedFill::Constant(value) => {
            let mut out = RgbImage::from_pixel(target_w, target_h, Rgb([value, value, value]));
            imageops::replace(&mut out, img, pad_left as i64, pad_top as i64);
            out
        }
        ResolvedFill::Edge => RgbImage::from_fn(target_w, target_h, |x, y| {
            let src_x = (x as i64 - pad_left as i64).clamp(0, img_w as i64 - 1) as u32;
            let src_y = (y as i64 - pad_top as i64).clamp(0, img_h as i64 - 1) as u32;
            *img.get_pixel(src_x, src_y)
        }),
    };

    Ok(padded)
}
