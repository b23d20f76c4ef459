//! Resampling to exact target dimensions.
//!
//! The kernel is fixed to bilinear (the `image` crate's `Triangle` filter) so the
//! pipeline output does not depend on a caller-selected filter.

use super::RasterImage;
use crate::error::{Result, TransformError};
use image::imageops::FilterType;

/// Interpolation kernel used by the resize stage.
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Resize an image to exact dimensions.
///
/// # Arguments
///
/// * `image` - The source image to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
///
/// # Returns
///
/// A new `RasterImage` with exactly the requested dimensions. When the source
/// already has them, the result is an unchanged copy.
///
/// # Errors
///
/// Returns `TransformError::InvalidParameter` if a target dimension is zero.
pub fn resize(image: &RasterImage, width: u32, height: u32) -> Result<RasterImage> {
    if width == 0 {
        return Err(TransformError::invalid("resize_width", "must be at least 1"));
    }
    if height == 0 {
        return Err(TransformError::invalid("resize_height", "must be at least 1"));
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image.to_rgb_image().ok_or_else(|| TransformError::UnsupportedImageFormat {
        channels: image.channels(),
        reason: "failed to create RgbImage".to_string(),
    })?;

    let resized = image::imageops::resize(&rgb_image, width, height, RESIZE_FILTER);
    let (out_w, out_h) = resized.dimensions();

    Ok(RasterImage::from_parts(out_w, out_h, resized.into_raw()))
}
