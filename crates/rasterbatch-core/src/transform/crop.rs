//! Final-stage cropping.
//!
//! Two explicit contracts are available through [`CropMode`], both fully
//! deterministic:
//!
//! - `PercentTrim`: `crop_size` is a percentage `p`. Each axis loses `p`% of
//!   its length in total, split evenly between the two sides. The result is
//!   `max(1, round(d * (1 - p/100)))` pixels along an axis of length `d`.
//! - `FixedSize`: `crop_size` is an edge length. A centered
//!   `crop_size x crop_size` window is extracted; it must fit the image.
//!
//! When the removed amount is odd, the extra pixel comes off the right
//! (or bottom) side.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::raster::RasterImage;

/// Interpretation of `crop_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropMode {
    /// `crop_size` is a percentage border trim in `0..=100`.
    #[default]
    PercentTrim,
    /// `crop_size` is the edge of a centered square window.
    FixedSize,
}

/// Copy the pixel rectangle at `(left, top)` of size `width x height`.
///
/// The rectangle must lie inside the image.
pub fn crop_region(image: &RasterImage, left: u32, top: u32, width: u32, height: u32) -> RasterImage {
    debug_assert!(left + width <= image.width && top + height <= image.height);

    // Fast path: full crop returns a clone
    if left == 0 && top == 0 && width == image.width && height == image.height {
        return image.clone();
    }

    let row_bytes = width as usize * 3;
    let mut output = Vec::with_capacity(row_bytes * height as usize);

    // Copy pixel data row by row for efficiency
    for y in 0..height {
        let src_row_start = ((top + y) as usize * image.width as usize + left as usize) * 3;
        output.extend_from_slice(&image.pixels[src_row_start..src_row_start + row_bytes]);
    }

    RasterImage::from_parts(width, height, output)
}

/// Kept length and leading offset for an axis of length `len` trimmed by `fraction`.
fn trim_axis(len: u32, fraction: f64) -> (u32, u32) {
    let kept = ((len as f64 * (1.0 - fraction)).round() as u32).clamp(1, len);
    ((len - kept) / 2, kept)
}

/// Remove `fraction` of each axis, split between opposite sides.
///
/// `fraction` is clamped to `[0, 1]`; the output is never smaller than 1x1.
pub fn apply_percent_trim(image: &RasterImage, fraction: f64) -> RasterImage {
    let fraction = fraction.clamp(0.0, 1.0);
    if fraction == 0.0 {
        return image.clone();
    }
    let (left, width) = trim_axis(image.width, fraction);
    let (top, height) = trim_axis(image.height, fraction);
    crop_region(image, left, top, width, height)
}

/// Extract the centered `edge x edge` window.
///
/// # Errors
///
/// Returns `TransformError::CropOutOfBounds` if `edge` is zero or exceeds
/// either dimension.
pub fn apply_center_crop(image: &RasterImage, edge: u32) -> Result<RasterImage> {
    if edge == 0 || edge > image.width || edge > image.height {
        return Err(TransformError::CropOutOfBounds {
            crop: edge,
            width: image.width,
            height: image.height,
        });
    }
    let left = (image.width - edge) / 2;
    let top = (image.height - edge) / 2;
    Ok(crop_region(image, left, top, edge, edge))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
