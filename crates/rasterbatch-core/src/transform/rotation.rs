//! Canvas-preserving image rotation with bilinear interpolation.
//!
//! The image is rotated about its center and keeps its dimensions. Content
//! rotated past the edges is discarded, and the exposed corners are painted
//! according to the [`FillMode`].
//!
//! # Algorithm
//!
//! The rotation uses inverse mapping: for each pixel in the output image,
//! we calculate which source point it came from and interpolate there.
//!
//! For a rotation by θ about the center `(cx, cy)`, the inverse transform is:
//! ```text
//! src_x = (dst_x - cx) * cos(θ) - (dst_y - cy) * sin(θ) + cx
//! src_y = (dst_x - cx) * sin(θ) + (dst_y - cy) * cos(θ) + cy
//! ```

use super::affine::{warp_affine, Affine};
use super::sample::FillMode;
use crate::raster::RasterImage;

/// Whether a rotation by `angle_degrees` leaves the image unchanged.
///
/// True for exact multiples of 360 degrees, including 0.
pub fn is_full_turn(angle_degrees: f64) -> bool {
    angle_degrees % 360.0 == 0.0
}

/// Apply rotation to an image.
///
/// # Arguments
///
/// * `image` - Source image to rotate
/// * `angle_degrees` - Rotation angle in degrees (positive = counter-clockwise)
/// * `fill` - How to paint corners the rotated content no longer covers
///
/// # Returns
///
/// New `RasterImage` with the same dimensions as the source.
///
/// # Example
///
/// ```ignore
/// use rasterbatch_core::transform::{apply_rotation, FillMode};
///
/// let rotated = apply_rotation(&image, 15.0, FillMode::Replicate);
/// assert_eq!(rotated.width(), image.width());
/// ```
pub fn apply_rotation(image: &RasterImage, angle_degrees: f64, fill: FillMode) -> RasterImage {
    // Fast path: no rotation needed
    if is_full_turn(angle_degrees) {
        return image.clone();
    }

    let cx = image.width as f64 / 2.0;
    let cy = image.height as f64 / 2.0;
    warp_affine(image, &Affine::rotation_about(angle_degrees, cx, cy), fill)
}
