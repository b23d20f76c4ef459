//! Geometric stages: rotation, translate, shear, scale and crop.
//!
//! All warps keep the canvas size of their input; only the crop stage changes
//! dimensions. Pixels that no source content maps to are painted according to
//! an explicit [`FillMode`] rather than a library default.
//!
//! # Coordinate System
//!
//! - Rotation angles are in degrees, positive = counter-clockwise
//! - Origin is the top-left corner, y points down
//! - Pixel `(i, j)` covers the unit square starting at `(i, j)`

mod affine;
mod crop;
mod rotation;
mod sample;

pub use affine::{apply_scale, apply_shear, apply_translate, warp_affine, Affine};
pub use crop::{apply_center_crop, apply_percent_trim, crop_region, CropMode};
pub use rotation::{apply_rotation, is_full_turn};
pub use sample::{sample_bilinear, FillMode};
