//! Raster image type and resampling.
//!
//! Every stage consumes a `RasterImage` by reference and returns a new one;
//! nothing is mutated in place. Images always carry 3 channels: RGBA buffers
//! are reduced to RGB when the image is constructed.

mod resize;
mod types;

pub use resize::{resize, RESIZE_FILTER};
pub use types::{RasterImage, RGBA_CHANNELS, RGB_CHANNELS};
