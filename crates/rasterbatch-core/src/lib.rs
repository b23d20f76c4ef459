//! Rasterbatch Core - Batch image transformation library
//!
//! This crate provides the image transformation pipeline for Rasterbatch:
//! parameter normalization, the ten ordered stages (resize, rotate,
//! photometric adjustments, noise and geometric warps, crop) and a parallel
//! batch runner.

pub mod adjustments;
pub mod batch;
pub mod error;
pub mod noise;
pub mod normalize;
pub mod pipeline;
pub mod raster;
pub mod transform;

pub use adjustments::ContrastPivot;
pub use batch::BatchRunner;
pub use error::{BatchError, Result, TransformError};
pub use noise::{RandomSource, SeededSource};
pub use normalize::ScaleStrategy;
pub use pipeline::{Pipeline, PipelineOptions, Stage};
pub use raster::RasterImage;
pub use transform::{CropMode, FillMode};

/// User-facing knobs of one transformation run.
///
/// Levels are on a `0..=100` scale. Brightness, contrast and saturation are
/// neutral at 50; every other level is neutral at 0.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TransformParameters {
    /// Target height in pixels (1 to 10000)
    pub resize_height: u32,
    /// Target width in pixels (1 to 10000)
    pub resize_width: u32,
    /// Rotation in degrees, positive = counter-clockwise
    pub rotation_angle_degrees: f64,
    pub brightness_level: u32,
    pub contrast_level: u32,
    pub saturation_level: u32,
    pub noise_level: u32,
    /// Horizontal and vertical shift (0 to 100)
    pub shift_level: u32,
    /// Shear strength (0 to 100, fractional allowed)
    pub tilt_level: f64,
    /// Scale spread (0 to 100)
    pub stretch_level: u32,
    /// Percentage trim or window edge, see [`CropMode`]
    pub crop_size: u32,
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self {
            resize_height: 512,
            resize_width: 512,
            rotation_angle_degrees: 0.0,
            brightness_level: normalize::NEUTRAL_LEVEL,
            contrast_level: normalize::NEUTRAL_LEVEL,
            saturation_level: normalize::NEUTRAL_LEVEL,
            noise_level: 0,
            shift_level: 0,
            tilt_level: 0.0,
            stretch_level: 0,
            crop_size: 0,
        }
    }
}

impl TransformParameters {
    /// Create a new TransformParameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, see [`normalize::validate`].
    pub fn validate(&self, crop_mode: CropMode) -> Result<()> {
        normalize::validate(self, crop_mode)
    }

    /// Check if every stage after resize leaves its input unchanged
    pub fn is_neutral(&self) -> bool {
        let defaults = Self::default();
        Self {
            resize_height: defaults.resize_height,
            resize_width: defaults.resize_width,
            rotation_angle_degrees: if transform::is_full_turn(self.rotation_angle_degrees) {
                0.0
            } else {
                self.rotation_angle_degrees
            },
            ..self.clone()
        } == defaults
    }
}
