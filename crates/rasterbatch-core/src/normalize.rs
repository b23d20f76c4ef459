//! Parameter normalization.
//!
//! Maps the bounded UI-level knobs of [`TransformParameters`] to the magnitudes
//! each stage consumes. Out-of-range input is rejected here, before any image
//! is touched; no output of this module is NaN or infinite.
//!
//! | knob                 | magnitude                                  |
//! |----------------------|--------------------------------------------|
//! | brightness_level     | factor `level / 50`                        |
//! | contrast_level       | factor `level / 50`                        |
//! | saturation_level     | offset `(level - 50) * 2`                  |
//! | noise_level          | sigma `level * 255 / 100`                  |
//! | shift_level          | fraction `level / 100` on both axes        |
//! | tilt_level           | shear angle in degrees                     |
//! | stretch_level        | scale range `1 -/+ level / 100`            |
//! | crop_size            | see [`CropMode`]                           |

use serde::{Deserialize, Serialize};

use crate::error::{Result, TransformError};
use crate::transform::CropMode;
use crate::TransformParameters;

/// Upper bound for resize targets, matching the parameter form limit.
pub const MAX_RESIZE_EDGE: u32 = 10_000;

/// Upper bound of all 0..=100 level knobs.
pub const MAX_LEVEL: u32 = 100;

/// Level at which brightness, contrast and saturation leave the image unchanged.
pub const NEUTRAL_LEVEL: u32 = 50;

/// Crop magnitude after normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropSpec {
    /// Fraction of each axis removed in total, split evenly between both sides.
    Trim { fraction: f64 },
    /// Edge length of a centered square window.
    Window { edge: u32 },
}

impl CropSpec {
    /// Whether the crop leaves the image unchanged regardless of its size.
    pub fn is_identity(&self) -> bool {
        matches!(self, CropSpec::Trim { fraction } if *fraction == 0.0)
    }
}

/// Closed interval `[1 - spread, 1 + spread]` of uniform scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    pub spread: f64,
}

impl ScaleRange {
    pub fn min(&self) -> f64 {
        1.0 - self.spread
    }

    pub fn max(&self) -> f64 {
        1.0 + self.spread
    }

    /// Scale factor at `position` (0 = min, 0.5 = exactly 1, 1 = max).
    pub fn at(&self, position: f64) -> f64 {
        1.0 + self.spread * (2.0 * position.clamp(0.0, 1.0) - 1.0)
    }

    pub fn is_identity(&self) -> bool {
        self.spread == 0.0
    }
}

/// How the scale stage picks a factor from its [`ScaleRange`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleStrategy {
    /// Fixed factor at `position` inside the range (0 = lower bound, 0.5 =
    /// midpoint, 1 = upper bound). Identical for every image.
    Deterministic { position: f64 },
    /// Factor drawn uniformly from the range per image, from a source seeded
    /// with `seed` and the image's batch index.
    Sampled { seed: u64 },
}

impl ScaleStrategy {
    /// Always picks the middle of the range, which is a scale of exactly 1.
    pub const MIDPOINT: ScaleStrategy = ScaleStrategy::Deterministic { position: 0.5 };
}

impl Default for ScaleStrategy {
    /// Upper bound of the range (`position: 1.0`), not [`ScaleStrategy::MIDPOINT`].
    ///
    /// The midpoint of every range is a factor of exactly 1, so a midpoint
    /// default would turn `stretch_level` into a no-op. With the upper bound a
    /// non-zero stretch enlarges the content by `1 + stretch/100`.
    fn default() -> Self {
        ScaleStrategy::Deterministic { position: 1.0 }
    }
}

/// Effective magnitudes for all ten stages.
#[derive(Debug, Clone, PartialEq)]
pub struct StageMagnitudes {
    pub resize_width: u32,
    pub resize_height: u32,
    pub rotation_degrees: f64,
    pub brightness_factor: f64,
    pub contrast_factor: f64,
    pub saturation_offset: f64,
    pub noise_sigma: f64,
    pub translate_fraction: f64,
    pub shear_degrees: f64,
    pub scale_range: ScaleRange,
    pub crop: CropSpec,
}

/// Validate and normalize a parameter record.
///
/// # Errors
///
/// * `TransformError::InvalidParameter` for any knob outside its declared range
/// * `TransformError::CropOutOfBounds` when a fixed-size crop exceeds the
///   resized dimensions
pub fn normalize(params: &TransformParameters, crop_mode: CropMode) -> Result<StageMagnitudes> {
    validate(params, crop_mode)?;

    let crop = match crop_mode {
        CropMode::PercentTrim => CropSpec::Trim {
            fraction: level_fraction(params.crop_size),
        },
        CropMode::FixedSize => CropSpec::Window {
            edge: params.crop_size,
        },
    };

    Ok(StageMagnitudes {
        resize_width: params.resize_width,
        resize_height: params.resize_height,
        rotation_degrees: params.rotation_angle_degrees,
        brightness_factor: params.brightness_level as f64 / NEUTRAL_LEVEL as f64,
        contrast_factor: params.contrast_level as f64 / NEUTRAL_LEVEL as f64,
        saturation_offset: (params.saturation_level as f64 - NEUTRAL_LEVEL as f64) * 2.0,
        noise_sigma: params.noise_level as f64 * 255.0 / 100.0,
        translate_fraction: level_fraction(params.shift_level),
        shear_degrees: params.tilt_level,
        scale_range: ScaleRange {
            spread: level_fraction(params.stretch_level),
        },
        crop,
    })
}

/// Check every knob against its declared range.
pub fn validate(params: &TransformParameters, crop_mode: CropMode) -> Result<()> {
    check_edge("resize_width", params.resize_width)?;
    check_edge("resize_height", params.resize_height)?;

    if !params.rotation_angle_degrees.is_finite() {
        return Err(TransformError::invalid(
            "rotation_angle_degrees",
            format!("must be finite, got {}", params.rotation_angle_degrees),
        ));
    }

    check_level("brightness_level", params.brightness_level)?;
    check_level("contrast_level", params.contrast_level)?;
    check_level("saturation_level", params.saturation_level)?;
    check_level("noise_level", params.noise_level)?;
    check_level("shift_level", params.shift_level)?;
    check_level("stretch_level", params.stretch_level)?;

    let tilt = params.tilt_level;
    if !tilt.is_finite() || !(0.0..=MAX_LEVEL as f64).contains(&tilt) {
        return Err(TransformError::invalid(
            "tilt_level",
            format!("must be in 0..=100 degrees, got {}", tilt),
        ));
    }

    match crop_mode {
        CropMode::PercentTrim => check_level("crop_size", params.crop_size)?,
        CropMode::FixedSize => {
            if params.crop_size == 0 {
                return Err(TransformError::invalid(
                    "crop_size",
                    "fixed-size crop must be at least 1",
                ));
            }
            if params.crop_size > params.resize_width || params.crop_size > params.resize_height {
                return Err(TransformError::CropOutOfBounds {
                    crop: params.crop_size,
                    width: params.resize_width,
                    height: params.resize_height,
                });
            }
        }
    }

    Ok(())
}

#[inline]
fn level_fraction(level: u32) -> f64 {
    level as f64 / 100.0
}

fn check_level(name: &'static str, value: u32) -> Result<()> {
    if value > MAX_LEVEL {
        return Err(TransformError::invalid(
            name,
            format!("must be in 0..=100, got {}", value),
        ));
    }
    Ok(())
}

fn check_edge(name: &'static str, value: u32) -> Result<()> {
    if value == 0 || value > MAX_RESIZE_EDGE {
        return Err(TransformError::invalid(
            name,
            format!("must be in 1..={}, got {}", MAX_RESIZE_EDGE, value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TransformParameters {
        TransformParameters::default()
    }

    #[test]
    fn test_neutral_magnitudes() {
        let m = normalize(&params(), CropMode::PercentTrim).unwrap();
        assert_eq!(m.brightness_factor, 1.0);
        assert_eq!(m.contrast_factor, 1.0);
        assert_eq!(m.saturation_offset, 0.0);
        assert_eq!(m.noise_sigma, 0.0);
        assert_eq!(m.translate_fraction, 0.0);
        assert_eq!(m.shear_degrees, 0.0);
        assert!(m.scale_range.is_identity());
        assert!(m.crop.is_identity());
    }

    #[test]
    fn test_extreme_magnitudes() {
        let mut p = params();
        p.brightness_level = 100;
        p.contrast_level = 0;
        p.saturation_level = 0;
        p.noise_level = 100;
        p.shift_level = 25;
        p.tilt_level = 15.0;
        p.stretch_level = 20;
        p.crop_size = 10;
        let m = normalize(&p, CropMode::PercentTrim).unwrap();

        assert_eq!(m.brightness_factor, 2.0);
        assert_eq!(m.contrast_factor, 0.0);
        assert_eq!(m.saturation_offset, -100.0);
        assert_eq!(m.noise_sigma, 255.0);
        assert_eq!(m.translate_fraction, 0.25);
        assert_eq!(m.shear_degrees, 15.0);
        assert!((m.scale_range.min() - 0.8).abs() < 1e-12);
        assert!((m.scale_range.max() - 1.2).abs() < 1e-12);
        assert_eq!(m.crop, CropSpec::Trim { fraction: 0.1 });
    }

    #[test]
    fn test_saturation_offset_upper_bound() {
        let mut p = params();
        p.saturation_level = 100;
        let m = normalize(&p, CropMode::PercentTrim).unwrap();
        assert_eq!(m.saturation_offset, 100.0);
    }

    #[test]
    fn test_level_out_of_range_rejected() {
        let mut p = params();
        p.noise_level = 101;
        let err = normalize(&p, CropMode::PercentTrim).unwrap_err();
        assert!(matches!(
            err,
            TransformError::InvalidParameter { name: "noise_level", .. }
        ));
    }

    #[test]
    fn test_resize_bounds_rejected() {
        let mut p = params();
        p.resize_width = 0;
        assert!(normalize(&p, CropMode::PercentTrim).is_err());

        let mut p = params();
        p.resize_height = MAX_RESIZE_EDGE + 1;
        assert!(normalize(&p, CropMode::PercentTrim).is_err());
    }

    #[test]
    fn test_non_finite_rotation_rejected() {
        let mut p = params();
        p.rotation_angle_degrees = f64::NAN;
        assert!(normalize(&p, CropMode::PercentTrim).is_err());
        p.rotation_angle_degrees = f64::INFINITY;
        assert!(normalize(&p, CropMode::PercentTrim).is_err());
    }

    #[test]
    fn test_rotation_outside_canonical_range_allowed() {
        let mut p = params();
        p.rotation_angle_degrees = -725.5;
        let m = normalize(&p, CropMode::PercentTrim).unwrap();
        assert_eq!(m.rotation_degrees, -725.5);
    }

    #[test]
    fn test_negative_tilt_rejected() {
        let mut p = params();
        p.tilt_level = -1.0;
        assert!(matches!(
            normalize(&p, CropMode::PercentTrim),
            Err(TransformError::InvalidParameter { name: "tilt_level", .. })
        ));
    }

    #[test]
    fn test_percent_crop_over_100_rejected() {
        let mut p = params();
        p.crop_size = 512;
        assert!(normalize(&p, CropMode::PercentTrim).is_err());
    }

    #[test]
    fn test_fixed_crop_within_bounds() {
        let mut p = params();
        p.resize_width = 300;
        p.resize_height = 200;
        p.crop_size = 200;
        let m = normalize(&p, CropMode::FixedSize).unwrap();
        assert_eq!(m.crop, CropSpec::Window { edge: 200 });
    }

    #[test]
    fn test_fixed_crop_out_of_bounds() {
        let mut p = params();
        p.resize_width = 300;
        p.resize_height = 200;
        p.crop_size = 201;
        assert_eq!(
            normalize(&p, CropMode::FixedSize).unwrap_err(),
            TransformError::CropOutOfBounds {
                crop: 201,
                width: 300,
                height: 200
            }
        );
    }

    #[test]
    fn test_fixed_crop_zero_rejected() {
        let mut p = params();
        p.crop_size = 0;
        assert!(matches!(
            normalize(&p, CropMode::FixedSize),
            Err(TransformError::InvalidParameter { name: "crop_size", .. })
        ));
    }

    #[test]
    fn test_scale_range_positions() {
        let range = ScaleRange { spread: 0.5 };
        assert_eq!(range.at(0.0), 0.5);
        assert_eq!(range.at(0.5), 1.0);
        assert_eq!(range.at(1.0), 1.5);
        assert_eq!(range.at(7.0), 1.5);
    }

    #[test]
    fn test_scale_strategy_default_is_upper_bound() {
        assert_eq!(
            ScaleStrategy::default(),
            ScaleStrategy::Deterministic { position: 1.0 }
        );

        let mut p = params();
        p.stretch_level = 30;
        let range = normalize(&p, CropMode::PercentTrim).unwrap().scale_range;
        let factor_at = |strategy: ScaleStrategy| match strategy {
            ScaleStrategy::Deterministic { position } => range.at(position),
            ScaleStrategy::Sampled { .. } => unreachable!(),
        };
        assert_eq!(factor_at(ScaleStrategy::MIDPOINT), 1.0);
        assert!((factor_at(ScaleStrategy::default()) - 1.3).abs() < 1e-12);
    }
}
