//! Pipeline executor.
//!
//! A [`Pipeline`] is built once from a [`TransformParameters`] record: the
//! parameters are validated and normalized, and the ten stages are bound to
//! their magnitudes. The same pipeline is then applied to every image of a
//! batch, so normalization is never repeated per image.
//!
//! ## Stage Order
//! 1. Resize
//! 2. Rotate
//! 3. Brightness
//! 4. Contrast
//! 5. Hue/saturation
//! 6. Noise
//! 7. Translate
//! 8. Shear
//! 9. Scale
//! 10. Crop
//!
//! Shift and crop are therefore always relative to the resized dimensions.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::adjustments::{apply_brightness, apply_contrast, apply_hue_saturation, ContrastPivot};
use crate::error::{Result, TransformError};
use crate::noise::{apply_noise, RandomSource, SeededSource};
use crate::normalize::{normalize, CropSpec, ScaleRange, ScaleStrategy};
use crate::raster::{resize, RasterImage};
use crate::transform::{
    apply_center_crop, apply_percent_trim, apply_rotation, apply_scale, apply_shear,
    apply_translate, is_full_turn, CropMode, FillMode,
};
use crate::TransformParameters;

/// Number of stages in every pipeline.
pub const STAGE_COUNT: usize = 10;

/// Behavior choices that are not part of the numeric parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Edge fill for rotate, translate, shear and scale.
    pub fill: FillMode,
    /// Interpretation of `crop_size`.
    pub crop_mode: CropMode,
    /// How the scale stage picks its factor.
    pub scale: ScaleStrategy,
    /// Base seed of the per-image noise source.
    pub noise_seed: u64,
    /// Center of the contrast stretch.
    pub contrast_pivot: ContrastPivot,
}

/// One bound stage of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    Resize { width: u32, height: u32 },
    Rotate { degrees: f64, fill: FillMode },
    Brightness { factor: f64 },
    Contrast { factor: f64, pivot: ContrastPivot },
    HueSaturation { offset: f64 },
    Noise { sigma: f64 },
    Translate { fraction: f64, fill: FillMode },
    Shear { degrees: f64, fill: FillMode },
    Scale { range: ScaleRange, strategy: ScaleStrategy, fill: FillMode },
    Crop { spec: CropSpec },
}

/// Random sources handed to the stochastic stages of one image run.
pub struct StageSources<'a> {
    pub noise: &'a mut dyn RandomSource,
    pub scale: &'a mut dyn RandomSource,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Resize { .. } => "resize",
            Stage::Rotate { .. } => "rotate",
            Stage::Brightness { .. } => "brightness",
            Stage::Contrast { .. } => "contrast",
            Stage::HueSaturation { .. } => "hue_saturation",
            Stage::Noise { .. } => "noise",
            Stage::Translate { .. } => "translate",
            Stage::Shear { .. } => "shear",
            Stage::Scale { .. } => "scale",
            Stage::Crop { .. } => "crop",
        }
    }

    /// Whether the stage returns its input unchanged for every image.
    ///
    /// Resize depends on the input dimensions and is never reported as identity.
    pub fn is_identity(&self) -> bool {
        match *self {
            Stage::Resize { .. } => false,
            Stage::Rotate { degrees, .. } => is_full_turn(degrees),
            Stage::Brightness { factor } | Stage::Contrast { factor, .. } => factor == 1.0,
            Stage::HueSaturation { offset } => offset == 0.0,
            Stage::Noise { sigma } => sigma == 0.0,
            Stage::Translate { fraction, .. } => fraction == 0.0,
            Stage::Shear { degrees, .. } => degrees == 0.0,
            Stage::Scale { range, .. } => range.is_identity(),
            Stage::Crop { spec } => spec.is_identity(),
        }
    }

    /// Run this stage on one image.
    ///
    /// # Errors
    ///
    /// Fails when a random source fails or a fixed-size crop does not fit.
    pub fn apply(&self, image: &RasterImage, sources: &mut StageSources<'_>) -> Result<RasterImage> {
        let out = match *self {
            Stage::Resize { width, height } => resize(image, width, height)?,
            Stage::Rotate { degrees, fill } => apply_rotation(image, degrees, fill),
            Stage::Brightness { factor } => apply_brightness(image, factor),
            Stage::Contrast { factor, pivot } => apply_contrast(image, factor, pivot),
            Stage::HueSaturation { offset } => apply_hue_saturation(image, offset),
            Stage::Noise { sigma } => apply_noise(image, sigma, &mut *sources.noise)?,
            Stage::Translate { fraction, fill } => apply_translate(image, fraction, fill),
            Stage::Shear { degrees, fill } => apply_shear(image, degrees, fill),
            Stage::Scale {
                range,
                strategy,
                fill,
            } => {
                if range.is_identity() {
                    image.clone()
                } else {
                    let factor = match strategy {
                        ScaleStrategy::Deterministic { position } => range.at(position),
                        ScaleStrategy::Sampled { .. } => range.at(sources.scale.unit()?),
                    };
                    trace!("scale factor {:.4}", factor);
                    apply_scale(image, factor, fill)
                }
            }
            Stage::Crop { spec } => match spec {
                CropSpec::Trim { fraction } => apply_percent_trim(image, fraction),
                CropSpec::Window { edge } => apply_center_crop(image, edge)?,
            },
        };
        Ok(out)
    }
}

/// The ten stages bound to one parameter record.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: [Stage; STAGE_COUNT],
    options: PipelineOptions,
}

impl Pipeline {
    /// Validate `params`, normalize them and bind the stages.
    ///
    /// # Errors
    ///
    /// * `TransformError::InvalidParameter` for out-of-range knobs or a
    ///   deterministic scale position outside `[0, 1]`
    /// * `TransformError::CropOutOfBounds` for a fixed-size crop larger than
    ///   the resize target
    pub fn new(params: &TransformParameters, options: PipelineOptions) -> Result<Self> {
        if let ScaleStrategy::Deterministic { position } = options.scale {
            if !(0.0..=1.0).contains(&position) {
                return Err(TransformError::invalid(
                    "scale.position",
                    format!("must be in 0..=1, got {}", position),
                ));
            }
        }

        let m = normalize(params, options.crop_mode)?;
        let fill = options.fill;

        let stages = [
            Stage::Resize {
                width: m.resize_width,
                height: m.resize_height,
            },
            Stage::Rotate {
                degrees: m.rotation_degrees,
                fill,
            },
            Stage::Brightness {
                factor: m.brightness_factor,
            },
            Stage::Contrast {
                factor: m.contrast_factor,
                pivot: options.contrast_pivot,
            },
            Stage::HueSaturation {
                offset: m.saturation_offset,
            },
            Stage::Noise {
                sigma: m.noise_sigma,
            },
            Stage::Translate {
                fraction: m.translate_fraction,
                fill,
            },
            Stage::Shear {
                degrees: m.shear_degrees,
                fill,
            },
            Stage::Scale {
                range: m.scale_range,
                strategy: options.scale,
                fill,
            },
            Stage::Crop { spec: m.crop },
        ];

        let active: Vec<&str> = stages
            .iter()
            .filter(|s| !s.is_identity())
            .map(Stage::name)
            .collect();
        debug!("pipeline built, active stages: {}", active.join(", "));
        if params.is_neutral() {
            debug!("all stages after resize are neutral");
        }
        if !m.scale_range.is_identity() {
            debug!(
                "scale factors span {:.3}..={:.3}",
                m.scale_range.min(),
                m.scale_range.max()
            );
        }

        Ok(Self { stages, options })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Noise and scale sources for the image at position `index` of a batch.
    pub fn seeded_sources(&self, index: usize) -> (SeededSource, SeededSource) {
        let scale_seed = match self.options.scale {
            ScaleStrategy::Sampled { seed } => seed,
            ScaleStrategy::Deterministic { .. } => 0,
        };
        (
            SeededSource::for_image(self.options.noise_seed, index),
            SeededSource::for_image(scale_seed, index),
        )
    }

    /// Run all stages on the image at position `index` of a batch.
    ///
    /// Random sources are derived from the configured seeds and `index`, so the
    /// result depends only on the image, the pipeline and its position.
    pub fn apply(&self, image: &RasterImage, index: usize) -> Result<RasterImage> {
        let (mut noise, mut scale) = self.seeded_sources(index);
        self.apply_with_sources(
            image,
            &mut StageSources {
                noise: &mut noise,
                scale: &mut scale,
            },
        )
    }

    /// Run all stages with caller-supplied random sources.
    ///
    /// The input is never modified; each stage produces a new image.
    pub fn apply_with_sources(
        &self,
        image: &RasterImage,
        sources: &mut StageSources<'_>,
    ) -> Result<RasterImage> {
        let mut current = image.clone();
        for stage in &self.stages {
            trace!(
                "{} on {}x{} image",
                stage.name(),
                current.width(),
                current.height()
            );
            current = stage.apply(&current, sources)?;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::SeededSource;

    fn identity_params(width: u32, height: u32) -> TransformParameters {
        TransformParameters {
            resize_width: width,
            resize_height: height,
            ..TransformParameters::default()
        }
    }

    fn gradient(width: u32, height: u32) -> RasterImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 3) as u8, (y * 5) as u8, ((x + y) * 2) as u8]);
            }
        }
        RasterImage::new(width, height, pixels).unwrap()
    }

    /// Run the pipeline without the stages matching `skip`.
    fn run_skipping(
        pipeline: &Pipeline,
        image: &RasterImage,
        index: usize,
        skip: impl Fn(&Stage) -> bool,
    ) -> RasterImage {
        let mut noise = SeededSource::for_image(pipeline.options().noise_seed, index);
        let mut scale = SeededSource::for_image(0, index);
        let mut sources = StageSources {
            noise: &mut noise,
            scale: &mut scale,
        };
        pipeline
            .stages()
            .iter()
            .filter(|s| !skip(*s))
            .fold(image.clone(), |img, s| s.apply(&img, &mut sources).unwrap())
    }

    #[test]
    fn test_stage_order() {
        let pipeline = Pipeline::new(&TransformParameters::default(), PipelineOptions::default()).unwrap();
        let names: Vec<&str> = pipeline.stages().iter().map(Stage::name).collect();
        assert_eq!(
            names,
            [
                "resize",
                "rotate",
                "brightness",
                "contrast",
                "hue_saturation",
                "noise",
                "translate",
                "shear",
                "scale",
                "crop"
            ]
        );
    }

    #[test]
    fn test_neutral_parameters_bind_identity_stages() {
        let mut cases = vec![
            TransformParameters::default(),
            TransformParameters {
                rotation_angle_degrees: 360.0,
                resize_width: 20,
                ..TransformParameters::default()
            },
        ];
        for tweak in 0..4 {
            let mut p = TransformParameters::default();
            match tweak {
                0 => p.stretch_level = 10,
                1 => p.tilt_level = 0.5,
                2 => p.saturation_level = 51,
                _ => p.crop_size = 3,
            }
            cases.push(p);
        }

        for params in &cases {
            let pipeline = Pipeline::new(params, PipelineOptions::default()).unwrap();
            let after_resize_identity = pipeline.stages()[1..].iter().all(Stage::is_identity);
            assert_eq!(params.is_neutral(), after_resize_identity, "{:?}", params);
        }
    }

    #[test]
    fn test_neutral_pipeline_is_resize_only() {
        let img = gradient(40, 30);
        let pipeline = Pipeline::new(&identity_params(20, 15), PipelineOptions::default()).unwrap();
        let out = pipeline.apply(&img, 0).unwrap();
        assert_eq!(out, resize(&img, 20, 15).unwrap());
    }

    #[test]
    fn test_neutral_pipeline_with_trim_is_resize_then_crop() {
        let img = gradient(40, 30);
        let mut params = identity_params(40, 30);
        params.crop_size = 20;
        let pipeline = Pipeline::new(&params, PipelineOptions::default()).unwrap();
        let out = pipeline.apply(&img, 0).unwrap();
        assert_eq!(out, apply_percent_trim(&img, 0.2));
        assert_eq!(out.width(), 32);
        assert_eq!(out.height(), 24);
    }

    #[test]
    fn test_all_zero_scenario() {
        let img = RasterImage::filled(100, 100, [0, 0, 0]);
        let pipeline = Pipeline::new(&identity_params(50, 50), PipelineOptions::default()).unwrap();
        let out = pipeline.apply(&img, 0).unwrap();
        assert_eq!(out.width(), 50);
        assert_eq!(out.height(), 50);
        assert!(out.pixels().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_brightness_scenario() {
        let mut params = identity_params(50, 50);
        params.brightness_level = 100;
        let pipeline = Pipeline::new(&params, PipelineOptions::default()).unwrap();

        let out = pipeline.apply(&RasterImage::filled(100, 100, [100, 100, 100]), 0).unwrap();
        assert!(out.pixels().iter().all(|&v| v == 200));

        let out = pipeline.apply(&RasterImage::filled(100, 100, [200, 200, 200]), 0).unwrap();
        assert!(out.pixels().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_zero_noise_matches_skipped_noise() {
        let img = gradient(32, 32);
        let mut params = identity_params(24, 24);
        params.rotation_angle_degrees = 12.0;
        params.contrast_level = 70;
        params.shift_level = 5;
        params.stretch_level = 10;
        let options = PipelineOptions {
            scale: ScaleStrategy::Sampled { seed: 11 },
            ..PipelineOptions::default()
        };
        let pipeline = Pipeline::new(&params, options).unwrap();

        let mut noise = SeededSource::for_image(options.noise_seed, 0);
        let mut scale = SeededSource::for_image(11, 0);
        let with_noise = pipeline
            .apply_with_sources(
                &img,
                &mut StageSources {
                    noise: &mut noise,
                    scale: &mut scale,
                },
            )
            .unwrap();

        let mut noise = SeededSource::for_image(options.noise_seed, 0);
        let mut scale = SeededSource::for_image(11, 0);
        let mut sources = StageSources {
            noise: &mut noise,
            scale: &mut scale,
        };
        let skipped = pipeline
            .stages()
            .iter()
            .filter(|s| !matches!(s, Stage::Noise { .. }))
            .fold(img.clone(), |acc, s| s.apply(&acc, &mut sources).unwrap());

        assert_eq!(with_noise, skipped);
    }

    #[test]
    fn test_input_is_not_modified() {
        let img = gradient(16, 16);
        let copy = img.clone();
        let mut params = identity_params(16, 16);
        params.brightness_level = 80;
        params.noise_level = 30;
        let pipeline = Pipeline::new(&params, PipelineOptions::default()).unwrap();
        let _ = pipeline.apply(&img, 0).unwrap();
        assert_eq!(img, copy);
    }

    #[test]
    fn test_same_index_is_reproducible() {
        let img = gradient(20, 20);
        let mut params = identity_params(20, 20);
        params.noise_level = 40;
        params.stretch_level = 30;
        let options = PipelineOptions {
            scale: ScaleStrategy::Sampled { seed: 5 },
            noise_seed: 9,
            ..PipelineOptions::default()
        };
        let pipeline = Pipeline::new(&params, options).unwrap();
        assert_eq!(pipeline.apply(&img, 3).unwrap(), pipeline.apply(&img, 3).unwrap());
        assert_ne!(pipeline.apply(&img, 3).unwrap(), pipeline.apply(&img, 4).unwrap());
    }

    #[test]
    fn test_fixed_size_crop_output() {
        let img = gradient(64, 48);
        let mut params = identity_params(40, 30);
        params.crop_size = 16;
        let options = PipelineOptions {
            crop_mode: CropMode::FixedSize,
            ..PipelineOptions::default()
        };
        let pipeline = Pipeline::new(&params, options).unwrap();
        let out = pipeline.apply(&img, 0).unwrap();
        assert_eq!((out.width(), out.height()), (16, 16));
    }

    #[test]
    fn test_fixed_size_crop_out_of_bounds_fails_at_build() {
        let mut params = identity_params(40, 30);
        params.crop_size = 31;
        let options = PipelineOptions {
            crop_mode: CropMode::FixedSize,
            ..PipelineOptions::default()
        };
        assert!(matches!(
            Pipeline::new(&params, options),
            Err(TransformError::CropOutOfBounds { crop: 31, .. })
        ));
    }

    #[test]
    fn test_invalid_scale_position_rejected() {
        let options = PipelineOptions {
            scale: ScaleStrategy::Deterministic { position: 1.5 },
            ..PipelineOptions::default()
        };
        assert!(matches!(
            Pipeline::new(&TransformParameters::default(), options),
            Err(TransformError::InvalidParameter { name: "scale.position", .. })
        ));
    }

    #[test]
    fn test_midpoint_scale_is_identity() {
        let img = gradient(20, 20);
        let mut params = identity_params(20, 20);
        params.stretch_level = 40;
        let options = PipelineOptions {
            scale: ScaleStrategy::MIDPOINT,
            ..PipelineOptions::default()
        };
        let pipeline = Pipeline::new(&params, options).unwrap();
        assert_eq!(pipeline.apply(&img, 0).unwrap(), img);
    }

    #[test]
    fn test_deterministic_scale_ignores_index() {
        let img = gradient(20, 20);
        let mut params = identity_params(20, 20);
        params.stretch_level = 40;
        let pipeline = Pipeline::new(&params, PipelineOptions::default()).unwrap();
        assert_eq!(pipeline.apply(&img, 0).unwrap(), pipeline.apply(&img, 7).unwrap());
    }

    #[test]
    fn test_noise_failure_surfaces() {
        struct Broken;
        impl RandomSource for Broken {
            fn standard_normal(&mut self) -> Result<f64> {
                Err(TransformError::NoiseSourceFailure("broken".to_string()))
            }
            fn unit(&mut self) -> Result<f64> {
                Err(TransformError::NoiseSourceFailure("broken".to_string()))
            }
        }

        let mut params = identity_params(8, 8);
        params.noise_level = 10;
        let pipeline = Pipeline::new(&params, PipelineOptions::default()).unwrap();
        let err = pipeline
            .apply_with_sources(
                &gradient(8, 8),
                &mut StageSources {
                    noise: &mut Broken,
                    scale: &mut Broken,
                },
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::NoiseSourceFailure(_)));
    }

    #[test]
    fn test_rgba_input_produces_rgb_output() {
        let samples: Vec<u8> = (0..10 * 10 * 4).map(|i| (i % 251) as u8).collect();
        let img = RasterImage::from_samples(10, 10, 4, samples).unwrap();
        let mut params = identity_params(5, 5);
        params.saturation_level = 80;
        let pipeline = Pipeline::new(&params, PipelineOptions::default()).unwrap();
        let out = pipeline.apply(&img, 0).unwrap();
        assert_eq!(out.channels(), 3);
        assert_eq!(out.pixels().len(), 5 * 5 * 3);
    }

    #[test]
    fn test_skipping_identity_stages_changes_nothing() {
        let img = gradient(30, 30);
        let pipeline = Pipeline::new(&identity_params(30, 30), PipelineOptions::default()).unwrap();
        let full = pipeline.apply(&img, 0).unwrap();
        let skipped = run_skipping(&pipeline, &img, 0, Stage::is_identity);
        assert_eq!(full, skipped);
        assert_eq!(full, img);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn params_strategy() -> impl Strategy<Value = TransformParameters> {
        (
            (1u32..=24, 1u32..=24),
            0.0f64..360.0,
            (0u32..=100, 0u32..=100, 0u32..=100),
            (0u32..=100, 0u32..=100),
            (0.0f64..=100.0, 0u32..=100, 0u32..=100),
        )
            .prop_map(
                |(
                    (resize_width, resize_height),
                    rotation_angle_degrees,
                    (brightness_level, contrast_level, saturation_level),
                    (noise_level, shift_level),
                    (tilt_level, stretch_level, crop_size),
                )| TransformParameters {
                    resize_height,
                    resize_width,
                    rotation_angle_degrees,
                    brightness_level,
                    contrast_level,
                    saturation_level,
                    noise_level,
                    shift_level,
                    tilt_level,
                    stretch_level,
                    crop_size,
                },
            )
    }

    fn image_strategy() -> impl Strategy<Value = RasterImage> {
        (1u32..=20, 1u32..=20).prop_flat_map(|(w, h)| {
            proptest::collection::vec(any::<u8>(), (w * h * 3) as usize)
                .prop_map(move |pixels| RasterImage::new(w, h, pixels).unwrap())
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: Any valid parameter set produces a well-formed RGB image.
        #[test]
        fn prop_output_well_formed(
            img in image_strategy(),
            params in params_strategy(),
            sampled in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let options = PipelineOptions {
                scale: if sampled { ScaleStrategy::Sampled { seed } } else { ScaleStrategy::default() },
                noise_seed: seed,
                ..PipelineOptions::default()
            };
            let pipeline = Pipeline::new(&params, options).unwrap();
            let out = pipeline.apply(&img, 0).unwrap();

            let fraction = params.crop_size as f64 / 100.0;
            let expected = |d: u32| ((d as f64 * (1.0 - fraction)).round() as u32).max(1);
            prop_assert_eq!(out.width(), expected(params.resize_width));
            prop_assert_eq!(out.height(), expected(params.resize_height));
            prop_assert_eq!(out.channels(), 3);
            prop_assert_eq!(
                out.pixels().len(),
                out.width() as usize * out.height() as usize * 3
            );
        }

        /// Property: The pipeline is a pure function of image, parameters and index.
        #[test]
        fn prop_pipeline_deterministic(
            img in image_strategy(),
            params in params_strategy(),
            index in 0usize..16,
        ) {
            let pipeline = Pipeline::new(&params, PipelineOptions::default()).unwrap();
            prop_assert_eq!(pipeline.apply(&img, index).unwrap(), pipeline.apply(&img, index).unwrap());
        }
    }
}
