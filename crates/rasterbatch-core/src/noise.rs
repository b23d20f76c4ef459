//! Additive Gaussian noise and the injectable random sources behind it.
//!
//! Sources are created per image from a base seed and the image's batch index,
//! so a batch produces the same output no matter how rayon schedules it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

use crate::error::Result;
use crate::raster::RasterImage;

/// Supplier of random draws for the stochastic stages.
///
/// Implementations may fail, in which case the stage reports
/// `TransformError::NoiseSourceFailure`.
pub trait RandomSource {
    /// A sample from the standard normal distribution (mean 0, variance 1).
    fn standard_normal(&mut self) -> Result<f64>;

    /// A sample from the uniform distribution on `[0, 1)`.
    fn unit(&mut self) -> Result<f64>;
}

/// Infallible source backed by a seeded `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source for the image at `index` in a batch seeded with `base`.
    pub fn for_image(base: u64, index: usize) -> Self {
        Self::new(mix_seed(base, index as u64))
    }
}

impl RandomSource for SeededSource {
    fn standard_normal(&mut self) -> Result<f64> {
        let z: f64 = StandardNormal.sample(&mut self.rng);
        Ok(z)
    }

    fn unit(&mut self) -> Result<f64> {
        Ok(self.rng.random::<f64>())
    }
}

/// SplitMix64 finalizer over `base` and `index`.
///
/// Neighbouring indices map to unrelated seeds.
pub fn mix_seed(base: u64, index: u64) -> u64 {
    let mut z = base
        .wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Add zero-mean Gaussian noise with standard deviation `sigma` to every sample.
///
/// `sigma == 0` returns an exact copy without drawing from `source`.
///
/// # Errors
///
/// Propagates any failure of `source`.
pub fn apply_noise(image: &RasterImage, sigma: f64, source: &mut dyn RandomSource) -> Result<RasterImage> {
    if sigma == 0.0 {
        return Ok(image.clone());
    }

    let mut pixels = Vec::with_capacity(image.pixels.len());
    for &v in &image.pixels {
        let noisy = v as f64 + sigma * source.standard_normal()?;
        pixels.push(noisy.round().clamp(0.0, 255.0) as u8);
    }
    Ok(RasterImage::from_parts(image.width, image.height, pixels))
}
