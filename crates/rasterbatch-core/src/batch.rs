//! Batch runner.
//!
//! Fans one [`Pipeline`] out over a slice of images with rayon. Images are
//! independent: each gets its own random sources keyed by its index, and the
//! output keeps the input order and length.
//!
//! Two failure policies are offered:
//! - [`BatchRunner::run`] reports per image; a failed image occupies an `Err`
//!   slot and never shifts or drops the others.
//! - [`BatchRunner::run_strict`] fails the whole batch with the first failing
//!   image (lowest index).

use log::{info, warn};
use rayon::prelude::*;

use crate::error::{BatchError, Result};
use crate::noise::RandomSource;
use crate::pipeline::{Pipeline, StageSources};
use crate::raster::RasterImage;

/// Runs a pipeline over batches of images.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    pipeline: Pipeline,
    parallel: bool,
}

impl BatchRunner {
    /// Runner that processes images in parallel.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            parallel: true,
        }
    }

    /// Process images one after another on the calling thread.
    ///
    /// Output is identical to the parallel mode.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Transform every image, one result slot per input.
    pub fn run(&self, images: &[RasterImage]) -> Vec<Result<RasterImage>> {
        self.run_with_sources(images, |index| self.pipeline.seeded_sources(index))
    }

    /// Like [`run`](Self::run), with the noise and scale sources of each image
    /// supplied by `make_sources(index)`.
    pub fn run_with_sources<F, R>(&self, images: &[RasterImage], make_sources: F) -> Vec<Result<RasterImage>>
    where
        F: Fn(usize) -> (R, R) + Sync,
        R: RandomSource,
    {
        let process = |(index, image): (usize, &RasterImage)| {
            let (mut noise, mut scale) = make_sources(index);
            let result = self.pipeline.apply_with_sources(
                image,
                &mut StageSources {
                    noise: &mut noise,
                    scale: &mut scale,
                },
            );
            if let Err(e) = &result {
                warn!("image {} failed: {}", index, e);
            }
            result
        };

        let results: Vec<Result<RasterImage>> = if self.parallel {
            images.par_iter().enumerate().map(process).collect()
        } else {
            images.iter().enumerate().map(process).collect()
        };

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            "batch finished: {} images, {} failed",
            results.len(),
            failed
        );
        results
    }

    /// Transform every image, or fail with the first image that errors.
    ///
    /// # Errors
    ///
    /// Returns a [`BatchError`] carrying the lowest failing index.
    pub fn run_strict(&self, images: &[RasterImage]) -> std::result::Result<Vec<RasterImage>, BatchError> {
        collect_strict(self.run(images))
    }

    /// Strict variant of [`run_with_sources`](Self::run_with_sources).
    pub fn run_strict_with_sources<F, R>(
        &self,
        images: &[RasterImage],
        make_sources: F,
    ) -> std::result::Result<Vec<RasterImage>, BatchError>
    where
        F: Fn(usize) -> (R, R) + Sync,
        R: RandomSource,
    {
        collect_strict(self.run_with_sources(images, make_sources))
    }
}

fn collect_strict(results: Vec<Result<RasterImage>>) -> std::result::Result<Vec<RasterImage>, BatchError> {
    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| result.map_err(|source| BatchError { index, source }))
        .collect()
}
