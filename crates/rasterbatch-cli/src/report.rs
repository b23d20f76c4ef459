//! Numbered per-image summary of a run.

use std::path::PathBuf;

use rasterbatch_core::{RasterImage, TransformError};

/// Outcome of one folder run, in batch order.
#[derive(Debug)]
pub struct RunSummary {
    pub names: Vec<String>,
    pub results: Vec<Result<RasterImage, TransformError>>,
    /// Files written, empty when no output directory was given.
    pub saved: Vec<PathBuf>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }

    /// One line per image, numbered from 1.
    pub fn lines(&self) -> Vec<String> {
        self.names
            .iter()
            .zip(&self.results)
            .enumerate()
            .map(|(i, (name, result))| match result {
                Ok(img) => format!("{:>3}. {} {}x{}", i + 1, name, img.width(), img.height()),
                Err(e) => format!("{:>3}. {} failed: {}", i + 1, name, e),
            })
            .collect()
    }
}
