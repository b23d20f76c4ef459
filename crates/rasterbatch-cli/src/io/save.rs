//! Saving transformed images.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use rasterbatch_core::{RasterImage, TransformError};

/// Prepended to the source file name of every saved image.
pub const OUTPUT_PREFIX: &str = "transformed_";

const WRITE_PROBE: &str = ".rasterbatch-write-probe";

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no permission to write into {path}: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to save image to {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub fn output_name(source_name: &str) -> String {
    format!("{}{}", OUTPUT_PREFIX, source_name)
}

/// Create `dir` if needed and make sure files can be written into it.
pub fn prepare_output_dir(dir: &Path) -> Result<(), SaveError> {
    fs::create_dir_all(dir).map_err(|source| SaveError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let probe = dir.join(WRITE_PROBE);
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&probe)
        .map_err(|source| SaveError::NotWritable {
            path: dir.to_path_buf(),
            source,
        })?;
    // A leftover probe file is harmless
    let _ = fs::remove_file(&probe);
    Ok(())
}

/// Write one image; the format follows the file extension.
pub fn save_image(raster: &RasterImage, path: &Path) -> Result<(), SaveError> {
    let buffer = raster.to_rgb_image().ok_or_else(|| SaveError::Encode {
        path: path.to_path_buf(),
        source: image::ImageError::Parameter(image::error::ParameterError::from_kind(
            image::error::ParameterErrorKind::DimensionMismatch,
        )),
    })?;
    buffer.save(path).map_err(|source| SaveError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Save every successful slot of a batch as `transformed_<name>` in `dir`.
///
/// Failed slots are skipped. Returns the paths written, in batch order.
///
/// # Errors
///
/// Stops at the first directory or encoding failure.
pub fn save_batch(
    dir: &Path,
    names: &[String],
    results: &[Result<RasterImage, TransformError>],
) -> Result<Vec<PathBuf>, SaveError> {
    prepare_output_dir(dir)?;

    let mut written = Vec::with_capacity(results.len());
    for (name, result) in names.iter().zip(results) {
        match result {
            Ok(image) => {
                let path = dir.join(output_name(name));
                save_image(image, &path)?;
                written.push(path);
            }
            Err(e) => warn!("not saving {}: {}", name, e),
        }
    }
    info!("saved {} images to {}", written.len(), dir.display());
    Ok(written)
}
