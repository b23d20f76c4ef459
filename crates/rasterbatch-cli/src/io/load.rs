//! Folder loading.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use rasterbatch_core::{RasterImage, TransformError};

/// File name suffixes treated as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{path} does not exist or is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("{path} contains no images")]
    NoImages { path: PathBuf },

    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unsupported image {path}: {source}")]
    Unsupported {
        path: PathBuf,
        #[source]
        source: TransformError,
    },
}

/// Images of one folder with their file names, in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedFolder {
    pub names: Vec<String>,
    pub images: Vec<RasterImage>,
}

impl LoadedFolder {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Sorted names of the image files directly inside `dir`.
fn image_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_image_name(name))
        .collect();
    names.sort();
    names
}

/// Check that `dir` is a directory holding at least one image file.
///
/// Only names are inspected; the files are not decoded.
pub fn check_folder(dir: &Path) -> Result<(), LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    if image_names(dir).is_empty() {
        return Err(LoadError::NoImages {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Decode one file into RGB.
pub fn load_image(path: &Path) -> Result<RasterImage, LoadError> {
    let img = image::open(path).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    RasterImage::from_dynamic(&img).map_err(|source| LoadError::Unsupported {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every image directly inside `dir`, sorted by file name.
///
/// A missing or unreadable directory yields an empty result. Files that fail
/// to decode are skipped with a warning.
pub fn load_folder(dir: &Path) -> LoadedFolder {
    let mut folder = LoadedFolder::default();
    for name in image_names(dir) {
        match load_image(&dir.join(&name)) {
            Ok(image) => {
                debug!("loaded {} ({}x{})", name, image.width(), image.height());
                folder.names.push(name);
                folder.images.push(image);
            }
            Err(e) => warn!("skipping {}", e),
        }
    }
    folder
}
