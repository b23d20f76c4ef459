//! Folder session: remembers the last folder and the images loaded from it.

use std::path::{Path, PathBuf};

use log::info;

use crate::io::{check_folder, load_folder, LoadError, LoadedFolder};

/// Caller-held cache of one loaded folder.
///
/// Opening the same folder again returns the cached images without touching
/// the disk; a different folder triggers a fresh scan.
#[derive(Debug, Default)]
pub struct FolderSession {
    folder: Option<PathBuf>,
    loaded: LoadedFolder,
}

impl FolderSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Images of `dir`, loading them if `dir` is not the current folder.
    ///
    /// # Errors
    ///
    /// `LoadError::NotADirectory` or `LoadError::NoImages` when `dir` cannot
    /// be used. The session is reset in that case.
    pub fn open(&mut self, dir: &Path) -> Result<&LoadedFolder, LoadError> {
        if self.folder.as_deref() == Some(dir) {
            return Ok(&self.loaded);
        }

        if let Err(e) = check_folder(dir) {
            self.reset();
            return Err(e);
        }

        self.loaded = load_folder(dir);
        self.folder = Some(dir.to_path_buf());
        info!("loaded {} images from {}", self.loaded.len(), dir.display());
        Ok(&self.loaded)
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn loaded(&self) -> &LoadedFolder {
        &self.loaded
    }

    /// Forget the current folder so the next `open` rescans.
    pub fn reset(&mut self) {
        self.folder = None;
        self.loaded = LoadedFolder::default();
    }
}
