//! Workspace representation: the notes tree and the images directory.

use crate::error::{CleanupError, Result};
use crate::types::IMAGE_EXTENSIONS;
use glob::glob;
use std::path::{Path, PathBuf};

/// A working tree of markdown notes plus the directory their images live in.
///
/// All file discovery and raw I/O for the pipeline goes through here.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Root of the markdown notes tree.
    pub notes_root: PathBuf,
    /// Directory containing the image files.
    pub images_dir: PathBuf,
}

impl Workspace {
    /// Open a workspace, validating that both directories exist.
    pub fn open(notes_root: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Result<Self> {
        let notes_root = notes_root.into();
        let images_dir = images_dir.into();

        if !notes_root.is_dir() {
            return Err(CleanupError::Setup {
                path: notes_root,
                reason: "notes root does not exist or is not a directory".to_string(),
            });
        }
        if !images_dir.is_dir() {
            return Err(CleanupError::Setup {
                path: images_dir,
                reason: "images directory does not exist or is not a directory".to_string(),
            });
        }

        Ok(Self {
            notes_root,
            images_dir,
        })
    }

    /// Basename of the images directory, as it appears in markdown paths.
    pub fn images_dir_name(&self) -> String {
        self.images_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "uploads".to_string())
    }

    /// List all markdown files under the notes root, sorted.
    ///
    /// Hidden files and directories are skipped. Glob errors on individual
    /// entries are warnings, not failures.
    pub fn list_notes(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.notes_root.join("**/*.md");
        let pattern_str = pattern.to_string_lossy();

        let mut notes = Vec::new();

        for entry in glob(&pattern_str)? {
            match entry {
                Ok(path) => {
                    if let Ok(relative) = path.strip_prefix(&self.notes_root) {
                        if !relative
                            .components()
                            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
                        {
                            notes.push(path);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Warning: glob error: {}", e);
                }
            }
        }

        notes.sort();
        Ok(notes)
    }

    /// List all image files in the images directory, sorted.
    ///
    /// Matches by extension, case-insensitively. Non-recursive: the images
    /// directory is flat by contract.
    pub fn list_images(&self) -> Result<Vec<PathBuf>> {
        let mut images = Vec::new();

        for entry in std::fs::read_dir(&self.images_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image {
                images.push(path);
            }
        }

        images.sort();
        Ok(images)
    }

    /// Full path for an image filename inside the images directory.
    pub fn image_path(&self, filename: &str) -> PathBuf {
        self.images_dir.join(filename)
    }

    /// Delete a file, wrapping failures as `Write` errors so they stay
    /// per-item at the pipeline level.
    pub fn delete_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).map_err(|e| CleanupError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write bytes to a file, wrapping failures as `Write` errors.
    pub fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        std::fs::write(path, bytes).map_err(|e| CleanupError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
