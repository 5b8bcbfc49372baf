//! Note representation and operations.

use crate::error::Result;
use crate::parser::parse_image_refs;
use crate::types::ImageRef;
use std::path::{Path, PathBuf};

/// Represents a markdown note in the workspace.
#[derive(Debug, Clone)]
pub struct Note {
    /// Full path of the note file.
    pub path: PathBuf,

    /// Raw content of the note.
    pub content: String,
}

impl Note {
    /// Create a new note from path and content.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Load a note from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Save the note back to disk.
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, &self.content)?;
        Ok(())
    }

    /// Get the note name (filename without .md extension).
    pub fn name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// All image references in this note, in document order.
    pub fn image_refs(&self) -> Vec<ImageRef> {
        parse_image_refs(&self.content)
    }

    /// Whether this note mentions the given image filename anywhere.
    pub fn references(&self, filename: &str) -> bool {
        self.image_refs().iter().any(|r| r.filename == filename)
    }
}
