//! Shared types for mdimg.

use serde::{Deserialize, Serialize};

/// Image file extensions recognized on disk and in references.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "tiff", "tif"];

/// Whether a filename carries a recognized image extension.
pub fn has_image_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Syntax form of an image reference inside a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    /// Standard markdown image: `![alt](path)`.
    Markdown,
    /// Wiki-style embed or link: `![[file]]`, `[[file|alias]]`.
    Wiki,
}

/// One image reference occurrence found in a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// The raw path component as written in the note (e.g. "uploads/a.png").
    pub path: String,

    /// Basename of the path component; the key used for matching on disk.
    pub filename: String,

    /// Syntax form of the reference.
    pub kind: RefKind,

    /// Line number where the reference appears (1-indexed).
    pub line: usize,

    /// Byte offset of the reference in the note content.
    pub start: usize,

    /// Byte offset one past the end of the reference.
    pub end: usize,
}

/// Extracts the basename from a reference path, tolerating both `/` and `\`.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
