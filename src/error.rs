//! Error types and exit codes for mdimg.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const SETUP_ERROR: i32 = 2;
}

/// Main error type for mdimg operations.
///
/// `Setup` aborts the run; the per-item variants (`Decode`, `Encode`,
/// `Write`) are caught at the pipeline level, logged, and the run continues
/// with the next image.
#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("Setup error: {path}: {reason}")]
    Setup { path: PathBuf, reason: String },

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CleanupError {
    /// Returns the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CleanupError::Setup { .. } => exit_code::SETUP_ERROR,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

/// Result type alias for mdimg operations.
pub type Result<T> = std::result::Result<T, CleanupError>;
