//! mdimg - cleanup and optimization of images referenced from markdown notes.
//!
//! # Overview
//!
//! mdimg runs a three-stage batch pipeline over a notes tree and its images
//! directory:
//! 1. Scan all markdown notes and collect the set of referenced image
//!    filenames.
//! 2. Delete images no note references.
//! 3. Re-encode each referenced image as a JPEG under a 1 MiB budget, name
//!    it `{note-stem}-{content-hash}.jpg`, rewrite the references, and
//!    remove the original.
//!
//! # Example
//!
//! ```no_run
//! use mdimg::cli::clean;
//! use mdimg::cli::output::Output;
//! use mdimg::workspace::Workspace;
//!
//! let workspace = Workspace::open(".", "uploads").unwrap();
//! let output = Output::new(false, false);
//! let summary = clean::run(&workspace, true, false, &output).unwrap();
//! println!("{} images would be optimized", summary.optimized);
//! ```

pub mod cli;
pub mod error;
pub mod note;
pub mod optimize;
pub mod parser;
pub mod rewrite;
pub mod scan;
pub mod types;
pub mod workspace;

// Re-export main types at crate root
pub use error::{CleanupError, Result};
pub use note::Note;
pub use scan::{ReferenceSet, Scan};
pub use types::{ImageRef, RefKind};
pub use workspace::Workspace;
