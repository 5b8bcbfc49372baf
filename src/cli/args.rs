//! CLI argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mdimg")]
#[command(
    author,
    version,
    about = "Prune, compress and rename images referenced from markdown notes",
    long_about = None
)]
pub struct Cli {
    /// Directory containing the images
    #[arg(default_value = "uploads")]
    pub images_dir: PathBuf,

    /// Root of the markdown notes tree
    #[arg(long, default_value = ".")]
    pub notes_root: PathBuf,

    /// Show what would be done without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Keep original images after optimization
    #[arg(long)]
    pub keep_originals: bool,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Suppress per-file progress output
    #[arg(short, long)]
    pub quiet: bool,
}
