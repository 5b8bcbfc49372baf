//! Output formatting for the CLI.

use crate::error::Result;
use serde::Serialize;

/// Helper for progress and summary printing.
///
/// Progress lines go to stderr so stdout stays clean for the summary,
/// which is either human-readable text or JSON.
pub struct Output {
    json: bool,
    quiet: bool,
}

impl Output {
    pub fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    /// Print a progress message if not in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message);
        }
    }

    /// Print a warning message. Not suppressed by quiet mode.
    pub fn warn(&self, message: &str) {
        eprintln!("Warning: {}", message);
    }

    /// Print the run summary on stdout in the configured format.
    pub fn summary<T: Serialize + SummaryText>(&self, value: &T) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", value.to_text());
        }
        Ok(())
    }
}

/// Human-readable rendering for summary values.
pub trait SummaryText {
    fn to_text(&self) -> String;
}
