//! CLI command implementations.

pub mod args;
pub mod clean;
pub mod output;

pub use args::Cli;
pub use output::Output;
