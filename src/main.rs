//! mdimg CLI entry point.

use clap::Parser;
use mdimg::cli::args::Cli;
use mdimg::cli::clean;
use mdimg::cli::output::Output;
use mdimg::error::exit_code;
use mdimg::workspace::Workspace;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(cli: &Cli) -> mdimg::error::Result<()> {
    let workspace = Workspace::open(&cli.notes_root, &cli.images_dir)?;
    let output = Output::new(cli.json, cli.quiet);

    if cli.dry_run {
        output.info("--- dry run: no changes will be made ---");
    }

    let summary = clean::run(&workspace, cli.dry_run, cli.keep_originals, &output)?;
    output.summary(&summary)?;

    Ok(())
}
