//! AwesomeHub CLI: curate categorized lists from configurable sources.
//!
//! Processes a list definition into a deduplicated entry set with a derived
//! category tree, resolves every entry, and writes the result as JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
