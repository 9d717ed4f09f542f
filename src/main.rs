//! # Splunk App Merger CLI
//!
//! Binary entry point for the `splunk-app-merger` command-line tool.
//!
//! It parses arguments with `clap`, dispatches to the selected command and
//! turns any error into a non-zero exit status. The merge logic itself lives
//! in the library crate; the binary only wires prompts, output and the run
//! log around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
