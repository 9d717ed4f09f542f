//! CLI argument parsing and command dispatch

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::commands;

/// Name of the installed binary.
pub const BIN_NAME: &str = "splunk-app-merger";

/// Splunk App Merger - merge app configuration through a SHC deployer bundle
#[derive(Parser, Debug)]
#[command(name = "splunk-app-merger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Console log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stage apps, apply the cluster bundle and collect the merged result
    Merge(commands::merge::MergeArgs),

    /// Inspect a Splunk home without changing anything
    Check(commands::check::CheckArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;

        match self.command {
            Commands::Merge(args) => commands::merge::execute(args, &self.color),
            Commands::Check(args) => commands::check::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Sends `log` records to stderr at the requested level.
fn init_logging(level: &str) -> Result<()> {
    let filter: LevelFilter = level.parse().map_err(|_| {
        anyhow!(
            "Invalid log level '{}'. Expected one of: off, error, warn, info, debug, trace",
            level
        )
    })?;

    // A logger may already be installed when commands run inside tests.
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .format_target(false)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_init_logging_rejects_unknown_level() {
        assert!(init_logging("loud").is_err());
        assert!(init_logging("debug").is_ok());
    }

    #[test]
    fn test_parse_merge_flags() {
        let cli = Cli::try_parse_from([
            BIN_NAME,
            "merge",
            "--splunk-home",
            "/opt/splunk",
            "--source",
            "/home/op/apps",
            "--username",
            "admin",
            "--on-existing",
            "backup",
            "--yes",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Merge(_)));
    }
}
