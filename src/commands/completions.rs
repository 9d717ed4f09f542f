//! # Completions Command
//!
//! Prints a shell completion script for `splunk-app-merger` to stdout.
//!
//! ```bash
//! splunk-app-merger completions bash > ~/.local/share/bash-completion/completions/splunk-app-merger
//! splunk-app-merger completions zsh > ~/.zfunc/_splunk-app-merger
//! ```

use std::io::{self, Write};

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::{Cli, BIN_NAME};

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout())
}

fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
    out.flush()?;
    Ok(())
}
