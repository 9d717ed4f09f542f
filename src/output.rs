//! # Terminal Output
//!
//! Operator-facing status lines for the CLI. Diagnostics and the run log go
//! through [`crate::runlog`]; this module only decides how the short summary
//! lines look.
//!
//! Color is decided once from the `--color` flag and the environment:
//! - `--color=always|never` wins outright.
//! - In `auto` mode, `NO_COLOR` (any value) or `CLICOLOR=0` or `TERM=dumb`
//!   turn color off, `CLICOLOR_FORCE=1` turns it on, and otherwise the
//!   `console` crate checks whether stdout is a color-capable terminal.

use std::env;

use console::style;

/// How status lines are rendered.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and symbols should be used.
    pub use_color: bool,
    /// Whether status lines are suppressed entirely.
    pub quiet: bool,
}

impl OutputConfig {
    /// Builds the configuration from the `--color` value and the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => detect_color_support(),
        };
        Self {
            use_color,
            quiet: false,
        }
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// A step that is about to run.
    pub fn step(&self, message: &str) {
        if !self.quiet {
            println!("{}", self.render(Status::Step, message));
        }
    }

    /// A step that finished.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{}", self.render(Status::Success, message));
        }
    }

    /// Something the operator should look at. Printed even when quiet.
    pub fn warn(&self, message: &str) {
        eprintln!("{}", self.render(Status::Warn, message));
    }

    fn render(&self, status: Status, message: &str) -> String {
        let (symbol, plain) = match status {
            Status::Step => ("→", "[..]"),
            Status::Success => ("✔", "[ok]"),
            Status::Warn => ("!", "[warn]"),
        };
        if !self.use_color {
            return format!("{} {}", plain, message);
        }
        let symbol = match status {
            Status::Step => style(symbol).cyan(),
            Status::Success => style(symbol).green(),
            Status::Warn => style(symbol).yellow(),
        };
        format!("{} {}", symbol.force_styling(true), message)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

#[derive(Debug, Clone, Copy)]
enum Status {
    Step,
    Success,
    Warn,
}

fn detect_color_support() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}
