//! # Operator Prompts
//!
//! Every question the tool asks goes through the [`Prompter`] trait. The
//! binary uses [`TerminalPrompter`], which renders `dialoguer` prompts on the
//! controlling terminal. Tests supply scripted implementations so that the
//! resolver and stager can be exercised without a TTY.
//!
//! Prompters only collect raw answers. Deciding whether an answer is usable
//! and asking again belongs to [`crate::resolver`].

use std::fmt;
use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password, Select};

use crate::error::Result;

/// What to do with a staging path that already has content in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingChoice {
    /// Remove the existing content.
    Delete,
    /// Copy the existing content under `<root>/tmp` first, then remove it.
    Backup,
}

impl fmt::Display for StagingChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingChoice::Delete => f.write_str("delete"),
            StagingChoice::Backup => f.write_str("backup"),
        }
    }
}

/// Source of operator answers.
pub trait Prompter {
    /// Asks a yes/no question.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Asks for a line of text, pre-filled with `default` when given.
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Asks for a secret without echoing it.
    fn secret(&self, prompt: &str) -> Result<String>;

    /// Asks how to handle existing content in `path`.
    fn staging_choice(&self, path: &Path, entries: usize) -> Result<StagingChoice>;
}

/// [`Prompter`] backed by `dialoguer` on the current terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let answer = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(answer)
    }

    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn secret(&self, prompt: &str) -> Result<String> {
        let secret = Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()?;
        Ok(secret)
    }

    fn staging_choice(&self, path: &Path, entries: usize) -> Result<StagingChoice> {
        let choices = [StagingChoice::Delete, StagingChoice::Backup];
        let labels = [
            "delete  - remove the existing content".to_string(),
            "backup  - copy it under <splunk home>/tmp, then remove it".to_string(),
        ];
        let index = Select::with_theme(&self.theme)
            .with_prompt(format!(
                "{} already contains {} entr{}. What should happen to it?",
                path.display(),
                entries,
                if entries == 1 { "y" } else { "ies" }
            ))
            .items(&labels)
            .default(1)
            .interact()?;
        Ok(choices[index])
    }
}
