//! # Input Resolver
//!
//! Turns command-line values and operator answers into validated run inputs:
//! the cluster layout, the source app directory and the credentials.
//!
//! Each input has one validation function returning either the typed value
//! or [`Error::Validation`]. A value that came from the command line or the
//! environment is validated once and any problem is fatal. A value typed at
//! a prompt is validated the same way, but a validation failure is logged and
//! the question asked again. That retry loop lives only in
//! [`InputResolver::ask_until_valid`].
//!
//! All of this happens before any file under the cluster root is touched.

use std::path::{Path, PathBuf};

use crate::bundle::{validate_username, Credentials};
use crate::error::{Error, Result};
use crate::layout::{is_within, merged_output_dir, ClusterLayout, StagingPath};
use crate::prompt::Prompter;
use crate::runlog::RunLog;

/// Validates a source app directory and returns its absolute path.
pub fn validate_source_dir(raw: &Path) -> Result<PathBuf> {
    if raw.as_os_str().is_empty() {
        return Err(Error::validation("Source directory must not be empty"));
    }
    if !raw.exists() {
        return Err(Error::validation(format!(
            "Source directory does not exist: {}",
            raw.display()
        )));
    }
    if !raw.is_dir() {
        return Err(Error::validation(format!(
            "Source path is not a directory: {}",
            raw.display()
        )));
    }
    let source = raw
        .canonicalize()
        .map_err(|e| Error::filesystem("resolve", raw, e))?;
    merged_output_dir(&source)?;
    Ok(source)
}

/// Rejects a source directory that a run would overwrite or delete.
pub fn check_source_against_layout(source: &Path, layout: &ClusterLayout) -> Result<()> {
    for staging in StagingPath::ALL {
        let staging_dir = layout.staging_dir(staging);
        if is_within(source, &staging_dir) || is_within(&staging_dir, source) {
            return Err(Error::validation(format!(
                "Source directory {} overlaps staging path {}",
                source.display(),
                staging_dir.display()
            )));
        }
    }

    let output = merged_output_dir(source)?;
    if is_within(layout.root(), &output) {
        return Err(Error::validation(format!(
            "Splunk home {} lies inside the merge output {}, which is replaced on every run",
            layout.root().display(),
            output.display()
        )));
    }
    Ok(())
}

/// Collects run inputs from preset values and, where missing, from prompts.
pub struct InputResolver<'a> {
    prompter: &'a dyn Prompter,
    log: &'a RunLog,
}

impl<'a> InputResolver<'a> {
    pub fn new(prompter: &'a dyn Prompter, log: &'a RunLog) -> Self {
        Self { prompter, log }
    }

    /// Resolves the cluster root.
    ///
    /// With `assume_yes` the suggestion is used as-is. Otherwise the operator
    /// confirms it or types a different root, which is re-asked until valid.
    pub fn cluster_root(&self, suggested: &Path, assume_yes: bool) -> Result<ClusterLayout> {
        if assume_yes {
            let layout = ClusterLayout::new(suggested)?;
            self.log.info(format!("Using Splunk home {}", layout.root().display()));
            return Ok(layout);
        }

        let confirmed = self.prompter.confirm(
            &format!("Use Splunk home {}?", suggested.display()),
            true,
        )?;

        let layout = if confirmed {
            match ClusterLayout::new(suggested) {
                Ok(layout) => layout,
                Err(e) if e.is_validation() => {
                    self.log.warn(e.to_string());
                    self.ask_cluster_root(None)?
                }
                Err(e) => return Err(e),
            }
        } else {
            self.ask_cluster_root(Some(suggested))?
        };

        self.log.info(format!("Using Splunk home {}", layout.root().display()));
        Ok(layout)
    }

    fn ask_cluster_root(&self, default: Option<&Path>) -> Result<ClusterLayout> {
        let default = default.map(|p| p.display().to_string());
        self.ask_until_valid(
            || self.prompter.text("Splunk home", default.as_deref()),
            |raw| ClusterLayout::new(raw.trim()),
        )
    }

    /// Resolves the source app directory.
    pub fn source_dir(&self, preset: Option<&Path>, layout: &ClusterLayout) -> Result<PathBuf> {
        let validate = |raw: &Path| -> Result<PathBuf> {
            let source = validate_source_dir(raw)?;
            check_source_against_layout(&source, layout)?;
            Ok(source)
        };

        let source = match preset {
            Some(path) => validate(path)?,
            None => self.ask_until_valid(
                || self.prompter.text("Path to the apps directory to merge", None),
                |raw| validate(Path::new(raw.trim())),
            )?,
        };
        self.log.info(format!("Processing apps: {}", source.display()));
        Ok(source)
    }

    /// Resolves the credentials used for `-auth`.
    ///
    /// Only the username is logged.
    pub fn credentials(&self, username: Option<&str>, secret: Option<&str>) -> Result<Credentials> {
        let username = match username {
            Some(name) => validate_username(name)?,
            None => self.ask_until_valid(
                || self.prompter.text("Splunk username", None),
                validate_username,
            )?,
        };

        let credentials = match secret {
            Some(secret) => Credentials::new(&username, secret)?,
            None => self.ask_until_valid(
                || self.prompter.secret(&format!("Password for {}", username)),
                |raw| Credentials::new(&username, raw),
            )?,
        };

        self.log.info(format!("Authenticating as {}", credentials.username()));
        Ok(credentials)
    }

    /// Asks with `ask` until `validate` accepts the answer.
    ///
    /// Validation errors are logged and trigger another prompt. Any other
    /// error, including a failure to read the terminal, ends the loop.
    pub fn ask_until_valid<T>(
        &self,
        ask: impl Fn() -> Result<String>,
        validate: impl Fn(&str) -> Result<T>,
    ) -> Result<T> {
        loop {
            let raw = ask()?;
            match validate(&raw) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_validation() => self.log.warn(e.to_string()),
                Err(e) => return Err(e),
            }
        }
    }
}
