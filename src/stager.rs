//! # Directory Stager
//!
//! Makes a staging path safe to receive new content without silently
//! destroying what was there before.
//!
//! ## Contract
//!
//! - Missing or empty path: nothing happens.
//! - Non-empty path: the operator (or a preset `--on-existing` policy)
//!   chooses between deleting the content and backing it up under
//!   `<root>/tmp/<mangled path>` before it is removed.
//! - Failures are reported as they happen. Nothing is rolled back: if the
//!   backup copy succeeded but clearing the staging path failed, the backup
//!   stays in place and the next run finds the path non-empty again.
//!
//! A backup directory that already exists is never overwritten; the run
//! stops so the operator can move the earlier backup out of the way.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::copier::{clear_dir, copy_tree};
use crate::error::{Error, Result};
use crate::layout::{ClusterLayout, StagingPath};
use crate::prompt::{Prompter, StagingChoice};
use crate::runlog::RunLog;

/// What a path looks like before it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
    Missing,
    Empty,
    /// Holds this many top-level entries.
    Populated { entries: usize },
}

/// Result of preparing one staging path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingOutcome {
    /// The path did not exist.
    Missing,
    /// The path existed and was already empty.
    AlreadyEmpty,
    /// Existing content was deleted.
    Cleared { entries: usize },
    /// Existing content was copied to `backup`, then deleted.
    BackedUp { entries: usize, backup: PathBuf },
}

/// Inspects `path` without changing it.
///
/// A path that exists but is not a directory is an error: it can be neither
/// staged into nor safely removed.
pub fn inspect(path: &Path) -> Result<PathState> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PathState::Missing),
        Err(e) => return Err(Error::filesystem("inspect", path, e)),
    };
    if !meta.is_dir() {
        return Err(Error::filesystem(
            "inspect",
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let entries = fs::read_dir(path)
        .map_err(|e| Error::filesystem("read", path, e))?
        .count();
    Ok(match entries {
        0 => PathState::Empty,
        entries => PathState::Populated { entries },
    })
}

/// Empties a directory that has already been inspected; see [`clear_dir`].
pub type DirClearer = fn(&Path) -> Result<()>;

/// Prepares staging paths under one cluster root.
pub struct Stager<'a> {
    layout: &'a ClusterLayout,
    prompter: &'a dyn Prompter,
    policy: Option<StagingChoice>,
    clear: DirClearer,
    log: &'a RunLog,
}

impl<'a> Stager<'a> {
    /// Creates a stager that asks `prompter` about non-empty paths.
    pub fn new(layout: &'a ClusterLayout, prompter: &'a dyn Prompter, log: &'a RunLog) -> Self {
        Self {
            layout,
            prompter,
            policy: None,
            clear: clear_dir,
            log,
        }
    }

    /// Answers every non-empty path with `choice` instead of prompting.
    pub fn with_policy(mut self, choice: Option<StagingChoice>) -> Self {
        self.policy = choice;
        self
    }

    /// Replaces the step that empties a staging path.
    pub fn with_clearer(mut self, clear: DirClearer) -> Self {
        self.clear = clear;
        self
    }

    /// Guarantees `staging` is safe to use, per the module contract.
    pub fn prepare(&self, staging: StagingPath) -> Result<StagingOutcome> {
        let path = self.layout.staging_dir(staging);

        let entries = match inspect(&path)? {
            PathState::Missing => {
                self.log.debug(format!("{} does not exist, nothing to prepare", path.display()));
                return Ok(StagingOutcome::Missing);
            }
            PathState::Empty => {
                self.log.debug(format!("{} is empty, nothing to prepare", path.display()));
                return Ok(StagingOutcome::AlreadyEmpty);
            }
            PathState::Populated { entries } => entries,
        };

        self.log.warn(format!(
            "Staging path {} is not empty ({} entries)",
            path.display(),
            entries
        ));

        let choice = match self.policy {
            Some(choice) => choice,
            None => self.prompter.staging_choice(&path, entries)?,
        };
        self.log.info(format!("Chose to {} existing content of {}", choice, path.display()));

        match choice {
            StagingChoice::Delete => {
                (self.clear)(&path)?;
                self.log.info(format!("Deleted existing content of {}", path.display()));
                Ok(StagingOutcome::Cleared { entries })
            }
            StagingChoice::Backup => {
                let backup = self.layout.backup_dir(staging);
                self.back_up(&path, &backup)?;
                (self.clear)(&path)?;
                self.log.info(format!(
                    "Backed up {} to {} and cleared it",
                    path.display(),
                    backup.display()
                ));
                Ok(StagingOutcome::BackedUp { entries, backup })
            }
        }
    }

    fn back_up(&self, path: &Path, backup: &Path) -> Result<()> {
        if fs::symlink_metadata(backup).is_ok() {
            return Err(Error::filesystem(
                "back up into",
                backup,
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a previous backup is still there; move or remove it and run again",
                ),
            ));
        }
        let copied = copy_tree(path, backup)?;
        self.log.debug(format!("Copied {} files to {}", copied, backup.display()));
        Ok(())
    }
}
