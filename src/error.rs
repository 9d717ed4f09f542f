//! # Error Handling
//!
//! This module defines the error type shared by every stage of a merge run.
//! It uses `thiserror` to keep the variants small and the messages readable
//! for an operator watching the terminal.
//!
//! The taxonomy is deliberately narrow:
//!
//! - **`Validation`**: operator input that cannot be used (missing paths,
//!   empty credentials, a source directory that collides with the output).
//! - **`Filesystem`**: a copy, remove or create step failed. Carries the
//!   operation and path so the log line is enough to find the problem.
//! - **`ExternalCommand`**: the distribution binary could not be started or
//!   exited with a non-zero status.
//! - **`Prompt`**: the terminal could not be read, typically because stdin
//!   is not a TTY.
//!
//! None of these are retried automatically. Once a mutating step has started
//! the run aborts and leaves the filesystem as it is for the operator to
//! inspect.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for splunk-app-merger operations
#[derive(Error, Debug)]
pub enum Error {
    /// Operator-supplied input was rejected.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A filesystem operation failed partway.
    #[error("Filesystem error: failed to {operation} '{}': {source}", path.display())]
    Filesystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The distribution binary failed to start or reported failure.
    #[error("External command failed: {command} ({}): {message}", status.map(|c| format!("exit status {}", c)).unwrap_or_else(|| "no exit status".to_string()))]
    ExternalCommand {
        command: String,
        status: Option<i32>,
        message: String,
    },

    /// Reading an answer from the terminal failed.
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for building a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for building a [`Error::Filesystem`] from an I/O failure.
    pub fn filesystem(operation: &str, path: &Path, source: std::io::Error) -> Self {
        Error::Filesystem {
            operation: operation.to_string(),
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true for errors the resolver may answer with a re-prompt.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
