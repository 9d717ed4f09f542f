//! # Content Copier
//!
//! Whole-directory replace-copy and the small removal helpers built on it.
//!
//! [`replace_copy`] is a full replace, not a merge: whatever was in the
//! destination before the call is gone afterwards. Both call sites rely on
//! this (staging the operator's apps, and collecting the distributed result
//! into `apps_merged`).
//!
//! The source is checked before the destination is removed. A typo in the
//! source path therefore fails the call without costing the operator the
//! previous contents of the destination.

use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Makes `destination` an exact copy of `source`.
///
/// Returns the number of files copied.
pub fn replace_copy(source: &Path, destination: &Path) -> Result<u64> {
    ensure_source_dir(source)?;

    remove_dir_if_exists(destination)?;
    let copied = copy_tree(source, destination)?;

    debug!(
        "Replaced {} with {} files from {}",
        destination.display(),
        copied,
        source.display()
    );
    Ok(copied)
}

/// Deep-copies the contents of `source` into `destination`.
///
/// `destination` and any missing parents are created. Existing files with the
/// same relative path are overwritten; other existing entries are left alone.
/// Symbolic links are followed and their targets copied.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<u64> {
    ensure_source_dir(source)?;

    fs::create_dir_all(destination).map_err(|e| Error::filesystem("create", destination, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|e| walk_error(source, e))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::filesystem("copy", entry.path(), io::Error::other(e)))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::filesystem("create", &target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::filesystem("create", parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| Error::filesystem("copy", entry.path(), e))?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Removes `path` recursively and recreates it as an empty directory.
pub fn clear_dir(path: &Path) -> Result<()> {
    remove_dir_if_exists(path)?;
    fs::create_dir_all(path).map_err(|e| Error::filesystem("create", path, e))
}

/// Removes `path` recursively. A path that is already absent is not an error.
///
/// Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::filesystem("remove", path, e)),
    }
}

fn ensure_source_dir(source: &Path) -> Result<()> {
    match fs::metadata(source) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::filesystem(
            "read",
            source,
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        )),
        Err(e) => Err(Error::filesystem("read", source, e)),
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
    Error::filesystem("read", &path, source)
}
