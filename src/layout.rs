//! # Cluster Layout
//!
//! Resolves every location a merge run reads or writes from a single
//! validated cluster root:
//!
//! - `etc/shcluster/apps`: where the deployer picks up apps to bundle.
//! - `var/run/splunk/deploy/apps`: where the staged bundle is expanded.
//! - `tmp/<mangled staging path>`: backups of pre-existing staging content.
//! - `bin/splunk`: the management binary.
//!
//! The merged output directory is not under the root; it sits next to the
//! operator's source directory (see [`merged_output_dir`]).

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::defaults::{BACKUP_DIR_NAME, MERGED_DIR_NAME};
use crate::error::{Error, Result};

/// One of the two fixed staging locations under the cluster root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingPath {
    /// `etc/shcluster/apps`
    ShclusterApps,
    /// `var/run/splunk/deploy/apps`
    DeployApps,
}

impl StagingPath {
    /// Both staging paths, in the order a run prepares them.
    pub const ALL: [StagingPath; 2] = [StagingPath::ShclusterApps, StagingPath::DeployApps];

    /// Path relative to the cluster root, always `/`-separated.
    pub fn relative(self) -> &'static str {
        match self {
            StagingPath::ShclusterApps => "etc/shcluster/apps",
            StagingPath::DeployApps => "var/run/splunk/deploy/apps",
        }
    }
}

impl fmt::Display for StagingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.relative())
    }
}

/// Turns a relative staging path into a single directory name.
///
/// `etc/shcluster/apps` becomes `etc_shcluster_apps`. Backslashes are
/// treated like slashes so the result is one path component everywhere.
pub fn mangle_relative_path(relative: &str) -> String {
    relative
        .trim_matches(|c| c == '/' || c == '\\')
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// All paths derived from a validated cluster root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterLayout {
    root: PathBuf,
}

impl ClusterLayout {
    /// Validates `root` and builds the layout.
    ///
    /// The root must exist and be a directory. A missing `bin/splunk` is not
    /// rejected here; the invoker reports it when the bundle is applied.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(Error::validation("Splunk home must not be empty"));
        }
        if !root.exists() {
            return Err(Error::validation(format!(
                "Splunk home does not exist: {}",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(Error::validation(format!(
                "Splunk home is not a directory: {}",
                root.display()
            )));
        }
        let root = root.canonicalize().map_err(|e| Error::filesystem("resolve", &root, e))?;
        Ok(Self { root })
    }

    /// The cluster root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a staging path.
    pub fn staging_dir(&self, staging: StagingPath) -> PathBuf {
        self.join_relative(staging.relative())
    }

    /// Where the content of `staging` is copied when the operator picks backup.
    pub fn backup_dir(&self, staging: StagingPath) -> PathBuf {
        self.root
            .join(BACKUP_DIR_NAME)
            .join(mangle_relative_path(staging.relative()))
    }

    /// The management binary, `<root>/bin/splunk`.
    pub fn splunk_binary(&self) -> PathBuf {
        self.root.join("bin").join("splunk")
    }

    fn join_relative(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

/// Returns `<parent of source>/apps_merged`.
///
/// Rejects a source without a parent, and a source that is itself named
/// `apps_merged`: the replace-copy into the output would delete it.
pub fn merged_output_dir(source: &Path) -> Result<PathBuf> {
    let parent = source.parent().ok_or_else(|| {
        Error::validation(format!(
            "Source directory has no parent to hold {}: {}",
            MERGED_DIR_NAME,
            source.display()
        ))
    })?;

    if source.file_name().map(|n| n == MERGED_DIR_NAME).unwrap_or(false) {
        return Err(Error::validation(format!(
            "Source directory must not be named {}; it is the merge output location",
            MERGED_DIR_NAME
        )));
    }

    Ok(parent.join(MERGED_DIR_NAME))
}

/// Returns true when `path` is `base` or lies somewhere below it.
///
/// Both paths are compared component-wise, so `apps2` is not inside `apps`.
pub fn is_within(path: &Path, base: &Path) -> bool {
    fn normal(p: &Path) -> Vec<Component<'_>> {
        p.components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    }
    let path = normal(path);
    let base = normal(base);
    path.len() >= base.len() && path[..base.len()] == base[..]
}
