//! # Cleanup Pass
//!
//! Removes what a merge run leaves behind under the cluster root once the
//! merged output has been collected: the bundle files written next to the
//! expanded apps, and both staging directories.
//!
//! Backups under `<root>/tmp` are never touched here.

use std::fs;
use std::io;
use std::path::PathBuf;

use glob::Pattern;

use crate::copier::remove_dir_if_exists;
use crate::defaults::BUNDLE_ARTIFACT_PATTERN;
use crate::error::{Error, Result};
use crate::layout::{ClusterLayout, StagingPath};
use crate::runlog::RunLog;

/// Deletes bundle files directly under `var/run/splunk/deploy/apps`.
///
/// Only regular files whose name matches [`BUNDLE_ARTIFACT_PATTERN`] are
/// removed; app directories and other files are left alone. A missing deploy
/// directory removes nothing. Returns the removed paths.
pub fn remove_bundle_artifacts(layout: &ClusterLayout, log: &RunLog) -> Result<Vec<PathBuf>> {
    let deploy = layout.staging_dir(StagingPath::DeployApps);
    let pattern = Pattern::new(BUNDLE_ARTIFACT_PATTERN).map_err(|e| {
        Error::filesystem("match", &deploy, io::Error::new(io::ErrorKind::InvalidInput, e))
    })?;

    let entries = match fs::read_dir(&deploy) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log.debug(format!("{} does not exist, no bundle files to remove", deploy.display()));
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::filesystem("read", &deploy, e)),
    };

    let mut removed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::filesystem("read", &deploy, e))?;
        let path = entry.path();
        let is_file = entry
            .file_type()
            .map_err(|e| Error::filesystem("inspect", &path, e))?
            .is_file();
        let matches = entry
            .file_name()
            .to_str()
            .map(|name| pattern.matches(name))
            .unwrap_or(false);
        if !is_file || !matches {
            continue;
        }

        fs::remove_file(&path).map_err(|e| Error::filesystem("remove", &path, e))?;
        log.info(format!("Removed bundle file {}", path.display()));
        removed.push(path);
    }

    removed.sort();
    Ok(removed)
}

/// Removes both staging directories. Absent directories are skipped.
pub fn remove_staging_dirs(layout: &ClusterLayout, log: &RunLog) -> Result<()> {
    for staging in StagingPath::ALL {
        let path = layout.staging_dir(staging);
        if remove_dir_if_exists(&path)? {
            log.info(format!("Removed staging directory {}", path.display()));
        } else {
            log.debug(format!("Staging directory {} already absent", path.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout_with_deploy(files: &[&str]) -> (TempDir, ClusterLayout) {
        let temp = TempDir::new().unwrap();
        let layout = ClusterLayout::new(temp.path()).unwrap();
        let deploy = layout.staging_dir(StagingPath::DeployApps);
        fs::create_dir_all(&deploy).unwrap();
        for file in files {
            fs::write(deploy.join(file), "x").unwrap();
        }
        (temp, layout)
    }

    #[test]
    fn test_removes_only_bundle_files() {
        let (_temp, layout) =
            layout_with_deploy(&["1700000000.bundle", "stage-42.bundle", "README.txt"]);
        let deploy = layout.staging_dir(StagingPath::DeployApps);
        fs::create_dir_all(deploy.join("myapp")).unwrap();

        let removed = remove_bundle_artifacts(&layout, &RunLog::discard()).unwrap();

        assert_eq!(
            removed,
            vec![deploy.join("1700000000.bundle"), deploy.join("stage-42.bundle")]
        );
        assert!(deploy.join("README.txt").exists());
        assert!(deploy.join("myapp").is_dir());
    }

    #[test]
    fn test_bundle_named_directory_is_kept() {
        let (_temp, layout) = layout_with_deploy(&[]);
        let dir = layout.staging_dir(StagingPath::DeployApps).join("odd.bundle");
        fs::create_dir_all(&dir).unwrap();

        let removed = remove_bundle_artifacts(&layout, &RunLog::discard()).unwrap();

        assert!(removed.is_empty());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_missing_deploy_dir_removes_nothing() {
        let temp = TempDir::new().unwrap();
        let layout = ClusterLayout::new(temp.path()).unwrap();
        let removed = remove_bundle_artifacts(&layout, &RunLog::discard()).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_remove_staging_dirs_is_best_effort() {
        let (_temp, layout) = layout_with_deploy(&["a.conf"]);

        remove_staging_dirs(&layout, &RunLog::discard()).unwrap();

        for staging in StagingPath::ALL {
            assert!(!layout.staging_dir(staging).exists());
        }
        assert!(layout.root().join("var/run/splunk/deploy").is_dir());
    }

    #[test]
    fn test_remove_staging_dirs_leaves_backups() {
        let (_temp, layout) = layout_with_deploy(&[]);
        let backup = layout.backup_dir(StagingPath::ShclusterApps);
        fs::create_dir_all(backup.join("oldapp")).unwrap();

        remove_staging_dirs(&layout, &RunLog::discard()).unwrap();

        assert!(backup.join("oldapp").is_dir());
    }
}
