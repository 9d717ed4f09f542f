//! Default values for splunk-app-merger.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::env;
use std::path::PathBuf;

/// Environment variable holding the Splunk installation directory.
pub const SPLUNK_HOME_ENV: &str = "SPLUNK_HOME";

/// Installation directory suggested when `SPLUNK_HOME` is unset.
pub const FALLBACK_SPLUNK_HOME: &str = "/opt/splunk";

/// Run log written to the working directory unless `--log-file` is given.
pub const DEFAULT_LOG_FILE: &str = "splunk-app-merger.log";

/// Name of the directory created next to the source directory.
pub const MERGED_DIR_NAME: &str = "apps_merged";

/// Directory under the cluster root that receives staging backups.
pub const BACKUP_DIR_NAME: &str = "tmp";

/// Files left in the deploy directory by `apply shcluster-bundle`.
pub const BUNDLE_ARTIFACT_PATTERN: &str = "*.bundle";

/// Returns the cluster root to suggest to the operator.
///
/// Uses `SPLUNK_HOME` when it is set and non-empty, otherwise
/// [`FALLBACK_SPLUNK_HOME`].
pub fn suggested_splunk_home() -> PathBuf {
    env::var_os(SPLUNK_HOME_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_SPLUNK_HOME))
}
