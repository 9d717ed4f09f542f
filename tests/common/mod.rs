//! Shared test utilities for integration and E2E tests.
//!
//! The central piece is [`ClusterFixture`]: a temporary directory holding a
//! fake Splunk home (`cluster/`) with a stub `bin/splunk`, and an operator
//! app directory (`apps/`) next to it.
//!
//! The stub stands in for `splunk apply shcluster-bundle -action stage`: it
//! records its arguments, copies `etc/shcluster/apps` into
//! `var/run/splunk/deploy/apps` and drops a `.bundle` file there, then exits
//! with the status the fixture was built with.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = ClusterFixture::new().with_app_file("myapp/default/app.conf", "[ui]\n");
//! fixture.merge_command().assert().success();
//! ```

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::{file_listing, ClusterFixture, DEPLOY_APPS, SHCLUSTER_APPS};
}

/// Staging path the apps are copied into.
pub const SHCLUSTER_APPS: &str = "etc/shcluster/apps";

/// Staging path the stub expands the bundle into.
pub const DEPLOY_APPS: &str = "var/run/splunk/deploy/apps";

/// Stub `bin/splunk`. `__EXIT__` is replaced with the exit status.
const STUB_SPLUNK: &str = r#"#!/bin/sh
root="$(cd "$(dirname "$0")/.." && pwd)"
printf '%s\n' "$@" > "$root/invocation.txt"
if [ "__EXIT__" -ne 0 ]; then
    exit __EXIT__
fi
mkdir -p "$root/var/run/splunk/deploy/apps"
cp -R "$root/etc/shcluster/apps/." "$root/var/run/splunk/deploy/apps/"
echo bundle > "$root/var/run/splunk/deploy/apps/1700000000.bundle"
exit 0
"#;

/// A fake Splunk home plus an operator app directory.
pub struct ClusterFixture {
    temp_dir: assert_fs::TempDir,
}

impl ClusterFixture {
    /// Creates the fixture with a stub `bin/splunk` that succeeds.
    pub fn new() -> Self {
        Self::with_bundle_exit(0)
    }

    /// Creates the fixture with a stub `bin/splunk` exiting with `code`.
    pub fn with_bundle_exit(code: i32) -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        fixture
            .temp_dir
            .child("apps")
            .create_dir_all()
            .expect("Failed to create apps directory");
        fixture.install_stub(code);
        fixture
    }

    /// Creates the fixture without any `bin/splunk`.
    pub fn without_binary() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        fixture
            .temp_dir
            .child("cluster")
            .create_dir_all()
            .expect("Failed to create cluster directory");
        fixture
            .temp_dir
            .child("apps")
            .create_dir_all()
            .expect("Failed to create apps directory");
        fixture
    }

    fn install_stub(&self, code: i32) {
        let stub = self.temp_dir.child("cluster/bin/splunk");
        stub.write_str(&STUB_SPLUNK.replace("__EXIT__", &code.to_string()))
            .expect("Failed to write stub splunk");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(stub.path(), std::fs::Permissions::from_mode(0o755))
                .expect("Failed to make stub executable");
        }
    }

    /// Adds a file under the operator's app directory.
    pub fn with_app_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child("apps")
            .child(path)
            .write_str(content)
            .expect("Failed to write app file");
        self
    }

    /// Adds a file under the Splunk home, e.g. pre-existing staging content.
    pub fn with_cluster_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child("cluster")
            .child(path)
            .write_str(content)
            .expect("Failed to write cluster file");
        self
    }

    /// The temporary directory holding everything.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The fake Splunk home.
    pub fn cluster_root(&self) -> PathBuf {
        self.temp_dir.path().join("cluster")
    }

    /// The operator's app directory.
    pub fn apps_dir(&self) -> PathBuf {
        self.temp_dir.path().join("apps")
    }

    /// Where the merged result lands.
    pub fn merged_dir(&self) -> PathBuf {
        self.temp_dir.path().join("apps_merged")
    }

    /// The run log written by [`ClusterFixture::merge_command`].
    pub fn log_file(&self) -> PathBuf {
        self.temp_dir.path().join("merge.log")
    }

    /// Arguments the stub `bin/splunk` received, one per line.
    pub fn invocation(&self) -> Option<Vec<String>> {
        std::fs::read_to_string(self.cluster_root().join("invocation.txt"))
            .ok()
            .map(|s| s.lines().map(str::to_string).collect())
    }

    /// A non-interactive `merge` command against this fixture.
    pub fn merge_command(&self) -> assert_cmd::Command {
        self.merge_command_for(&self.cluster_root(), &self.apps_dir(), "admin")
    }

    /// A non-interactive `merge` command with explicit home, source and user.
    pub fn merge_command_for(
        &self,
        splunk_home: &Path,
        source: &Path,
        username: &str,
    ) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("splunk-app-merger");
        cmd.current_dir(self.path())
            .env_remove("SPLUNK_HOME")
            .env_remove("SPLUNK_USERNAME")
            .env("SPLUNK_PASSWORD", "changeme")
            .env("NO_COLOR", "1")
            .arg("merge")
            .arg("--splunk-home")
            .arg(splunk_home)
            .arg("--source")
            .arg(source)
            .arg("--username")
            .arg(username)
            .arg("--yes")
            .arg("--log-file")
            .arg(self.log_file());
        cmd
    }
}

impl Default for ClusterFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Lists every file under `root` as sorted relative `/`-separated paths.
pub fn file_listing(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
