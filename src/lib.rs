//! # Splunk App Merger Library
//!
//! Merges Splunk app configuration through a Search Head Cluster deployer:
//! the operator's apps are staged into `etc/shcluster/apps`, the deployer's
//! `apply shcluster-bundle -action stage` expands them into
//! `var/run/splunk/deploy/apps`, and the result is collected into an
//! `apps_merged` directory next to the source.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use splunk_app_merger::bundle::{BundleInvoker, Credentials};
//! use splunk_app_merger::layout::ClusterLayout;
//! use splunk_app_merger::pipeline::{MergePipeline, MergePlan};
//! use splunk_app_merger::prompt::{StagingChoice, TerminalPrompter};
//! use splunk_app_merger::runlog::RunLog;
//!
//! # fn main() -> splunk_app_merger::error::Result<()> {
//! let log = RunLog::open(Path::new("splunk-app-merger.log"))?;
//! let layout = ClusterLayout::new("/opt/splunk")?;
//! let credentials = Credentials::new("admin", "changeme")?;
//! let plan = MergePlan::new(layout, PathBuf::from("/home/op/apps"), credentials)?;
//!
//! let prompter = TerminalPrompter::new();
//! let report = MergePipeline::new(plan, &prompter, BundleInvoker::new(), &log)
//!     .with_staging_policy(Some(StagingChoice::Backup))
//!     .run()?;
//! println!("merged into {}", report.output.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **`layout`**: every path a run touches, derived from the cluster root.
//! - **`stager`**: makes a staging path empty without losing unexpected
//!   content (delete or back up, as the operator chooses).
//! - **`copier`**: whole-directory replace-copy.
//! - **`bundle`**: credentials and the `splunk apply shcluster-bundle` call.
//! - **`cleanup`**: bundle artifact and staging directory removal.
//! - **`resolver`** and **`prompt`**: collecting and validating operator input.
//! - **`pipeline`**: the run state machine tying the steps together.
//! - **`runlog`**: the append-only run log passed to every component.

pub mod bundle;
pub mod cleanup;
pub mod copier;
pub mod defaults;
pub mod error;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod resolver;
pub mod runlog;
pub mod stager;

#[cfg(test)]
mod layout_proptest;
