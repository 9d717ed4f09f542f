//! # Merge Pipeline
//!
//! Drives one merge run through its fixed sequence of steps:
//!
//! 1.  **Prepare inputs**: make both staging paths safe to use (the stager
//!     may ask the operator about existing content).
//! 2.  **Stage**: replace-copy the source apps into `etc/shcluster/apps`.
//! 3.  **Apply bundle**: run `splunk apply shcluster-bundle`.
//! 4.  **Remove artifacts**: delete `*.bundle` files from the deploy path.
//! 5.  **Collect output**: replace-copy `var/run/splunk/deploy/apps` into
//!     `apps_merged` next to the source directory.
//! 6.  **Clean up**: remove both staging directories.
//!
//! The root is resolved before the pipeline is built, so a pipeline starts in
//! [`RunState::RootResolved`]. States only move forward. Any failure moves the
//! run to [`RunState::Aborted`] and stops it there: completed steps are not
//! undone, so staged content and backups stay on disk for inspection.
//!
//! The one exception is step 4. A bundle file that cannot be removed is
//! logged and recorded in [`RunReport::artifact_error`], and the run goes on
//! to collect the output and clean up. The caller decides the exit status.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::bundle::{BundleInvoker, Credentials};
use crate::cleanup::{remove_bundle_artifacts, remove_staging_dirs};
use crate::copier::replace_copy;
use crate::error::{Error, Result};
use crate::layout::{merged_output_dir, ClusterLayout, StagingPath};
use crate::prompt::{Prompter, StagingChoice};
use crate::resolver::check_source_against_layout;
use crate::runlog::RunLog;
use crate::stager::{Stager, StagingOutcome};

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    Init,
    RootResolved,
    InputsPrepared,
    Staged,
    BundleApplied,
    ArtifactsRemoved,
    OutputCollected,
    CleanedUp,
    Done,
    Aborted,
}

impl RunState {
    /// The state that follows this one on success. Terminal states have none.
    pub fn next(self) -> Option<RunState> {
        use RunState::*;
        match self {
            Init => Some(RootResolved),
            RootResolved => Some(InputsPrepared),
            InputsPrepared => Some(Staged),
            Staged => Some(BundleApplied),
            BundleApplied => Some(ArtifactsRemoved),
            ArtifactsRemoved => Some(OutputCollected),
            OutputCollected => Some(CleanedUp),
            CleanedUp => Some(Done),
            Done | Aborted => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Validated inputs of a run.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub layout: ClusterLayout,
    pub source: PathBuf,
    pub output: PathBuf,
    pub credentials: Credentials,
}

impl MergePlan {
    /// Builds a plan, deriving the output directory from `source`.
    ///
    /// Rejects a source that overlaps a staging path and a cluster root that
    /// sits inside the output directory.
    pub fn new(layout: ClusterLayout, source: PathBuf, credentials: Credentials) -> Result<Self> {
        check_source_against_layout(&source, &layout)?;
        let output = merged_output_dir(&source)?;
        Ok(Self {
            layout,
            source,
            output,
            credentials,
        })
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output: PathBuf,
    pub staging: Vec<(StagingPath, StagingOutcome)>,
    pub files_staged: u64,
    pub files_collected: u64,
    pub artifacts_removed: Vec<PathBuf>,
    /// Why removing bundle files failed, if it did.
    pub artifact_error: Option<String>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Backup directories created during the run.
    pub fn backups(&self) -> Vec<&Path> {
        self.staging
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                StagingOutcome::BackedUp { backup, .. } => Some(backup.as_path()),
                _ => None,
            })
            .collect()
    }

    /// True when every step, including bundle file removal, succeeded.
    pub fn is_clean(&self) -> bool {
        self.artifact_error.is_none()
    }
}

/// Removes bundle files from the deploy path; see [`remove_bundle_artifacts`].
pub type ArtifactRemover = fn(&ClusterLayout, &RunLog) -> Result<Vec<PathBuf>>;

/// Executes a [`MergePlan`].
pub struct MergePipeline<'a> {
    plan: MergePlan,
    prompter: &'a dyn Prompter,
    policy: Option<StagingChoice>,
    invoker: BundleInvoker,
    remove_artifacts: ArtifactRemover,
    log: &'a RunLog,
    state: RunState,
    last_completed: RunState,
}

impl<'a> MergePipeline<'a> {
    pub fn new(
        plan: MergePlan,
        prompter: &'a dyn Prompter,
        invoker: BundleInvoker,
        log: &'a RunLog,
    ) -> Self {
        Self {
            plan,
            prompter,
            policy: None,
            invoker,
            remove_artifacts: remove_bundle_artifacts,
            log,
            state: RunState::RootResolved,
            last_completed: RunState::RootResolved,
        }
    }

    /// Answers non-empty staging paths with `choice` instead of prompting.
    pub fn with_staging_policy(mut self, choice: Option<StagingChoice>) -> Self {
        self.policy = choice;
        self
    }

    /// Replaces the bundle file removal step.
    pub fn with_artifact_remover(mut self, remover: ArtifactRemover) -> Self {
        self.remove_artifacts = remover;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// The last state reached before the run finished or aborted.
    pub fn last_completed(&self) -> RunState {
        self.last_completed
    }

    pub fn plan(&self) -> &MergePlan {
        &self.plan
    }

    /// Runs every remaining step. A pipeline runs at most once.
    pub fn run(&mut self) -> Result<RunReport> {
        if self.state != RunState::RootResolved {
            return Err(Error::validation(format!(
                "Merge run already finished in state {}",
                self.state
            )));
        }

        let started = Instant::now();
        match self.execute(started) {
            Ok(report) => Ok(report),
            Err(e) => {
                self.log
                    .error(format!("Merge aborted after {}: {}", self.last_completed, e));
                self.state = RunState::Aborted;
                Err(e)
            }
        }
    }

    fn execute(&mut self, started: Instant) -> Result<RunReport> {
        let layout = self.plan.layout.clone();
        let log = self.log;

        let stager = Stager::new(&layout, self.prompter, log).with_policy(self.policy);
        let mut staging = Vec::with_capacity(StagingPath::ALL.len());
        for path in StagingPath::ALL {
            staging.push((path, stager.prepare(path)?));
        }
        self.advance(RunState::InputsPrepared);

        let shcluster_apps = layout.staging_dir(StagingPath::ShclusterApps);
        let files_staged = replace_copy(&self.plan.source, &shcluster_apps)?;
        log.info(format!(
            "Staged {} files from {} into {}",
            files_staged,
            self.plan.source.display(),
            shcluster_apps.display()
        ));
        self.advance(RunState::Staged);

        self.invoker.apply_bundle(&layout, &self.plan.credentials, log)?;
        self.advance(RunState::BundleApplied);

        let (artifacts_removed, artifact_error) = match (self.remove_artifacts)(&layout, log) {
            Ok(removed) => (removed, None),
            Err(e) => {
                log.error(format!("Could not remove bundle files: {}", e));
                (Vec::new(), Some(e.to_string()))
            }
        };
        self.advance(RunState::ArtifactsRemoved);

        let deploy_apps = layout.staging_dir(StagingPath::DeployApps);
        let files_collected = replace_copy(&deploy_apps, &self.plan.output)?;
        log.info(format!(
            "Collected {} files from {} into {}",
            files_collected,
            deploy_apps.display(),
            self.plan.output.display()
        ));
        self.advance(RunState::OutputCollected);

        remove_staging_dirs(&layout, log)?;
        self.advance(RunState::CleanedUp);

        let elapsed = started.elapsed();
        let finished = format!(
            "Merge finished in {} seconds, output in {}",
            elapsed.as_secs(),
            self.plan.output.display()
        );
        match &artifact_error {
            None => log.info(finished),
            Some(_) => log.warn(format!("{} (bundle files were left behind)", finished)),
        }
        self.advance(RunState::Done);

        Ok(RunReport {
            output: self.plan.output.clone(),
            staging,
            files_staged,
            files_collected,
            artifacts_removed,
            artifact_error,
            elapsed,
        })
    }

    fn advance(&mut self, to: RunState) {
        debug_assert_eq!(self.state.next(), Some(to), "run states only move forward");
        self.log.debug(format!("Run state {} -> {}", self.state, to));
        self.state = to;
        self.last_completed = to;
    }
}
