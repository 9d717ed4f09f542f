//! # Merge Command
//!
//! Runs one complete merge:
//!
//! 1. Resolve the Splunk home, the source app directory and the credentials
//!    (from flags and environment, prompting for anything missing).
//! 2. Hand the validated plan to the library pipeline, which prepares the
//!    staging paths, applies the cluster bundle and collects `apps_merged`.
//! 3. Print a short summary and point the operator at the run log.
//!
//! Every error ends the run with exit status 1 and is printed once, by the
//! binary's error handler. A bundle file that could not be removed does not
//! stop the run, but still fails it once the output has been collected.
//! Nothing is rolled back; the run log records how far the run got.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};

use splunk_app_merger::bundle::BundleInvoker;
use splunk_app_merger::defaults::{suggested_splunk_home, DEFAULT_LOG_FILE};
use splunk_app_merger::error::Result as MergeResult;
use splunk_app_merger::output::OutputConfig;
use splunk_app_merger::pipeline::{MergePipeline, MergePlan, RunReport};
use splunk_app_merger::prompt::{Prompter, StagingChoice, TerminalPrompter};
use splunk_app_merger::resolver::InputResolver;
use splunk_app_merger::runlog::RunLog;
use splunk_app_merger::stager::StagingOutcome;

/// What to do with staging paths that already hold content
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnExisting {
    /// Delete the existing content
    Delete,
    /// Copy the existing content under <splunk home>/tmp, then delete it
    Backup,
}

impl From<OnExisting> for StagingChoice {
    fn from(value: OnExisting) -> Self {
        match value {
            OnExisting::Delete => StagingChoice::Delete,
            OnExisting::Backup => StagingChoice::Backup,
        }
    }
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Splunk home of the deployer, offered for confirmation
    #[arg(long, value_name = "PATH", env = "SPLUNK_HOME")]
    pub splunk_home: Option<PathBuf>,

    /// Directory holding the apps to merge
    #[arg(short, long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Splunk user for `apply shcluster-bundle`
    #[arg(short, long, value_name = "USER", env = "SPLUNK_USERNAME")]
    pub username: Option<String>,

    /// Password for the Splunk user (prompted without echo when omitted)
    #[arg(long, value_name = "PASSWORD", env = "SPLUNK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Handle non-empty staging paths without asking
    #[arg(long, value_enum, value_name = "ACTION")]
    pub on_existing: Option<OnExisting>,

    /// Use the Splunk home without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Run log file (appended to)
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Suppress progress output except warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the merge command
pub fn execute(args: MergeArgs, color: &str) -> Result<()> {
    let started = Instant::now();
    let output = OutputConfig::from_env_and_flag(color).quiet(args.quiet);
    let log = RunLog::open(&args.log_file)?;
    log.info("Starting merge run");

    let prompter = TerminalPrompter::new();

    let plan = match resolve_plan(&args, &prompter, &log, &output) {
        Ok(plan) => plan,
        Err(e) => {
            log.error(format!("Merge failed before staging: {}", e));
            print_log_location(&output, &args.log_file);
            return Err(e.into());
        }
    };

    output.step(&format!(
        "Merging {} into {}",
        plan.source.display(),
        plan.output.display()
    ));

    let result = MergePipeline::new(plan, &prompter, BundleInvoker::new(), &log)
        .with_staging_policy(args.on_existing.map(StagingChoice::from))
        .run();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            print_log_location(&output, &args.log_file);
            return Err(e.into());
        }
    };

    print_summary(&output, &report, started);
    print_log_location(&output, &args.log_file);
    match report.artifact_error {
        None => Ok(()),
        Some(reason) => Err(anyhow!(
            "Merge finished but bundle files were not removed: {}",
            reason
        )),
    }
}

fn resolve_plan(
    args: &MergeArgs,
    prompter: &dyn Prompter,
    log: &RunLog,
    output: &OutputConfig,
) -> MergeResult<MergePlan> {
    let resolver = InputResolver::new(prompter, log);

    let suggested = args
        .splunk_home
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(suggested_splunk_home);
    let layout = resolver.cluster_root(&suggested, args.yes)?;

    if !layout.splunk_binary().is_file() {
        let message = format!(
            "{} not found; applying the bundle will fail",
            layout.splunk_binary().display()
        );
        log.warn(&message);
        output.warn(&message);
    }

    let source = resolver.source_dir(args.source.as_deref(), &layout)?;
    let credentials = resolver.credentials(args.username.as_deref(), args.password.as_deref())?;

    MergePlan::new(layout, source, credentials)
}

fn print_summary(output: &OutputConfig, report: &RunReport, started: Instant) {
    for (staging, outcome) in &report.staging {
        match outcome {
            StagingOutcome::BackedUp { backup, .. } => {
                output.success(&format!("Backed up {} to {}", staging, backup.display()))
            }
            StagingOutcome::Cleared { entries } => {
                output.success(&format!("Deleted {} entries from {}", entries, staging))
            }
            StagingOutcome::Missing | StagingOutcome::AlreadyEmpty => {}
        }
    }
    output.success(&format!(
        "Staged {} files, collected {} files into {}",
        report.files_staged,
        report.files_collected,
        report.output.display()
    ));
    output.success(&format!(
        "Finished in {} seconds",
        started.elapsed().as_secs()
    ));
}

fn print_log_location(output: &OutputConfig, log_file: &Path) {
    output.step(&format!("Run log: {}", log_file.display()));
}
