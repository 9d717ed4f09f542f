//! # Check Command
//!
//! Read-only preflight for a Splunk home. Reports what a merge run would
//! find before it changes anything:
//!
//! - whether `bin/splunk` is present,
//! - the state of both staging paths (missing, empty, or how many entries),
//! - backups left by earlier runs under `<splunk home>/tmp`.
//!
//! Exits non-zero when the Splunk home cannot be used for a merge.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use splunk_app_merger::defaults::suggested_splunk_home;
use splunk_app_merger::layout::{ClusterLayout, StagingPath};
use splunk_app_merger::output::OutputConfig;
use splunk_app_merger::stager::{inspect, PathState};

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Splunk home to inspect
    #[arg(long, value_name = "PATH", env = "SPLUNK_HOME")]
    pub splunk_home: Option<PathBuf>,
}

/// Findings for one staging path.
#[derive(Debug)]
struct StagingReport {
    staging: StagingPath,
    state: PathState,
    backup: Option<PathBuf>,
}

/// Everything `check` found.
#[derive(Debug)]
struct CheckReport {
    root: PathBuf,
    splunk_binary: PathBuf,
    binary_present: bool,
    staging: Vec<StagingReport>,
}

/// Execute the check command
pub fn execute(args: CheckArgs, color: &str) -> Result<()> {
    let output = OutputConfig::from_env_and_flag(color);
    let root = args
        .splunk_home
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(suggested_splunk_home);

    let layout = ClusterLayout::new(root)?;
    let report = collect(&layout)?;

    output.step(&format!("Splunk home: {}", report.root.display()));
    for line in describe(&report) {
        if line.needs_attention {
            output.warn(&line.text);
        } else {
            output.success(&line.text);
        }
    }

    if !report.binary_present {
        bail!(
            "{} not found; this is not a usable Splunk home",
            report.splunk_binary.display()
        );
    }
    Ok(())
}

fn collect(layout: &ClusterLayout) -> splunk_app_merger::error::Result<CheckReport> {
    let splunk_binary = layout.splunk_binary();
    let mut staging = Vec::new();
    for path in StagingPath::ALL {
        let backup = layout.backup_dir(path);
        staging.push(StagingReport {
            staging: path,
            state: inspect(&layout.staging_dir(path))?,
            backup: backup.exists().then_some(backup),
        });
    }

    Ok(CheckReport {
        root: layout.root().to_path_buf(),
        binary_present: splunk_binary.is_file(),
        splunk_binary,
        staging,
    })
}

struct Line {
    text: String,
    needs_attention: bool,
}

fn describe(report: &CheckReport) -> Vec<Line> {
    let mut lines = vec![if report.binary_present {
        Line {
            text: format!("Found {}", report.splunk_binary.display()),
            needs_attention: false,
        }
    } else {
        Line {
            text: format!("Missing {}", report.splunk_binary.display()),
            needs_attention: true,
        }
    }];

    for entry in &report.staging {
        lines.push(match entry.state {
            PathState::Missing => Line {
                text: format!("{}: not present", entry.staging),
                needs_attention: false,
            },
            PathState::Empty => Line {
                text: format!("{}: empty", entry.staging),
                needs_attention: false,
            },
            PathState::Populated { entries } => Line {
                text: format!(
                    "{}: {} existing entries (merge will ask to delete or back up)",
                    entry.staging, entries
                ),
                needs_attention: true,
            },
        });
        if let Some(backup) = &entry.backup {
            lines.push(Line {
                text: format!(
                    "Earlier backup at {}; a new backup of {} will be refused until it is moved",
                    backup.display(),
                    entry.staging
                ),
                needs_attention: true,
            });
        }
    }
    lines
}
