//! # Bundle Invoker
//!
//! Triggers the Search Head Cluster app distribution for whatever is
//! currently staged under `etc/shcluster/apps`:
//!
//! ```text
//! <root>/bin/splunk apply shcluster-bundle --answer-yes -action stage -auth <user>:<secret>
//! ```
//!
//! Process execution sits behind the [`CommandRunner`] trait. The system
//! implementation discards the child's output and reports only its exit
//! status; tests inject runners that never spawn anything.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};
use crate::layout::ClusterLayout;
use crate::runlog::RunLog;

/// Username and secret passed to `-auth`.
///
/// The secret is never printed: `Debug` redacts it and the only way to read
/// it is [`Credentials::auth_argument`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    /// Validates and builds credentials.
    ///
    /// Both parts must be non-empty, and the username may not contain `:`
    /// because `-auth` splits on the first colon.
    pub fn new(username: &str, secret: impl Into<String>) -> Result<Self> {
        let username = validate_username(username)?;
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::validation("Password must not be empty"));
        }
        Ok(Self { username, secret })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The `<user>:<secret>` value for `-auth`.
    pub fn auth_argument(&self) -> String {
        format!("{}:{}", self.username, self.secret)
    }
}

/// Trims `raw` and checks it can be used as the user part of `-auth`.
pub fn validate_username(raw: &str) -> Result<String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(Error::validation("Username must not be empty"));
    }
    if username.contains(':') {
        return Err(Error::validation("Username must not contain ':'"));
    }
    Ok(username.to_string())
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"********")
            .finish()
    }
}

/// Exit information of an external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalCommandResult {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_status: Option<i32>,
}

impl ExternalCommandResult {
    pub fn success(&self) -> bool {
        self.exit_status == Some(0)
    }
}

/// Runs an external program to completion.
pub trait CommandRunner {
    /// Runs `program` with `args` and waits for it to exit.
    ///
    /// An `Err` means the program could not be started at all.
    fn run(&self, program: &Path, args: &[String]) -> std::io::Result<ExternalCommandResult>;
}

/// [`CommandRunner`] that spawns real processes with output discarded.
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &Path, args: &[String]) -> std::io::Result<ExternalCommandResult> {
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        Ok(ExternalCommandResult {
            exit_status: status.code(),
        })
    }
}

/// Builds the fixed argument vector for staging a bundle.
pub fn bundle_args(credentials: &Credentials) -> Vec<String> {
    [
        "apply",
        "shcluster-bundle",
        "--answer-yes",
        "-action",
        "stage",
        "-auth",
    ]
    .iter()
    .map(|s| s.to_string())
    .chain(std::iter::once(credentials.auth_argument()))
    .collect()
}

/// Command line safe to show in logs and errors.
fn display_command(program: &Path, credentials: &Credentials) -> String {
    format!(
        "{} apply shcluster-bundle --answer-yes -action stage -auth {}:********",
        program.display(),
        credentials.username()
    )
}

/// Applies the cluster bundle through a [`CommandRunner`].
pub struct BundleInvoker {
    runner: Box<dyn CommandRunner>,
}

impl BundleInvoker {
    /// Invoker that spawns the real `splunk` binary.
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemCommandRunner))
    }

    /// Invoker using a custom runner.
    pub fn with_runner(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Runs `apply shcluster-bundle` against the cluster root.
    ///
    /// Fails with [`Error::ExternalCommand`] if the binary cannot be started
    /// or exits non-zero. Nothing already staged is undone.
    pub fn apply_bundle(
        &self,
        layout: &ClusterLayout,
        credentials: &Credentials,
        log: &RunLog,
    ) -> Result<ExternalCommandResult> {
        let program: PathBuf = layout.splunk_binary();
        let shown = display_command(&program, credentials);
        log.info(format!("Running {}", shown));

        let result = self
            .runner
            .run(&program, &bundle_args(credentials))
            .map_err(|e| Error::ExternalCommand {
                command: shown.clone(),
                status: None,
                message: format!("could not start: {}", e),
            })?;

        if !result.success() {
            let message = match result.exit_status {
                Some(code) => format!("bundle staging exited with status {}", code),
                None => "bundle staging was terminated by a signal".to_string(),
            };
            log.error(format!("{}: {}", shown, message));
            return Err(Error::ExternalCommand {
                command: shown,
                status: result.exit_status,
                message,
            });
        }

        log.info("Cluster bundle staged successfully");
        Ok(result)
    }
}

impl Default for BundleInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runlog::capture::captured_log;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    type Calls = Rc<RefCell<Vec<(PathBuf, Vec<String>)>>>;
    type Outcome = std::result::Result<Option<i32>, std::io::ErrorKind>;

    struct FakeRunner {
        outcome: Outcome,
        calls: Calls,
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &Path, args: &[String]) -> std::io::Result<ExternalCommandResult> {
            self.calls
                .borrow_mut()
                .push((program.to_path_buf(), args.to_vec()));
            match self.outcome {
                Ok(exit_status) => Ok(ExternalCommandResult { exit_status }),
                Err(kind) => Err(std::io::Error::new(kind, "spawn failed")),
            }
        }
    }

    fn invoker(outcome: Outcome) -> (BundleInvoker, Calls) {
        let calls: Calls = Rc::default();
        let runner = FakeRunner {
            outcome,
            calls: calls.clone(),
        };
        (BundleInvoker::with_runner(Box::new(runner)), calls)
    }

    fn creds() -> Credentials {
        Credentials::new("admin", "changeme").unwrap()
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new("", "secret").unwrap_err().is_validation());
        assert!(Credentials::new("   ", "secret").is_err());
        assert!(Credentials::new("ad:min", "secret").is_err());
        assert!(Credentials::new("admin", "").is_err());
        assert_eq!(Credentials::new(" admin ", "s").unwrap().username(), "admin");
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let debug = format!("{:?}", creds());
        assert!(debug.contains("admin"));
        assert!(!debug.contains("changeme"));
    }

    #[test]
    fn test_bundle_args() {
        assert_eq!(
            bundle_args(&creds()),
            vec![
                "apply",
                "shcluster-bundle",
                "--answer-yes",
                "-action",
                "stage",
                "-auth",
                "admin:changeme"
            ]
        );
    }

    #[test]
    fn test_apply_bundle_success() {
        let temp = TempDir::new().unwrap();
        let layout = ClusterLayout::new(temp.path()).unwrap();
        let (invoker, calls) = invoker(Ok(Some(0)));
        let (log, captured) = captured_log();

        let result = invoker.apply_bundle(&layout, &creds(), &log).unwrap();

        assert!(result.success());
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, layout.splunk_binary());
        assert_eq!(calls[0].1.last().unwrap(), "admin:changeme");

        let logged = captured.contents();
        assert!(logged.contains("staged successfully"));
        assert!(!logged.contains("changeme"));
    }

    #[test]
    fn test_apply_bundle_nonzero_exit() {
        let temp = TempDir::new().unwrap();
        let layout = ClusterLayout::new(temp.path()).unwrap();
        let (invoker, _) = invoker(Ok(Some(3)));
        let (log, captured) = captured_log();

        let error = invoker.apply_bundle(&layout, &creds(), &log).unwrap_err();

        assert!(matches!(
            error,
            Error::ExternalCommand {
                status: Some(3),
                ..
            }
        ));
        assert!(!error.to_string().contains("changeme"));
        assert!(captured.contents().contains("exited with status 3"));
    }

    #[test]
    fn test_apply_bundle_signal() {
        let temp = TempDir::new().unwrap();
        let layout = ClusterLayout::new(temp.path()).unwrap();
        let (invoker, _) = invoker(Ok(None));

        let error = invoker
            .apply_bundle(&layout, &creds(), &RunLog::discard())
            .unwrap_err();
        assert!(error.to_string().contains("terminated by a signal"));
    }

    #[test]
    fn test_apply_bundle_spawn_failure() {
        let temp = TempDir::new().unwrap();
        let layout = ClusterLayout::new(temp.path()).unwrap();
        let (invoker, _) = invoker(Err(std::io::ErrorKind::NotFound));

        let error = invoker
            .apply_bundle(&layout, &creds(), &RunLog::discard())
            .unwrap_err();
        assert!(matches!(error, Error::ExternalCommand { status: None, .. }));
        assert!(error.to_string().contains("could not start"));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let result = SystemCommandRunner
            .run(Path::new("/bin/sh"), &["-c".to_string(), "exit 7".to_string()])
            .unwrap();
        assert_eq!(result.exit_status, Some(7));
        assert!(!result.success());
    }
}
