//! Running external programs: the current file, and git.
//!
//! Every invocation carries a timeout, and every launch takes a
//! [`CancellationToken`]. When either fires first the child is killed
//! (`kill_on_drop`) and the caller gets a [`ProcessError`] instead of
//! output.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::config::ProcessConfig;

/// A program to run, with its arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl Invocation {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// `<interpreter> <path>`, run from the file's directory.
    pub fn run_file(path: &Path, config: &ProcessConfig) -> Self {
        let invocation =
            Self::new(&config.interpreter, config.timeout()).arg(path.to_string_lossy());
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => invocation.cwd(dir),
            _ => invocation,
        }
    }

    /// The command line as typed in a shell, for logs and messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Version-control actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommand {
    /// `git clone <url> <dir>`
    Clone { url: String, dir: PathBuf },
    /// `git commit -am <message>`
    Commit { message: String },
    /// `git push`
    Push,
}

impl GitCommand {
    pub fn name(&self) -> &'static str {
        match self {
            GitCommand::Clone { .. } => "Clone",
            GitCommand::Commit { .. } => "Commit",
            GitCommand::Push => "Push",
        }
    }

    /// Builds the invocation, run from the workspace `root`.
    pub fn invocation(&self, root: &Path, config: &ProcessConfig) -> Invocation {
        let git = Invocation::new(&config.git, config.timeout()).cwd(root);
        match self {
            GitCommand::Clone { url, dir } => git
                .arg("clone")
                .arg(url.as_str())
                .arg(dir.to_string_lossy()),
            GitCommand::Commit { message } => git.arg("commit").arg("-am").arg(message.as_str()),
            GitCommand::Push => git.arg("push"),
        }
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; `None` if the process was ended by a signal
    pub status: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Output as shown to the user: stdout verbatim, then stderr and the
    /// exit status when the run failed.
    pub fn report(&self) -> String {
        if self.success() {
            return self.stdout.clone();
        }
        let mut text = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&self.stderr);
        }
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        match self.status {
            Some(code) => text.push_str(&format!("exited with status {code}")),
            None => text.push_str("terminated by signal"),
        }
        text
    }
}

impl From<std::process::Output> for ProcessOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code(),
        }
    }
}

/// Why a process produced no output.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` did not finish within {}s and was killed", timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("`{program}` was cancelled")]
    Cancelled { program: String },

    #[error("Failed to collect output of `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Starts processes and collects their output.
pub trait ProcessLauncher {
    fn launch(
        &self,
        invocation: &Invocation,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send;
}

/// Launches real child processes through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    async fn launch(
        &self,
        invocation: &Invocation,
        cancel: CancellationToken,
    ) -> Result<ProcessOutput, ProcessError> {
        let program = invocation.program.clone();
        tracing::info!(command = %invocation.command_line(), "launching process");

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &invocation.cwd {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|source| ProcessError::Launch {
            program: program.clone(),
            source,
        })?;

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(%program, "process cancelled");
                return Err(ProcessError::Cancelled { program });
            }
            result = tokio::time::timeout(invocation.timeout, child.wait_with_output()) => result,
        };

        match output {
            Ok(Ok(output)) => {
                let output = ProcessOutput::from(output);
                tracing::debug!(%program, status = ?output.status, "process finished");
                Ok(output)
            }
            Ok(Err(source)) => Err(ProcessError::Io { program, source }),
            Err(_) => {
                tracing::warn!(%program, timeout = ?invocation.timeout, "process timed out");
                Err(ProcessError::TimedOut {
                    program,
                    timeout: invocation.timeout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_file_invocation() {
        let invocation = Invocation::run_file(Path::new("/work/app.py"), &ProcessConfig::default());

        assert_eq!(invocation.program, "python");
        assert_eq!(invocation.args, vec!["/work/app.py"]);
        assert_eq!(invocation.cwd.as_deref(), Some(Path::new("/work")));
        assert_eq!(invocation.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_git_invocations() {
        let config = ProcessConfig::default();
        let root = Path::new("/repo");

        let commit = GitCommand::Commit {
            message: "fix: typo".into(),
        }
        .invocation(root, &config);
        assert_eq!(commit.command_line(), "git commit -am fix: typo");
        assert_eq!(commit.args[2], "fix: typo");
        assert_eq!(commit.cwd.as_deref(), Some(root));

        let clone = GitCommand::Clone {
            url: "https://example.com/r.git".into(),
            dir: PathBuf::from("/tmp/r"),
        }
        .invocation(root, &config);
        assert_eq!(clone.args, vec!["clone", "https://example.com/r.git", "/tmp/r"]);

        assert_eq!(GitCommand::Push.invocation(root, &config).args, vec!["push"]);
    }

    #[test]
    fn test_report_shows_failures() {
        let ok = ProcessOutput {
            stdout: "hello\n".into(),
            stderr: "warning\n".into(),
            status: Some(0),
        };
        assert_eq!(ok.report(), "hello\n");

        let failed = ProcessOutput {
            stdout: String::new(),
            stderr: "Traceback".into(),
            status: Some(1),
        };
        assert_eq!(failed.report(), "Traceback\nexited with status 1");
    }

    #[tokio::test]
    async fn test_missing_program_is_launch_error() {
        let invocation = Invocation::new("codepad-no-such-program", Duration::from_secs(5));
        let err = SystemLauncher
            .launch(&invocation, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Launch { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_is_captured() {
        let invocation = Invocation::new("sh", Duration::from_secs(5))
            .arg("-c")
            .arg("echo out; echo err >&2; exit 3");
        let output = SystemLauncher
            .launch(&invocation, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.status, Some(3));
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_child() {
        let invocation = Invocation::new("sleep", Duration::from_millis(100)).arg("10");
        let err = SystemLauncher
            .launch(&invocation, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::TimedOut { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancellation() {
        let invocation = Invocation::new("sleep", Duration::from_secs(30)).arg("10");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = SystemLauncher.launch(&invocation, cancel).await.unwrap_err();
        assert!(matches!(err, ProcessError::Cancelled { .. }));
    }
}
