use crate::error::StepError;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// One external process invocation. The argument vector is passed to the
/// program as-is; nothing goes through a shell. A `timeout_secs` of zero
/// means no limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub interactive: bool,
    pub timeout_secs: u64,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I, timeout_secs: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            interactive: false,
            timeout_secs,
        }
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Replace the default timeout when the step configures its own
    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        if let Some(secs) = timeout_secs {
            self.timeout_secs = secs;
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl fmt::Display for CommandSpec {
    /// Renders the command line for humans; quoting is cosmetic only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Text used as the failure reason: stderr, then stdout
    pub fn error_output(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Runs external commands. Implementations must enforce `timeout_secs`.
#[async_trait]
pub trait ProcessHost: Send + Sync {
    async fn run(&self, spec: &CommandSpec, working_dir: &Path) -> Result<CommandOutput, StepError>;
}

#[derive(Debug, Clone, Default)]
pub struct SystemProcessHost;

impl SystemProcessHost {
    pub fn new() -> Self {
        Self
    }

    fn prepare_command(&self, spec: &CommandSpec, working_dir: &Path) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).current_dir(working_dir).kill_on_drop(true);

        if spec.interactive {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }

        command
    }
}

fn spinner(message: String) -> ProgressBar {
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress_bar.set_message(message);
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    progress_bar
}

#[async_trait]
impl ProcessHost for SystemProcessHost {
    async fn run(&self, spec: &CommandSpec, working_dir: &Path) -> Result<CommandOutput, StepError> {
        info!("Running: {}", spec);
        debug!("Working directory: {}, timeout: {}s", working_dir.display(), spec.timeout_secs);

        let child = self
            .prepare_command(spec, working_dir)
            .spawn()
            .map_err(|source| StepError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let progress_bar = (!spec.interactive).then(|| spinner(spec.to_string()));

        // On timeout the child is dropped and kill_on_drop terminates it.
        let waited = match spec.timeout() {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output()).await,
            None => Ok(child.wait_with_output().await),
        };

        if let Some(progress_bar) = progress_bar {
            progress_bar.finish_and_clear();
        }

        let output = match waited {
            Ok(output) => output?,
            Err(_elapsed) => {
                return Err(StepError::CommandTimedOut {
                    command: spec.to_string(),
                    seconds: spec.timeout_secs,
                });
            }
        };

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        debug!("`{}` exited with {}", spec, result.exit_code);

        Ok(result)
    }
}
