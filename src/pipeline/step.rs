use crate::error::StepError;
use crate::process::{CommandOutput, CommandSpec, ProcessHost};
use crate::prompt::Prompter;
use crate::settings::Settings;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One named, confirmable unit of work. `is_done` must be free of side
/// effects; the runner asks it both while planning and right before running.
/// `execute` reports `Skipped` when it decided not to do anything.
#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn is_done(&self, _ctx: &StepContext<'_>) -> bool {
        false
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError>;
}

/// Everything a step may touch, passed in explicitly.
pub struct StepContext<'a> {
    project_root: PathBuf,
    settings: &'a Settings,
    process: &'a dyn ProcessHost,
    prompt: &'a dyn Prompter,
}

impl<'a> StepContext<'a> {
    pub fn new(
        project_root: impl Into<PathBuf>,
        settings: &'a Settings,
        process: &'a dyn ProcessHost,
        prompt: &'a dyn Prompter,
    ) -> Self {
        Self {
            project_root: project_root.into(),
            settings,
            process,
            prompt,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    pub fn prompt(&self) -> &dyn Prompter {
        self.prompt
    }

    /// Resolve a project-relative path
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.project_root.join(path)
    }

    /// `php artisan <command> <args…>` with the configured binary and timeout
    pub fn artisan<S: AsRef<str>>(&self, command: &str, args: &[S]) -> CommandSpec {
        let argv = ["artisan", command]
            .into_iter()
            .map(str::to_string)
            .chain(args.iter().map(|a| a.as_ref().to_string()));
        CommandSpec::new(&self.settings.php_binary, argv, self.settings.timeout_secs)
    }

    pub fn command<I, S>(&self, program: impl Into<String>, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(program, args, self.settings.timeout_secs)
    }

    /// Run without judging the exit code
    pub async fn output(&self, spec: &CommandSpec) -> Result<CommandOutput, StepError> {
        self.process.run(spec, &self.project_root).await
    }

    /// Run and turn a non-zero exit into `StepError::CommandFailed`
    pub async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, StepError> {
        let output = self.output(spec).await?;
        if !output.success() {
            return Err(StepError::CommandFailed {
                command: spec.to_string(),
                exit_code: output.exit_code,
                output: output.error_output().to_string(),
            });
        }
        Ok(output)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub name: String,
    pub outcome: StepOutcome,
}

impl StepResult {
    pub fn new(name: impl Into<String>, outcome: StepOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }
}
