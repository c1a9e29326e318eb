use crate::error::StepError;
use crate::pipeline::{Step, StepContext, StepOutcome};
use async_trait::async_trait;
use std::path::Path;

/// Runs an arbitrary program, e.g. the generated `./bin/dev start`.
pub struct CommandStep {
    name: String,
    description: String,
    program: String,
    args: Vec<String>,
    interactive: bool,
    timeout_secs: Option<u64>,
    unless_exists: Option<String>,
}

impl CommandStep {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        let program = program.into();
        let description = std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            name: name.into(),
            description,
            program,
            args,
            interactive: false,
            timeout_secs: None,
            unless_exists: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Per-step timeout; `None` keeps the configured default
    pub fn timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn unless_exists(mut self, path: Option<String>) -> Self {
        self.unless_exists = path;
        self
    }

    /// Relative paths with a separator are relative to the project root,
    /// bare names are looked up on PATH.
    fn program_for(&self, ctx: &StepContext<'_>) -> String {
        let program = Path::new(&self.program);
        if program.is_relative() && program.components().count() > 1 {
            ctx.resolve(program).to_string_lossy().into_owned()
        } else {
            self.program.clone()
        }
    }
}

#[async_trait]
impl Step for CommandStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_done(&self, ctx: &StepContext<'_>) -> bool {
        self.unless_exists
            .as_ref()
            .is_some_and(|path| ctx.resolve(path).exists())
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
        let spec = ctx
            .command(self.program_for(ctx), self.args.iter().cloned())
            .interactive(self.interactive)
            .with_timeout(self.timeout_secs);
        ctx.run(&spec).await?;
        Ok(StepOutcome::Succeeded)
    }
}
