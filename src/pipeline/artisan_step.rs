use crate::config::Confirmation;
use crate::error::StepError;
use crate::pipeline::{Step, StepContext, StepOutcome};
use async_trait::async_trait;
use tracing::info;

/// Runs `php artisan <command>`, optionally behind its own yes/no question.
pub struct ArtisanStep {
    name: String,
    description: String,
    command: String,
    args: Vec<String>,
    interactive: bool,
    timeout_secs: Option<u64>,
    unless_exists: Option<String>,
    confirm: Option<Confirmation>,
}

impl ArtisanStep {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        let command = command.into();
        Self {
            name: name.into(),
            description: format!("artisan {}", command),
            command,
            args: Vec::new(),
            interactive: false,
            timeout_secs: None,
            unless_exists: None,
            confirm: None,
        }
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        if !args.is_empty() {
            self.description = format!("artisan {} {}", self.command, args.join(" "));
        }
        self.args = args;
        self
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

    /// Consider the step done once this project-relative path exists
    pub fn unless_exists(mut self, path: Option<String>) -> Self {
        self.unless_exists = path;
        self
    }

    pub fn confirm(mut self, confirm: Option<Confirmation>) -> Self {
        self.confirm = confirm;
        self
    }
}

#[async_trait]
impl Step for ArtisanStep {
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
        if let Some(confirm) = &self.confirm {
            if !ctx.prompt().confirm(&confirm.prompt, confirm.default)? {
                info!("Declined optional step: {}", self.name);
                return Ok(StepOutcome::Skipped);
            }
        }

        let spec = ctx
            .artisan(&self.command, &self.args)
            .interactive(self.interactive)
            .with_timeout(self.timeout_secs);
        ctx.run(&spec).await?;
        Ok(StepOutcome::Succeeded)
    }
}
