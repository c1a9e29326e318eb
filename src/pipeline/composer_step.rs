use crate::error::StepError;
use crate::manifest::{self, MANIFEST_FILE};
use crate::pipeline::{Step, StepContext, StepOutcome};
use async_trait::async_trait;

/// `composer require` for a package that is not yet in the manifest.
pub struct ComposerRequireStep {
    name: String,
    description: String,
    package: String,
    constraint: Option<String>,
    dev: bool,
    args: Vec<String>,
    interactive: bool,
    timeout_secs: Option<u64>,
}

impl ComposerRequireStep {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        let package = package.into();
        Self {
            name: name.into(),
            description: format!("composer require {}", package),
            package,
            constraint: None,
            dev: false,
            args: Vec::new(),
            interactive: false,
            timeout_secs: None,
        }
    }

    pub fn constraint(mut self, constraint: Option<String>) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
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

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn argv(&self) -> Vec<String> {
        let requirement = match &self.constraint {
            Some(constraint) => format!("{}:{}", self.package, constraint),
            None => self.package.clone(),
        };
        let mut argv = vec!["require".to_string(), requirement];
        if self.dev {
            argv.push("--dev".to_string());
        }
        argv.extend(self.args.iter().cloned());
        argv
    }
}

#[async_trait]
impl Step for ComposerRequireStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_done(&self, ctx: &StepContext<'_>) -> bool {
        manifest::is_installed(&ctx.resolve(MANIFEST_FILE), &self.package)
    }

    async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
        let spec = ctx
            .command(&ctx.settings().composer_binary, self.argv())
            .interactive(self.interactive)
            .with_timeout(self.timeout_secs);
        ctx.run(&spec).await?;
        Ok(StepOutcome::Succeeded)
    }
}
