use crate::pipeline::{Step, StepContext, StepOutcome, StepResult};
use anyhow::Result;
use std::collections::HashSet;
use tracing::{debug, error, info};

/// How a batch ended. Declining the confirmation is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Cancelled,
    Completed(Vec<StepResult>),
}

/// Plans, confirms and executes a batch of steps, strictly in order.
pub struct StepRunner<'a> {
    ctx: &'a StepContext<'a>,
    question: String,
}

impl<'a> StepRunner<'a> {
    pub fn new(ctx: &'a StepContext<'a>, question: impl Into<String>) -> Self {
        Self {
            ctx,
            question: question.into(),
        }
    }

    /// Drop every step that is already done, keeping the original order
    pub fn plan(&self, steps: Vec<Box<dyn Step>>) -> Vec<Box<dyn Step>> {
        steps
            .into_iter()
            .filter(|step| {
                let done = step.is_done(self.ctx);
                if done {
                    debug!("Already done, not planned: {}", step.name());
                }
                !done
            })
            .collect()
    }

    /// List the planned steps and ask for a go-ahead
    pub fn confirm(&self, planned: &[Box<dyn Step>]) -> Result<bool> {
        println!();
        for step in planned {
            println!("  - {}", plan_line(step.as_ref()));
        }
        println!();

        let confirmed = self
            .ctx
            .prompt()
            .confirm(&self.question, self.ctx.settings().confirm_default)?;
        Ok(confirmed)
    }

    /// Run every step in order. A failure is reported and the batch carries on.
    pub async fn execute(&self, planned: &[Box<dyn Step>]) -> Vec<StepResult> {
        let total = planned.len();
        let mut results = Vec::with_capacity(total);

        for (i, step) in planned.iter().enumerate() {
            // An earlier step in this batch may already have done the work.
            if step.is_done(self.ctx) {
                info!("Step {}/{} already done: {}", i + 1, total, step.name());
                println!("↷ {} (already done)", step.name());
                results.push(StepResult::new(step.name(), StepOutcome::Skipped));
                continue;
            }

            info!("Executing step {}/{}: {}", i + 1, total, step.name());
            let outcome = match step.execute(self.ctx).await {
                Ok(outcome) => outcome,
                Err(e) => StepOutcome::Failed { reason: e.to_string() },
            };

            match &outcome {
                StepOutcome::Succeeded => {
                    info!("Step {}/{} completed successfully", i + 1, total);
                    println!("✔ {}", step.name());
                }
                StepOutcome::Skipped => {
                    info!("Step {}/{} skipped", i + 1, total);
                    println!("↷ {} (skipped)", step.name());
                }
                StepOutcome::Failed { reason } => {
                    error!("Step {}/{} failed: {}", i + 1, total, reason);
                    println!("✘ {}: {}", step.name(), reason);
                }
            }
            results.push(StepResult::new(step.name(), outcome));
        }

        results
    }

    pub async fn run(&self, steps: Vec<Box<dyn Step>>) -> Result<BatchOutcome> {
        ensure_unique_names(&steps)?;

        let planned = self.plan(steps);
        if planned.is_empty() {
            info!("Nothing to do, every step is already done");
            return Ok(BatchOutcome::Completed(Vec::new()));
        }

        if !self.confirm(&planned)? {
            info!("Batch cancelled by user");
            return Ok(BatchOutcome::Cancelled);
        }

        Ok(BatchOutcome::Completed(self.execute(&planned).await))
    }
}

/// Unnamed steps are named after their summary; don't print it twice.
fn plan_line(step: &dyn Step) -> String {
    if step.name().ends_with(step.description()) {
        step.name().to_string()
    } else {
        format!("{}: {}", step.name(), step.description())
    }
}

fn ensure_unique_names(steps: &[Box<dyn Step>]) -> Result<()> {
    let mut seen = HashSet::new();
    for step in steps {
        if !seen.insert(step.name()) {
            anyhow::bail!("Duplicate step name in batch: {}", step.name());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Confirmation, StepConfig};
    use crate::error::StepError;
    use crate::pipeline::testing::{RecordingHost, ScriptedPrompter};
    use crate::pipeline::{build_steps, ArtisanStep};
    use crate::prompt::DefaultsPrompter;
    use crate::settings::Settings;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Runs `true <name>` through the host; flips `done` on success.
    struct FakeStep {
        name: String,
        done: Arc<AtomicBool>,
        runs: Arc<AtomicUsize>,
    }

    impl FakeStep {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                done: Arc::new(AtomicBool::new(false)),
                runs: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn done(self) -> Self {
            self.done.store(true, Ordering::SeqCst);
            self
        }

        fn sharing_done_with(mut self, other: &FakeStep) -> Self {
            self.done = Arc::clone(&other.done);
            self
        }
    }

    #[async_trait]
    impl Step for FakeStep {
        fn name(&self) -> &str {
            &self.name
        }

        fn description(&self) -> &str {
            "fake"
        }

        fn is_done(&self, _ctx: &StepContext<'_>) -> bool {
            self.done.load(Ordering::SeqCst)
        }

        async fn execute(&self, ctx: &StepContext<'_>) -> Result<StepOutcome, StepError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            ctx.run(&ctx.command("true", [self.name.as_str()])).await?;
            self.done.store(true, Ordering::SeqCst);
            Ok(StepOutcome::Succeeded)
        }
    }

    fn boxed(steps: Vec<FakeStep>) -> Vec<Box<dyn Step>> {
        steps.into_iter().map(|s| Box::new(s) as Box<dyn Step>).collect()
    }

    #[tokio::test]
    async fn test_failed_step_does_not_stop_the_batch() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let host = RecordingHost::new();
        host.respond("true b", 1, "", "");
        let prompt = ScriptedPrompter::answering(&[true]);
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);
        let runner = StepRunner::new(&ctx, "Continue?");

        let outcome = runner
            .run(boxed(vec![FakeStep::new("a"), FakeStep::new("b"), FakeStep::new("c")]))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BatchOutcome::Completed(vec![
                StepResult::new("a", StepOutcome::Succeeded),
                StepResult::new(
                    "b",
                    StepOutcome::Failed {
                        reason: "exit 1 from `true b`".to_string()
                    }
                ),
                StepResult::new("c", StepOutcome::Succeeded),
            ])
        );
        assert_eq!(host.command_lines(), vec!["true a", "true b", "true c"]);
    }

    #[tokio::test]
    async fn test_declining_executes_nothing() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let host = RecordingHost::new();
        let prompt = ScriptedPrompter::answering(&[false]);
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);
        let runner = StepRunner::new(&ctx, "Continue?");

        let outcome = runner
            .run(boxed(vec![FakeStep::new("a"), FakeStep::new("b")]))
            .await
            .unwrap();

        assert_eq!(outcome, BatchOutcome::Cancelled);
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_confirmation_uses_configured_default() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            confirm_default: false,
            ..Settings::default()
        };
        let host = RecordingHost::new();
        let prompt = ScriptedPrompter::default();
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);

        let outcome = StepRunner::new(&ctx, "Continue?")
            .run(boxed(vec![FakeStep::new("a")]))
            .await
            .unwrap();

        assert_eq!(outcome, BatchOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_all_done_batch_never_prompts() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let host = RecordingHost::new();
        let prompt = ScriptedPrompter::default();
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);
        let runner = StepRunner::new(&ctx, "Continue?");

        let steps = boxed(vec![FakeStep::new("a").done()]);
        let outcome = runner.run(steps).await.unwrap();

        assert_eq!(outcome, BatchOutcome::Completed(Vec::new()));
        assert_eq!(prompt.times_asked(), 0);
    }

    #[test]
    fn test_plan_drops_done_steps_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let host = RecordingHost::new();
        let prompt = ScriptedPrompter::default();
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);
        let runner = StepRunner::new(&ctx, "Continue?");

        let planned = runner.plan(boxed(vec![
            FakeStep::new("migrate"),
            FakeStep::new("require").done(),
            FakeStep::new("install"),
            FakeStep::new("publish"),
        ]));

        let names: Vec<&str> = planned.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["migrate", "install", "publish"]);
    }

    #[tokio::test]
    async fn test_step_done_by_earlier_step_is_skipped() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let host = RecordingHost::new();
        let prompt = ScriptedPrompter::default();
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);
        let runner = StepRunner::new(&ctx, "Continue?");

        let first = FakeStep::new("require filament");
        let second = FakeStep::new("require filament again").sharing_done_with(&first);
        let second_runs = Arc::clone(&second.runs);

        let results = runner.execute(&boxed(vec![first, second])).await;

        assert_eq!(results[0].outcome, StepOutcome::Succeeded);
        assert_eq!(results[1].outcome, StepOutcome::Skipped);
        assert_eq!(second_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_execution_skips_idempotent_steps() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let host = RecordingHost::new();
        let prompt = ScriptedPrompter::default();
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);
        let runner = StepRunner::new(&ctx, "Continue?");

        let steps = boxed(vec![FakeStep::new("a"), FakeStep::new("b")]);
        let first = runner.execute(&steps).await;
        let second = runner.execute(&steps).await;

        assert!(first.iter().all(|r| r.outcome == StepOutcome::Succeeded));
        assert!(second.iter().all(|r| r.outcome == StepOutcome::Skipped));
        assert_eq!(host.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let host = RecordingHost::new();
        let prompt = ScriptedPrompter::default();
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);

        let result = StepRunner::new(&ctx, "Continue?")
            .run(boxed(vec![FakeStep::new("migrate"), FakeStep::new("migrate")]))
            .await;

        assert!(result.is_err());
        assert_eq!(prompt.times_asked(), 0);
    }

    #[test]
    fn test_plan_line_shows_summary_once() {
        let unnamed = build_steps("bootstrap", &[artisan_config(None)]);
        assert_eq!(plan_line(unnamed[0].as_ref()), "bootstrap: artisan migrate");

        let named = build_steps("bootstrap", &[artisan_config(Some("migrate database"))]);
        assert_eq!(
            plan_line(named[0].as_ref()),
            "bootstrap: migrate database: artisan migrate"
        );
    }

    fn artisan_config(name: Option<&str>) -> StepConfig {
        StepConfig::Artisan {
            command: "migrate".to_string(),
            args: vec![],
            interactive: false,
            unless_exists: None,
            confirm: None,
            timeout_secs: None,
            name: name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_declined_optional_step_is_reported_as_skipped() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default();
        let host = RecordingHost::new();
        let prompt = DefaultsPrompter::default();
        let ctx = StepContext::new(dir.path(), &settings, &host, &prompt);
        let runner = StepRunner::new(&ctx, "Continue?");

        let step = ArtisanStep::new("create user", "make:filament-user").confirm(Some(Confirmation {
            prompt: "Do you want to create a Filament user now?".to_string(),
            default: false,
        }));
        let results = runner.execute(&[Box::new(step) as Box<dyn Step>]).await;

        assert_eq!(results, vec![StepResult::new("create user", StepOutcome::Skipped)]);
        assert!(host.calls().is_empty());
    }
}
