use crate::config::{Config, SailConfig};
use crate::pipeline::{ArtisanStep, BatchOutcome, CommandStep, Step, StepContext, StepRunner, WriteFileStep};
use anyhow::Result;

/// Wrapper script around `vendor/bin/sail`
const DEV_SCRIPT: &str = include_str!("../templates/dev.sh");

fn steps(sail: &SailConfig) -> Vec<Box<dyn Step>> {
    vec![
        Box::new(
            ArtisanStep::new("sail: install", "sail:install")
                .interactive(true)
                .unless_exists(Some(sail.compose_file.clone()))
                .with_description(format!("install Laravel Sail ({} missing)", sail.compose_file)),
        ),
        Box::new(
            WriteFileStep::new("sail: dev script", sail.script_path.clone(), DEV_SCRIPT)
                .mode(0o755)
                .with_description(format!("create the {} wrapper script", sail.script_path)),
        ),
        Box::new(
            CommandStep::new("sail: start", sail.script_path.clone(), sail.start_args.clone())
                .interactive(true)
                .timeout_secs(Some(sail.start_timeout_secs))
                .with_description("start the container and open a shell"),
        ),
    ]
}

pub async fn run(config: &Config, ctx: &StepContext<'_>) -> Result<BatchOutcome> {
    println!("Laravel Sail setup...");

    let runner = StepRunner::new(ctx, "Do you wish to continue with the Sail setup?");
    let outcome = runner.run(steps(&config.sail)).await?;

    if outcome == BatchOutcome::Cancelled {
        println!("Sail setup was cancelled.");
    }

    Ok(outcome)
}
