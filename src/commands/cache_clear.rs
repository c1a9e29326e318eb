use crate::config::Config;
use crate::pipeline::{ArtisanStep, BatchOutcome, Step, StepContext, StepRunner};
use crate::settings::MissingCommandPolicy;
use anyhow::Result;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CommandTable {
    commands: Vec<CommandEntry>,
}

#[derive(Debug, Deserialize)]
struct CommandEntry {
    name: String,
}

fn parse_command_table(json: &str) -> Option<HashSet<String>> {
    let table: CommandTable = serde_json::from_str(json).ok()?;
    Some(table.commands.into_iter().map(|c| c.name).collect())
}

/// Ask artisan which commands it provides. `None` when that cannot be told.
async fn available_commands(ctx: &StepContext<'_>) -> Option<HashSet<String>> {
    let spec = ctx.artisan("list", &["--format=json"]);
    match ctx.output(&spec).await {
        Ok(output) if output.success() => {
            let table = parse_command_table(&output.stdout);
            if table.is_none() {
                warn!("Could not parse the output of `{}`, keeping every configured command", spec);
            }
            table
        }
        Ok(output) => {
            warn!("`{}` exited with {}, keeping every configured command", spec, output.exit_code);
            None
        }
        Err(e) => {
            warn!("Could not list artisan commands: {}", e);
            None
        }
    }
}

/// Keep the configured commands artisan knows about, in configured order
fn select_commands(
    configured: &[String],
    available: Option<&HashSet<String>>,
    policy: MissingCommandPolicy,
) -> Result<Vec<String>> {
    let Some(available) = available else {
        return Ok(configured.to_vec());
    };

    let missing: Vec<&str> = configured
        .iter()
        .filter(|c| !available.contains(c.as_str()))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        match policy {
            MissingCommandPolicy::Error => {
                anyhow::bail!("Cache commands not provided by artisan: {}", missing.join(", "));
            }
            MissingCommandPolicy::Warn => {
                for command in &missing {
                    warn!("Artisan does not provide `{}`, leaving it out", command);
                    println!("! {} is not available, leaving it out", command);
                }
            }
        }
    }

    Ok(configured
        .iter()
        .filter(|c| available.contains(c.as_str()))
        .cloned()
        .collect())
}

pub async fn run(config: &Config, ctx: &StepContext<'_>) -> Result<BatchOutcome> {
    println!("Clearing all caches for the full stack application...");

    if config.cache_clear_commands.is_empty() {
        println!("No cache clearing commands found.");
        return Ok(BatchOutcome::Completed(Vec::new()));
    }

    let available = available_commands(ctx).await;
    let commands = select_commands(
        &config.cache_clear_commands,
        available.as_ref(),
        ctx.settings().missing_command,
    )?;
    debug!("Cache commands to run: {:?}", commands);

    if commands.is_empty() {
        println!("None of the configured cache commands are available.");
        return Ok(BatchOutcome::Completed(Vec::new()));
    }

    let steps: Vec<Box<dyn Step>> = commands
        .iter()
        .map(|command| Box::new(ArtisanStep::new(command.clone(), command.clone())) as Box<dyn Step>)
        .collect();

    let runner = StepRunner::new(ctx, "Do you wish to continue and clear the above caches?");
    let outcome = runner.run(steps).await?;

    match &outcome {
        BatchOutcome::Cancelled => println!("Cache clearing was cancelled."),
        BatchOutcome::Completed(_) => {
            println!("All predefined caches have been processed for the full stack application!")
        }
    }

    Ok(outcome)
}
