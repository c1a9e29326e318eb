use crate::config::{Config, PackagesConfig};
use crate::pipeline::{build_steps, BatchOutcome, Step, StepContext, StepRunner};
use anyhow::Result;
use tracing::info;

/// Bootstrap, then each selected package behind its `before_each` steps,
/// then finalize. Order matters: packages expect a migrated database.
fn batch(packages: &PackagesConfig, selected: &[usize]) -> Vec<Box<dyn Step>> {
    let mut steps = build_steps("bootstrap", &packages.bootstrap);
    for &index in selected {
        let Some(entry) = packages.catalog.get(index) else {
            continue;
        };
        steps.extend(build_steps(&entry.label, &packages.before_each));
        steps.extend(build_steps(&entry.label, &entry.steps));
    }
    steps.extend(build_steps("finalize", &packages.finalize));
    steps
}

/// Every `--select` label must name a catalog entry (case-insensitive).
pub fn check_selection(config: &Config, select: &[String]) -> Result<()> {
    let labels = config.package_labels();
    let unknown: Vec<&str> = select
        .iter()
        .filter(|wanted| !labels.iter().any(|label| label.eq_ignore_ascii_case(wanted)))
        .map(String::as_str)
        .collect();

    if !unknown.is_empty() {
        anyhow::bail!(
            "Unknown package(s): {}. Available: {}",
            unknown.join(", "),
            labels.join(", ")
        );
    }
    Ok(())
}

fn print_catalog(packages: &PackagesConfig) {
    for entry in &packages.catalog {
        println!("{}: {}", entry.label, entry.description.trim_end());
        println!();
    }
}

pub async fn run(config: &Config, ctx: &StepContext<'_>) -> Result<BatchOutcome> {
    let packages = &config.packages;
    if packages.catalog.is_empty() {
        println!("No packages configured.");
        return Ok(BatchOutcome::Completed(Vec::new()));
    }

    print_catalog(packages);

    let selected = ctx
        .prompt()
        .multi_select("Which packages would you like to install?", &config.package_labels())?;
    let labels: Vec<&str> = selected
        .iter()
        .filter_map(|&i| packages.catalog.get(i))
        .map(|entry| entry.label.as_str())
        .collect();

    if labels.is_empty() {
        info!("No packages selected");
    } else {
        info!("Selected packages: {}", labels.join(", "));
    }

    let runner = StepRunner::new(ctx, "Do you wish to continue with the project setup?");
    let outcome = runner.run(batch(packages, &selected)).await?;

    match &outcome {
        BatchOutcome::Cancelled => println!("Project setup was cancelled."),
        BatchOutcome::Completed(_) => println!("Project setup complete!"),
    }

    Ok(outcome)
}
