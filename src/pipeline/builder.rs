use crate::config::StepConfig;
use crate::pipeline::{
    AnchorInsertStep, AppendLineStep, ArtisanStep, CommandStep, ComposerRequireStep, SetEnvStep, Step,
};

/// Turn configured steps into runnable ones. Names are prefixed with `group`
/// so the same action can appear under several packages in one batch.
pub fn build_steps(group: &str, configs: &[StepConfig]) -> Vec<Box<dyn Step>> {
    configs.iter().map(|config| build_step(group, config)).collect()
}

fn build_step(group: &str, config: &StepConfig) -> Box<dyn Step> {
    let summary = config.summary();
    let name = match config.name() {
        Some(name) => format!("{}: {}", group, name),
        None => format!("{}: {}", group, summary),
    };

    match config {
        StepConfig::Artisan {
            command,
            args,
            interactive,
            unless_exists,
            confirm,
            timeout_secs,
            ..
        } => Box::new(
            ArtisanStep::new(name, command.clone())
                .args(args.clone())
                .interactive(*interactive)
                .timeout_secs(*timeout_secs)
                .unless_exists(unless_exists.clone())
                .confirm(confirm.clone())
                .with_description(summary),
        ),
        StepConfig::Command {
            program,
            args,
            interactive,
            unless_exists,
            timeout_secs,
            ..
        } => Box::new(
            CommandStep::new(name, program.clone(), args.clone())
                .interactive(*interactive)
                .timeout_secs(*timeout_secs)
                .unless_exists(unless_exists.clone())
                .with_description(summary),
        ),
        StepConfig::ComposerRequire {
            package,
            constraint,
            dev,
            args,
            interactive,
            timeout_secs,
            ..
        } => Box::new(
            ComposerRequireStep::new(name, package.clone())
                .constraint(constraint.clone())
                .dev(*dev)
                .args(args.clone())
                .interactive(*interactive)
                .timeout_secs(*timeout_secs)
                .with_description(summary),
        ),
        StepConfig::AppendLine { file, line, .. } => {
            Box::new(AppendLineStep::new(name, file.clone(), line.clone()).with_description(summary))
        }
        StepConfig::InsertAtAnchor {
            file,
            anchor,
            text,
            position,
            ..
        } => Box::new(
            AnchorInsertStep::new(name, file.clone(), anchor.clone(), text.clone())
                .position(*position)
                .with_description(summary),
        ),
        StepConfig::SetEnv { file, key, value, .. } => Box::new(
            SetEnvStep::new(name, file.clone(), key.clone(), value.clone()).with_description(summary),
        ),
    }
}
