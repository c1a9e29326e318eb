use anyhow::Result;
use clap::{Parser, Subcommand};
use fullstack::commands::{cache_clear, packages, sail};
use fullstack::config::Config;
use fullstack::pipeline::StepContext;
use fullstack::process::SystemProcessHost;
use fullstack::prompt::{DefaultsPrompter, Prompter, TerminalPrompter};
use fullstack::report;
use fullstack::settings::Settings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fullstack",
    about = "Interactive setup helpers for Laravel projects",
    version
)]
struct Args {
    /// Project root the commands operate on
    #[arg(short = 'C', long, global = true, value_name = "DIR", default_value = ".")]
    project_root: PathBuf,

    /// YAML configuration file (defaults to <project>/fullstack.yaml, then built-in)
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Do not ask anything: take every default answer
    #[arg(short = 'n', long = "no-interaction", global = true)]
    no_interaction: bool,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clear all cache-related data of the application
    CacheClear,
    /// Install Laravel Sail, create the bin/dev wrapper and start the container
    Sail,
    /// Install and wire up framework packages from the catalog
    Packages {
        /// Package to install when running with --no-interaction (repeatable)
        #[arg(long = "select", value_name = "LABEL")]
        select: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose {
        "fullstack=debug,info"
    } else {
        "fullstack=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    if !args.project_root.is_dir() {
        anyhow::bail!("Project root {} is not a directory", args.project_root.display());
    }

    let config = Config::load(args.config.as_deref(), &args.project_root)?;
    tracing::debug!("Loaded configuration: {:#?}", config);

    let mut settings = args.settings.clone();
    if let Some(yaml_settings) = &config.settings {
        settings.merge_with_yaml(yaml_settings);
    }
    tracing::debug!("Effective settings: {:?}", settings);

    if let Command::Packages { select } = &args.command {
        packages::check_selection(&config, select)?;
    }

    let prompt: Box<dyn Prompter> = if args.no_interaction {
        let preselected = match &args.command {
            Command::Packages { select } => select.clone(),
            _ => Vec::new(),
        };
        Box::new(DefaultsPrompter::new(preselected))
    } else {
        Box::new(TerminalPrompter)
    };

    let host = SystemProcessHost::new();
    let ctx = StepContext::new(&args.project_root, &settings, &host, prompt.as_ref());

    let outcome = match args.command {
        Command::CacheClear => cache_clear::run(&config, &ctx).await?,
        Command::Sail => sail::run(&config, &ctx).await?,
        Command::Packages { .. } => packages::run(&config, &ctx).await?,
    };

    if let Some(summary) = report::print_summary(&outcome) {
        if !summary.is_clean() {
            anyhow::bail!("{} step(s) failed", summary.failed);
        }
    }

    Ok(())
}
