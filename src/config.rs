use crate::pipeline::anchor_insert_step::AnchorPosition;
use crate::settings::Settings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Configuration shipped with the binary, used when the project has none
const BUILTIN_CONFIG: &str = include_str!("../fullstack.yaml");

/// Project-local configuration file name
pub const CONFIG_FILE: &str = "fullstack.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub cache_clear_commands: Vec<String>,
    #[serde(default)]
    pub sail: SailConfig,
    #[serde(default)]
    pub packages: PackagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SailConfig {
    /// Presence of this file means Sail is already installed
    pub compose_file: String,
    /// Where the wrapper script is written
    pub script_path: String,
    /// Arguments passed to the wrapper to bring the container up
    pub start_args: Vec<String>,
    /// The start step ends in a container shell, so it has no timeout by default
    pub start_timeout_secs: u64,
}

impl Default for SailConfig {
    fn default() -> Self {
        Self {
            compose_file: "docker-compose.yml".to_string(),
            script_path: "bin/dev".to_string(),
            start_args: vec!["start".to_string()],
            start_timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagesConfig {
    /// Runs once, before any package
    pub bootstrap: Vec<StepConfig>,
    /// Runs ahead of every selected package
    pub before_each: Vec<StepConfig>,
    pub catalog: Vec<PackageEntry>,
    /// Runs once, after all packages
    pub finalize: Vec<StepConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    pub label: String,
    pub description: String,
    pub steps: Vec<StepConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub prompt: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepConfig {
    Artisan {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        interactive: bool,
        #[serde(default)]
        unless_exists: Option<String>,
        #[serde(default)]
        confirm: Option<Confirmation>,
        /// Overrides the global timeout, 0 for none
        #[serde(default)]
        timeout_secs: Option<u64>,
        #[serde(default)]
        name: Option<String>,
    },
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        interactive: bool,
        #[serde(default)]
        unless_exists: Option<String>,
        #[serde(default)]
        timeout_secs: Option<u64>,
        #[serde(default)]
        name: Option<String>,
    },
    ComposerRequire {
        package: String,
        #[serde(default)]
        constraint: Option<String>,
        #[serde(default)]
        dev: bool,
        #[serde(default)]
        args: Vec<String>,
        /// Composer may ask questions, e.g. whether to trust a plugin
        #[serde(default)]
        interactive: bool,
        #[serde(default)]
        timeout_secs: Option<u64>,
        #[serde(default)]
        name: Option<String>,
    },
    AppendLine {
        file: String,
        line: String,
        #[serde(default)]
        name: Option<String>,
    },
    InsertAtAnchor {
        file: String,
        anchor: String,
        text: String,
        #[serde(default)]
        position: AnchorPosition,
        #[serde(default)]
        name: Option<String>,
    },
    SetEnv {
        #[serde(default = "default_env_file")]
        file: String,
        key: String,
        value: String,
        #[serde(default)]
        name: Option<String>,
    },
}

fn default_env_file() -> String {
    ".env".to_string()
}

impl StepConfig {
    /// Explicit name from the config, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            StepConfig::Artisan { name, .. }
            | StepConfig::Command { name, .. }
            | StepConfig::ComposerRequire { name, .. }
            | StepConfig::AppendLine { name, .. }
            | StepConfig::InsertAtAnchor { name, .. }
            | StepConfig::SetEnv { name, .. } => name.as_deref(),
        }
    }

    /// Short human summary, also the default step name
    pub fn summary(&self) -> String {
        match self {
            StepConfig::Artisan { command, args, .. } if args.is_empty() => format!("artisan {}", command),
            StepConfig::Artisan { command, args, .. } => format!("artisan {} {}", command, args.join(" ")),
            StepConfig::Command { program, args, .. } if args.is_empty() => program.clone(),
            StepConfig::Command { program, args, .. } => format!("{} {}", program, args.join(" ")),
            StepConfig::ComposerRequire { package, dev: true, .. } => format!("composer require --dev {}", package),
            StepConfig::ComposerRequire { package, .. } => format!("composer require {}", package),
            StepConfig::AppendLine { file, line, .. } => format!("append {} to {}", line, file),
            StepConfig::InsertAtAnchor { file, text, .. } => format!("insert `{}` into {}", text.trim(), file),
            StepConfig::SetEnv { file, key, value, .. } => format!("set {}={} in {}", key, value, file),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CONFIG).context("Invalid built-in configuration")
    }

    /// Explicit path first, then `<project>/fullstack.yaml`, then the built-in defaults
    pub fn load(explicit: Option<&Path>, project_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!("Loading config from {}", path.display());
            return Self::from_file(path);
        }

        let local = project_root.join(CONFIG_FILE);
        if local.exists() {
            tracing::debug!("Loading project config from {}", local.display());
            return Self::from_file(local);
        }

        tracing::debug!("Using built-in configuration");
        Self::builtin()
    }

    pub fn validate(&self) -> Result<()> {
        let mut labels = HashSet::new();
        for entry in &self.packages.catalog {
            if !labels.insert(entry.label.as_str()) {
                anyhow::bail!("Duplicate package label in catalog: {}", entry.label);
            }
        }
        Ok(())
    }

    pub fn package_labels(&self) -> Vec<String> {
        self.packages.catalog.iter().map(|p| p.label.clone()).collect()
    }
}
