use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Serialize};

/// Default wall-clock limit for a single external command, in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Default PHP executable used for artisan commands
const DEFAULT_PHP_BINARY: &str = "php";

/// Default composer executable
const DEFAULT_COMPOSER_BINARY: &str = "composer";

/// Default answer of the batch confirmation prompt
const DEFAULT_CONFIRM: bool = true;

/// What to do when a configured cache command is not known to artisan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingCommandPolicy {
    /// Report the command and leave it out of the batch
    #[default]
    Warn,
    /// Abort before asking for confirmation
    Error,
}

/// Application settings that can be configured via YAML, environment variables, or CLI flags
#[derive(Debug, Clone, Serialize, Deserialize, Args)]
#[serde(default)]
pub struct Settings {
    /// Timeout in seconds for every external command, 0 for none
    #[arg(
        long = "timeout",
        env = "FULLSTACK_TIMEOUT",
        global = true,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Timeout in seconds for every external command (0 disables it)"
    )]
    pub timeout_secs: u64,

    /// PHP executable used to run artisan
    #[arg(
        long = "php",
        env = "FULLSTACK_PHP",
        global = true,
        default_value = DEFAULT_PHP_BINARY,
        help = "PHP executable used to run artisan"
    )]
    pub php_binary: String,

    /// Composer executable
    #[arg(
        long = "composer",
        env = "FULLSTACK_COMPOSER",
        global = true,
        default_value = DEFAULT_COMPOSER_BINARY,
        help = "Composer executable"
    )]
    pub composer_binary: String,

    /// Policy for cache commands that artisan does not know about
    #[arg(
        long = "missing-command",
        env = "FULLSTACK_MISSING_COMMAND",
        global = true,
        value_enum,
        default_value_t = MissingCommandPolicy::Warn,
        help = "What to do with cache commands artisan does not provide"
    )]
    pub missing_command: MissingCommandPolicy,

    /// Default answer of the batch confirmation prompt
    #[arg(
        long = "confirm-default",
        env = "FULLSTACK_CONFIRM_DEFAULT",
        global = true,
        action = ArgAction::Set,
        default_value_t = DEFAULT_CONFIRM,
        help = "Default answer of the confirmation prompt"
    )]
    pub confirm_default: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            php_binary: DEFAULT_PHP_BINARY.to_string(),
            composer_binary: DEFAULT_COMPOSER_BINARY.to_string(),
            missing_command: MissingCommandPolicy::default(),
            confirm_default: DEFAULT_CONFIRM,
        }
    }
}

impl Settings {
    /// Merge settings from different sources with proper priority
    /// CLI/env settings override YAML settings
    pub fn merge_with_yaml(&mut self, yaml_settings: &Settings) {
        // clap already applied CLI/env values; a field still at its default
        // was not provided there, so the YAML value may replace it.
        if self.timeout_secs == DEFAULT_TIMEOUT_SECS {
            self.timeout_secs = yaml_settings.timeout_secs;
        }

        if self.php_binary == DEFAULT_PHP_BINARY {
            self.php_binary = yaml_settings.php_binary.clone();
        }

        if self.composer_binary == DEFAULT_COMPOSER_BINARY {
            self.composer_binary = yaml_settings.composer_binary.clone();
        }

        if self.missing_command == MissingCommandPolicy::default() {
            self.missing_command = yaml_settings.missing_command;
        }

        if self.confirm_default == DEFAULT_CONFIRM {
            self.confirm_default = yaml_settings.confirm_default;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(settings.php_binary, "php");
        assert_eq!(settings.missing_command, MissingCommandPolicy::Warn);
        assert!(settings.confirm_default);
    }

    #[test]
    fn test_merge_with_yaml_default_cli() {
        let mut cli_settings = Settings::default();

        let yaml_settings = Settings {
            timeout_secs: 120,
            php_binary: "/usr/bin/php8.3".to_string(),
            composer_binary: "composer2".to_string(),
            missing_command: MissingCommandPolicy::Error,
            confirm_default: false,
        };

        cli_settings.merge_with_yaml(&yaml_settings);
        assert_eq!(cli_settings.timeout_secs, 120);
        assert_eq!(cli_settings.php_binary, "/usr/bin/php8.3");
        assert_eq!(cli_settings.composer_binary, "composer2");
        assert_eq!(cli_settings.missing_command, MissingCommandPolicy::Error);
        assert!(!cli_settings.confirm_default);
    }

    #[test]
    fn test_merge_with_yaml_custom_cli() {
        let mut cli_settings = Settings {
            timeout_secs: 30,
            php_binary: "php8.2".to_string(),
            ..Settings::default()
        };

        let yaml_settings = Settings {
            timeout_secs: 120,
            php_binary: "php8.3".to_string(),
            ..Settings::default()
        };

        cli_settings.merge_with_yaml(&yaml_settings);
        assert_eq!(cli_settings.timeout_secs, 30);
        assert_eq!(cli_settings.php_binary, "php8.2");
    }

    #[test]
    fn test_yaml_settings_fill_missing_fields_with_defaults() {
        let settings: Settings = serde_yaml::from_str("timeout_secs: 45\nmissing_command: error\n").unwrap();
        assert_eq!(settings.timeout_secs, 45);
        assert_eq!(settings.missing_command, MissingCommandPolicy::Error);
        assert_eq!(settings.composer_binary, DEFAULT_COMPOSER_BINARY);
        assert!(settings.confirm_default);
    }
}
