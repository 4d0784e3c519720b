//! Configuration merging logic
//!
//! Priority: CLI args > environment > ecsync.toml > defaults

use std::time::Duration;

use crate::chain::DECLARATION_FILE_NAME;
use crate::reconcile::{InMemorySettings, DEFAULT_FOCUS_DELAY};

use super::toml_schema::EcsyncToml;

/// CLI options that can override config file settings.
///
/// Uses `Option<T>` to distinguish "not specified" from "explicitly set".
#[derive(Debug, Default)]
pub struct CliOptions {
    pub file_name: Option<String>,
    pub stop_at_git_root: Option<bool>,
    pub focus_delay_ms: Option<u64>,
}

/// Global settings a preview session starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    pub tab_size: i32,
    pub indent_size: i32,
    pub insert_tabs: bool,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            tab_size: 4,
            indent_size: 4,
            insert_tabs: false,
        }
    }
}

impl Baseline {
    pub fn to_store(self) -> InMemorySettings {
        InMemorySettings::new(self.tab_size, self.indent_size, self.insert_tabs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub file_name: String,
    pub stop_at_git_root: bool,
    pub focus_delay: Duration,
    pub baseline: Baseline,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            file_name: DECLARATION_FILE_NAME.to_string(),
            stop_at_git_root: false,
            focus_delay: DEFAULT_FOCUS_DELAY,
            baseline: Baseline::default(),
        }
    }
}

/// Merge configurations from CLI, environment, TOML, and defaults.
///
/// `env_focus_delay` is the raw `EDITORCONFIG_FOCUS_DELAY` value; a malformed
/// value is ignored.
pub fn merge_config(
    cli: &CliOptions,
    env_focus_delay: Option<&str>,
    toml: Option<&EcsyncToml>,
) -> EffectiveConfig {
    let defaults = EffectiveConfig::default();
    let env_delay = env_focus_delay.and_then(|v| v.trim().parse::<u64>().ok());

    let settings = toml.map(|t| &t.settings);

    EffectiveConfig {
        file_name: cli
            .file_name
            .clone()
            .or_else(|| toml.and_then(|t| t.resolve.file_name.clone()))
            .unwrap_or(defaults.file_name),
        stop_at_git_root: cli
            .stop_at_git_root
            .or_else(|| toml.and_then(|t| t.resolve.stop_at_git_root))
            .unwrap_or(defaults.stop_at_git_root),
        focus_delay: cli
            .focus_delay_ms
            .or(env_delay)
            .or_else(|| toml.and_then(|t| t.reconcile.focus_delay_ms))
            .map(Duration::from_millis)
            .unwrap_or(defaults.focus_delay),
        baseline: Baseline {
            tab_size: settings
                .and_then(|s| s.tab_size)
                .unwrap_or(defaults.baseline.tab_size),
            indent_size: settings
                .and_then(|s| s.indent_size)
                .unwrap_or(defaults.baseline.indent_size),
            insert_tabs: settings
                .and_then(|s| s.insert_tabs)
                .unwrap_or(defaults.baseline.insert_tabs),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReconcileSection, ResolveSection, SettingsSection};

    fn toml_config() -> EcsyncToml {
        EcsyncToml {
            resolve: ResolveSection {
                file_name: Some(".ecrc".into()),
                stop_at_git_root: Some(true),
            },
            reconcile: ReconcileSection {
                focus_delay_ms: Some(100),
            },
            settings: SettingsSection {
                tab_size: Some(8),
                indent_size: None,
                insert_tabs: Some(true),
            },
        }
    }

    #[test]
    fn test_merge_defaults_only() {
        let config = merge_config(&CliOptions::default(), None, None);
        assert_eq!(config, EffectiveConfig::default());
        assert_eq!(config.file_name, ".editorconfig");
        assert_eq!(config.focus_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_merge_toml_overrides_defaults() {
        let toml = toml_config();
        let config = merge_config(&CliOptions::default(), None, Some(&toml));

        assert_eq!(config.file_name, ".ecrc");
        assert!(config.stop_at_git_root);
        assert_eq!(config.focus_delay, Duration::from_millis(100));
        assert_eq!(config.baseline.tab_size, 8);
        assert_eq!(config.baseline.indent_size, 4); // default
        assert!(config.baseline.insert_tabs);
    }

    #[test]
    fn test_env_overrides_toml_delay() {
        let toml = toml_config();
        let config = merge_config(&CliOptions::default(), Some("750"), Some(&toml));
        assert_eq!(config.focus_delay, Duration::from_millis(750));
    }

    #[test]
    fn test_malformed_env_delay_is_ignored() {
        let toml = toml_config();
        let config = merge_config(&CliOptions::default(), Some("soon"), Some(&toml));
        assert_eq!(config.focus_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_merge_cli_overrides_everything() {
        let cli = CliOptions {
            file_name: Some(".custom".into()),
            stop_at_git_root: Some(false),
            focus_delay_ms: Some(0),
        };
        let toml = toml_config();
        let config = merge_config(&cli, Some("750"), Some(&toml));

        assert_eq!(config.file_name, ".custom");
        assert!(!config.stop_at_git_root);
        assert_eq!(config.focus_delay, Duration::ZERO);
    }
}
