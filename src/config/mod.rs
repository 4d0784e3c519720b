//! Configuration file support for ecsync.
//!
//! This module provides:
//! - Loading configuration from `ecsync.toml`
//! - Config file discovery (search upward from current directory)
//! - Merging CLI args, environment, config file, and defaults
//! - Template generation with `--init`

mod file;
mod init;
mod merge;
mod toml_schema;

pub use file::{find_config_file, load_config, ConfigError, CONFIG_FILE_NAME};
pub use init::{generate_init_file, generate_init_file_in, ECSYNC_TOML_TEMPLATE};
pub use merge::{merge_config, Baseline, CliOptions, EffectiveConfig};
pub use toml_schema::{EcsyncToml, ReconcileSection, ResolveSection, SettingsSection};
