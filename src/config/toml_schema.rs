//! TOML schema definitions for ecsync.toml

use serde::{Deserialize, Serialize};

/// Root structure for ecsync.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EcsyncToml {
    /// Declaration file discovery
    #[serde(default)]
    pub resolve: ResolveSection,

    /// Focus reconciliation
    #[serde(default)]
    pub reconcile: ReconcileSection,

    /// Baseline global settings used by `--preview`
    #[serde(default)]
    pub settings: SettingsSection,
}

/// `[resolve]` section in ecsync.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolveSection {
    /// Declaration file name (default: `.editorconfig`)
    pub file_name: Option<String>,

    /// Stop the upward search at the git repository root (default: false)
    pub stop_at_git_root: Option<bool>,
}

/// `[reconcile]` section in ecsync.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileSection {
    /// Debounce delay before applying settings on focus (default: 500)
    pub focus_delay_ms: Option<u64>,
}

/// `[settings]` section in ecsync.toml
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsSection {
    pub tab_size: Option<i32>,
    pub indent_size: Option<i32>,
    pub insert_tabs: Option<bool>,
}
