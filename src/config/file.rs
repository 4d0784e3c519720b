//! Locating and reading `ecsync.toml`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::toml_schema::EcsyncToml;

pub const CONFIG_FILE_NAME: &str = "ecsync.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("invalid {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Nearest `ecsync.toml` at or above `start_dir`.
///
/// The directory holding `.git` is the last one searched, so settings from
/// an enclosing project never leak into a nested repository.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

pub fn load_config(path: &Path) -> Result<EcsyncToml, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
