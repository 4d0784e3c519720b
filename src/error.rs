//! Error types for declaration resolution and settings reconciliation

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::reconcile::SettingKey;

/// Target path handed to the resolver could not be used.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid target path: path is empty")]
    EmptyPath,

    #[error("invalid target path {}: {source}", .path.display())]
    InvalidPath { path: PathBuf, source: io::Error },
}

/// A declaration file exists but could not be read.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
}

/// Section glob could not be compiled into a matcher.
#[derive(Debug, Error)]
#[error("invalid glob '{pattern}': {source}")]
pub struct GlobError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// The settings store rejected a read or write of one key.
#[derive(Debug, Error)]
#[error("setting {key} is not accessible: {reason}")]
pub struct SettingAccessError {
    pub key: SettingKey,
    pub reason: String,
}
