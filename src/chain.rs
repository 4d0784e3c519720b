//! Declaration file chain discovery

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::declaration::DeclarationFile;
use crate::error::{ParseError, ResolveError};

pub const DECLARATION_FILE_NAME: &str = ".editorconfig";

/// Where declaration files are read from.
pub trait DeclarationSource {
    /// Returns `Ok(None)` when there is no file at `path`.
    fn read(&self, path: &Path) -> io::Result<Option<String>>;

    fn exists(&self, path: &Path) -> bool;
}

/// Reads declaration files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl DeclarationSource for FsSource {
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Candidate declaration file paths for `target`, closest directory first,
/// ending with the filesystem root.
pub fn ancestor_candidates(target: &Path, file_name: &str) -> Vec<PathBuf> {
    target
        .ancestors()
        .skip(1)
        .map(|dir| dir.join(file_name))
        .collect()
}

/// Absolute form of `target` with `.` and `..` resolved lexically, so the
/// upward walk only visits real ancestors.
pub fn normalize_target(target: &Path) -> Result<PathBuf, ResolveError> {
    if target.as_os_str().is_empty() {
        return Err(ResolveError::EmptyPath);
    }
    let absolute = std::path::absolute(target).map_err(|source| ResolveError::InvalidPath {
        path: target.to_path_buf(),
        source,
    })?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Collects the declaration files governing a target file.
#[derive(Debug, Clone)]
pub struct ChainResolver<S = FsSource> {
    source: S,
    file_name: String,
    stop_at_git_root: bool,
}

impl ChainResolver<FsSource> {
    pub fn new() -> Self {
        Self::with_source(FsSource)
    }
}

impl Default for ChainResolver<FsSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DeclarationSource> ChainResolver<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            file_name: DECLARATION_FILE_NAME.to_string(),
            stop_at_git_root: false,
        }
    }

    /// Use a declaration file name other than `.editorconfig`.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Stop the upward walk after the first directory containing `.git`.
    pub fn stop_at_git_root(mut self, stop: bool) -> Self {
        self.stop_at_git_root = stop;
        self
    }

    /// Resolve the chain for `target`, outermost file first.
    ///
    /// The walk ends at the first file declaring `root = true`. When no file
    /// in the chain is root, a declaration file in the filesystem root is
    /// always included as the outermost scope. An empty chain is a valid
    /// result.
    pub fn resolve(&self, target: &Path) -> Result<Vec<DeclarationFile>, ResolveError> {
        let target = normalize_target(target)?;

        // Innermost first while walking
        let mut chain: Vec<DeclarationFile> = Vec::new();
        let mut stopped_at_ceiling = false;

        for candidate in ancestor_candidates(&target, &self.file_name) {
            if let Some(file) = self.load(&candidate) {
                let is_root = file.is_root;
                chain.push(file);
                if is_root {
                    break;
                }
            }

            if self.stop_at_git_root && self.is_git_root(&candidate) {
                let dir = candidate.parent().unwrap_or(candidate.as_path());
                debug!(dir = %dir.display(), "stopping at git root");
                stopped_at_ceiling = true;
                break;
            }
        }

        let top_is_root = chain.last().is_some_and(|f| f.is_root);
        // A walk that was not cut short already visited the filesystem root
        if !top_is_root && stopped_at_ceiling {
            if let Some(fs_root) = target.ancestors().last() {
                let candidate = fs_root.join(&self.file_name);
                if !chain.iter().any(|f| f.path == candidate) {
                    if let Some(file) = self.load(&candidate) {
                        chain.push(file);
                    }
                }
            }
        }

        chain.reverse();
        Ok(chain)
    }

    fn is_git_root(&self, candidate: &Path) -> bool {
        candidate
            .parent()
            .is_some_and(|dir| self.source.exists(&dir.join(".git")))
    }

    /// Load one candidate, skipping files that cannot be read.
    fn load(&self, path: &Path) -> Option<DeclarationFile> {
        let content = match self.source.read(path) {
            Ok(Some(content)) => content,
            Ok(None) => return None,
            Err(source) => {
                let err = ParseError::Read {
                    path: path.to_path_buf(),
                    source,
                };
                warn!("skipping declaration file: {err}");
                return None;
            }
        };

        let file = DeclarationFile::parse(path, &content);
        debug!(path = %path.display(), root = file.is_root, "found declaration file");
        Some(file)
    }
}
