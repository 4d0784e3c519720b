//! `.editorconfig` declaration file parsing

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::warn;

/// Ordered property map. Keys are unique; re-inserting a key replaces its
/// value in place and keeps the original position.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Properties {
    entries: IndexMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One `[glob]` section and its properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub pattern: String,
    pub properties: Properties,
}

/// A parsed declaration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationFile {
    pub path: PathBuf,
    /// `root = true` in the preamble ends the upward search.
    pub is_root: bool,
    pub sections: Vec<Section>,
}

impl DeclarationFile {
    /// Parse declaration file content.
    ///
    /// Keys are lowercased, values are kept as trimmed raw strings. Only
    /// `root` is meaningful before the first section. Lines that are neither
    /// a comment, a section header nor `key = value` are skipped.
    pub fn parse(path: &Path, content: &str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut is_root = false;
        let mut sections: Vec<Section> = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') {
                let Some(pattern) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']'))
                else {
                    skip_line(path, idx, line);
                    continue;
                };
                sections.push(Section {
                    pattern: pattern.to_string(),
                    properties: Properties::new(),
                });
                continue;
            }

            let Some((key, value)) = line
                .split_once('=')
                .filter(|(key, _)| !key.trim().is_empty())
            else {
                skip_line(path, idx, line);
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            match sections.last_mut() {
                Some(section) => section.properties.insert(key, value),
                None => {
                    if key == "root" {
                        is_root = value.eq_ignore_ascii_case("true");
                    }
                }
            }
        }

        Self {
            path: path.to_path_buf(),
            is_root,
            sections,
        }
    }

    /// Directory the section globs are relative to.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("/"))
    }
}

fn skip_line(path: &Path, idx: usize, line: &str) {
    warn!("{}:{}: ignoring invalid line '{line}'", path.display(), idx + 1);
}
