//! Property merging and typed access to resolved values

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::chain::{normalize_target, ChainResolver, DeclarationSource};
use crate::declaration::{DeclarationFile, Properties};
use crate::error::ResolveError;
use crate::glob::Glob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Tab,
    Space,
}

/// Flattened properties that apply to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    path: PathBuf,
    properties: Properties,
}

impl ResolvedConfiguration {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Short name used in diagnostics.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    /// Base-10 integer value of `key`, `None` when absent or malformed.
    pub fn int(&self, key: &str) -> Option<i32> {
        self.get(key)?.parse().ok()
    }

    /// Call `setter` with the integer value of `key` if it has one.
    ///
    /// Returns whether the setter ran.
    pub fn if_has_key_try_setting(&self, key: &str, setter: impl FnOnce(i32)) -> bool {
        match self.int(key) {
            Some(value) => {
                setter(value);
                true
            }
            None => false,
        }
    }

    /// True only when the stored value is exactly `"true"`.
    pub fn try_key_as_bool(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /// `end_of_line` as the literal line terminator.
    pub fn end_of_line(&self) -> Option<String> {
        self.get("end_of_line").map(normalize_end_of_line)
    }

    pub fn indent_style(&self) -> Option<IndentStyle> {
        match self.get("indent_style")? {
            "tab" => Some(IndentStyle::Tab),
            "space" => Some(IndentStyle::Space),
            _ => None,
        }
    }

    pub fn trim_trailing_whitespace(&self) -> bool {
        self.try_key_as_bool("trim_trailing_whitespace")
    }

    pub fn insert_final_newline(&self) -> bool {
        self.try_key_as_bool("insert_final_newline")
    }
}

/// Replace a leading `cr` with `\r`, then a trailing `lf` with `\n`.
pub fn normalize_end_of_line(raw: &str) -> String {
    let value = match raw.strip_prefix("cr") {
        Some(rest) => format!("\r{rest}"),
        None => raw.to_string(),
    };
    match value.strip_suffix("lf") {
        Some(rest) => format!("{rest}\n"),
        None => value,
    }
}

/// Merge every section of `chain` whose glob matches `target`.
///
/// The chain is ordered outermost first, so later files, later sections and
/// later keys override earlier ones. Returns `None` when nothing matched.
pub fn merge(target: &Path, chain: &[DeclarationFile]) -> Option<ResolvedConfiguration> {
    let mut properties = Properties::new();

    for file in chain {
        let Some(relative) = relative_path(target, file.directory()) else {
            debug!(file = %file.path.display(), "declaration file is not an ancestor, skipping");
            continue;
        };

        for section in &file.sections {
            let glob = match Glob::new(&section.pattern) {
                Ok(glob) => glob,
                Err(err) => {
                    warn!(file = %file.path.display(), "skipping section: {err}");
                    continue;
                }
            };
            if !glob.is_match(&relative) {
                continue;
            }
            for (key, value) in section.properties.iter() {
                properties.insert(key, value);
            }
        }
    }

    if properties.is_empty() {
        return None;
    }

    Some(ResolvedConfiguration {
        path: target.to_path_buf(),
        properties,
    })
}

/// Resolve the chain for `target` and merge it.
pub fn resolve_configuration<S: DeclarationSource>(
    resolver: &ChainResolver<S>,
    target: &Path,
) -> Result<Option<ResolvedConfiguration>, ResolveError> {
    let chain = resolver.resolve(target)?;
    let target = normalize_target(target)?;
    Ok(merge(&target, &chain))
}

/// `target` relative to `dir`, joined with `/`.
fn relative_path(target: &Path, dir: &Path) -> Option<String> {
    let rest = target.strip_prefix(dir).ok()?;
    let mut parts: Vec<String> = Vec::new();
    for component in rest.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            // `dir` is not really an ancestor of `target`
            _ => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}
