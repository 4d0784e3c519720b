use crate::colors::{Colors, Tone};
use crate::config::EffectiveConfig;
use crate::preview::PreviewOutcome;
use crate::progress::ProgressReporter;
use crate::properties::ResolvedConfiguration;
use similar::{ChangeTag, TextDiff};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Normal,
    /// Only the paths that have configuration
    Quiet,
}

pub struct Config {
    pub preview: bool,
    pub effective: EffectiveConfig,
}

pub struct OutputContext {
    pub mode: OutputMode,
    pub colors: Colors,
    pub verbose: bool,
    pub show_progress: bool,
}

impl OutputContext {
    pub fn new(mode: OutputMode, use_colors: bool, verbose: bool, show_progress: bool) -> Self {
        Self {
            mode,
            colors: Colors::new(use_colors),
            verbose,
            show_progress,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunResult {
    pub files_resolved: usize,
    pub files_without_config: usize,
    pub errors: usize,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// `[path]` followed by one `key=value` line per resolved property.
pub fn render_resolved(path: &Path, config: &ResolvedConfiguration, colors: &Colors) -> String {
    let mut out = colors.paint(Tone::Header, format!("[{}]", path.display()));
    out.push('\n');
    for (key, value) in config.properties().iter() {
        out.push_str(&colors.paint(Tone::Key, key));
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out
}

pub fn print_resolved(
    path: &Path,
    config: &ResolvedConfiguration,
    ctx: &OutputContext,
    progress: &ProgressReporter,
) {
    if ctx.mode == OutputMode::Quiet {
        progress.println(&path.display().to_string());
        return;
    }
    let rendered = render_resolved(path, config, &ctx.colors);
    progress.println(rendered.trim_end());
}

pub fn print_unconfigured(path: &Path, ctx: &OutputContext, progress: &ProgressReporter) {
    if ctx.mode == OutputMode::Quiet || !ctx.verbose {
        return;
    }
    progress.println(&ctx.colors.paint(
        Tone::Dim,
        format!("No configuration: {}", path.display()),
    ));
}

pub fn print_preview(outcome: &PreviewOutcome, ctx: &OutputContext, progress: &ProgressReporter) {
    if ctx.mode == OutputMode::Quiet {
        return;
    }
    let diff = render_diff("global settings", &outcome.before, &outcome.applied, &ctx.colors);
    if diff.is_empty() {
        progress.println(&ctx.colors.paint(Tone::Dim, "  global settings unchanged"));
    } else {
        progress.println(diff.trim_end());
    }
    if !outcome.restored {
        progress.println(&ctx.colors.paint(
            Tone::Error,
            "  global settings were not restored after focus loss",
        ));
    }
}

/// Unified diff between two renderings, empty when they are equal.
pub fn render_diff(label: &str, original: &str, content: &str, colors: &Colors) -> String {
    if original == content {
        return String::new();
    }
    let diff = TextDiff::from_lines(original, content);

    let mut out = String::new();
    out.push_str(&format!("--- {label}\n"));
    out.push_str(&format!("+++ {label} (applied)\n"));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }

        for op in group {
            for change in diff.iter_changes(op) {
                let line = match change.tag() {
                    ChangeTag::Delete => colors.paint(Tone::Removed, format!("-{change}")),
                    ChangeTag::Insert => colors.paint(Tone::Added, format!("+{change}")),
                    ChangeTag::Equal => format!(" {change}"),
                };
                out.push_str(&line);
            }
        }
    }
    out
}

pub fn print_summary(result: &RunResult, ctx: &OutputContext) {
    if ctx.mode == OutputMode::Quiet || !ctx.verbose {
        return;
    }

    let mut parts = vec![format!("{} files resolved", result.files_resolved)];
    if result.files_without_config > 0 {
        parts.push(format!("{} without configuration", result.files_without_config));
    }
    if result.errors > 0 {
        parts.push(ctx.colors.paint(Tone::Error, format!("{} errors", result.errors)));
    }
    println!();
    println!("{}", parts.join(", "));
}
