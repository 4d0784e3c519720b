pub mod chain;
pub mod colors;
pub mod config;
pub mod declaration;
pub mod error;
pub mod glob;
mod output;
pub mod preview;
pub mod progress;
pub mod properties;
pub mod reconcile;
pub mod walker;

pub use chain::{
    ancestor_candidates, normalize_target, ChainResolver, DeclarationSource, FsSource,
    DECLARATION_FILE_NAME,
};
pub use colors::{should_use_colors, Colors, Tone};
pub use config::{
    find_config_file, generate_init_file, load_config, merge_config, Baseline, CliOptions,
    ConfigError, EcsyncToml, EffectiveConfig,
};
pub use declaration::{DeclarationFile, Properties, Section};
pub use error::{GlobError, ParseError, ResolveError, SettingAccessError};
pub use glob::Glob;
pub use output::{render_diff, render_resolved, Config, OutputContext, OutputMode, RunResult};
pub use preview::{preview_session, PreviewOutcome};
pub use progress::ProgressReporter;
pub use properties::{
    merge, normalize_end_of_line, resolve_configuration, IndentStyle, ResolvedConfiguration,
};
pub use reconcile::{
    FocusEvent, FocusSource, InMemorySettings, ManualFocus, ManualScheduler, ReconcilerState,
    Scheduler, SettingKey, SettingValue, SettingsReconciler, SettingsSnapshot, SettingsStore,
    TimerId,
};
pub use walker::walk_paths;

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Install the stderr tracing subscriber. `RUST_LOG` overrides the level.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_filter = if verbose { "ecsync=debug" } else { "ecsync=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .try_init();
}

/// Main entry point: resolve every file under the given paths
pub fn run(paths: &[PathBuf], config: &Config, ctx: &OutputContext) -> RunResult {
    let mut result = RunResult::default();

    let resolver = ChainResolver::new()
        .file_name(config.effective.file_name.clone())
        .stop_at_git_root(config.effective.stop_at_git_root);

    let files = walk_paths(paths);
    let progress = ProgressReporter::new(files.len() as u64, ctx.show_progress);

    for file in files {
        let path = match file {
            Ok(path) => path,
            Err(e) => {
                warn!("cannot walk path: {e}");
                result.errors += 1;
                progress.inc();
                continue;
            }
        };

        if let Some(name) = path.file_name() {
            progress.set_message(&name.to_string_lossy());
        }

        if let Err(e) = process_file(&path, &resolver, config, &mut result, ctx, &progress) {
            eprintln!("Error resolving {}: {e}", path.display());
            result.errors += 1;
        }

        progress.inc();
    }

    progress.finish();

    output::print_summary(&result, ctx);

    result
}

fn process_file(
    path: &Path,
    resolver: &ChainResolver,
    config: &Config,
    result: &mut RunResult,
    ctx: &OutputContext,
    progress: &ProgressReporter,
) -> Result<(), ResolveError> {
    let Some(resolved) = resolve_configuration(resolver, path)? else {
        result.files_without_config += 1;
        output::print_unconfigured(path, ctx, progress);
        return Ok(());
    };

    result.files_resolved += 1;
    output::print_resolved(path, &resolved, ctx, progress);

    if config.preview {
        let outcome = preview_session(
            resolved,
            config.effective.baseline,
            config.effective.focus_delay,
        );
        output::print_preview(&outcome, ctx, progress);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet_ctx() -> OutputContext {
        OutputContext::new(OutputMode::Quiet, false, false, false)
    }

    fn default_config() -> Config {
        Config {
            preview: false,
            effective: EffectiveConfig::default(),
        }
    }

    #[test]
    fn test_run_counts_resolved_and_unconfigured_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".editorconfig"),
            "root = true\n[*.rs]\nindent_size = 4\n",
        )
        .unwrap();
        fs::write(dir.path().join("lib.rs"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let result = run(&[dir.path().to_path_buf()], &default_config(), &quiet_ctx());

        assert_eq!(result.files_resolved, 1);
        assert_eq!(result.files_without_config, 1);
        assert!(!result.has_errors());
    }

    #[test]
    fn test_run_reports_missing_paths() {
        let dir = TempDir::new().unwrap();
        let result = run(
            &[dir.path().join("missing")],
            &default_config(),
            &quiet_ctx(),
        );
        assert!(result.has_errors());
    }

    #[test]
    fn test_end_to_end_resolution() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".editorconfig"),
            "root = true\n[*]\nindent_size = 4\nend_of_line = lf\n[*.cs]\nend_of_line = crlf\n",
        )
        .unwrap();
        let sub = dir.path().join("src");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join(".editorconfig"), "[*]\nindent_size = 2\n").unwrap();

        let resolved = resolve_configuration(&ChainResolver::new(), &sub.join("Program.cs"))
            .unwrap()
            .unwrap();
        assert_eq!(resolved.int("indent_size"), Some(2));
        assert_eq!(resolved.end_of_line().as_deref(), Some("\r\n"));
    }
}
