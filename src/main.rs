use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ecsync::reconcile::FOCUS_DELAY_ENV;
use ecsync::{
    find_config_file, generate_init_file, init_tracing, load_config, merge_config, run,
    should_use_colors, CliOptions, Config, EcsyncToml, OutputContext, OutputMode,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ecsync")]
#[command(version, about = "Resolve the .editorconfig properties that apply to files")]
struct Cli {
    /// Target files or directories
    #[arg(required_unless_present = "init")]
    paths: Vec<PathBuf>,

    /// Output only the paths that have configuration
    #[arg(short, long)]
    quiet: bool,

    /// Show files without configuration and debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Simulate a focused editor session and show the global settings it applies
    #[arg(short, long)]
    preview: bool,

    /// Declaration file name to search for
    #[arg(short = 'f', long, value_name = "NAME")]
    file_name: Option<String>,

    /// Stop searching upward at the git repository root
    #[arg(long)]
    stop_at_git_root: bool,

    /// Milliseconds focus must be held before settings are applied
    #[arg(long, value_name = "MS")]
    focus_delay: Option<u64>,

    /// Generate a template ecsync.toml configuration file
    #[arg(long)]
    init: bool,

    /// Specify config file path (overrides auto-discovery)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.init {
        return handle_init();
    }

    let toml_config = load_configuration(&cli.config);

    let cli_options = build_cli_options(&cli);
    let env_delay = std::env::var(FOCUS_DELAY_ENV).ok();

    // Merge configurations: CLI > environment > TOML > defaults
    let effective = merge_config(&cli_options, env_delay.as_deref(), toml_config.as_ref());

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let ctx = OutputContext::new(
        output_mode,
        should_use_colors(cli.color, cli.no_color),
        cli.verbose,
        !cli.quiet && io::stderr().is_terminal(),
    );

    let config = Config {
        preview: cli.preview,
        effective,
    };

    let result = run(&cli.paths, &config, &ctx);
    if result.has_errors() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn handle_init() -> ExitCode {
    match generate_init_file() {
        Ok(path) => {
            println!("Created {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

fn load_configuration(explicit_path: &Option<PathBuf>) -> Option<EcsyncToml> {
    let config_path = explicit_path.clone().or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|d| find_config_file(&d))
    });

    config_path.and_then(|p| match load_config(&p) {
        Ok(config) => {
            info!("using config {}", p.display());
            Some(config)
        }
        Err(e) => {
            warn!("failed to load config: {e}");
            None
        }
    })
}

fn build_cli_options(cli: &Cli) -> CliOptions {
    // Boolean flags are always present (default false), so false means
    // "not set" for merging with the config file.
    CliOptions {
        file_name: cli.file_name.clone(),
        stop_at_git_root: cli.stop_at_git_root.then_some(true),
        focus_delay_ms: cli.focus_delay,
    }
}
