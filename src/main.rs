//! hive-advisor - hybrid recommendation engine for beehive management
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hive_advisor::cli::InputSource;
use hive_advisor::config::{advisor_home, Config};
use hive_advisor::engine::{RecommendationEngine, StateLayout, StateVectorBuilder};
use hive_advisor::error::exit_codes;

// =============================================================================
// CLI Definition
// =============================================================================

/// hive-advisor - hybrid rule and learned-policy hive recommendations
#[derive(Parser)]
#[command(name = "hive-advisor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend an action for one hive (JSON request from file or stdin)
    Recommend {
        /// Request file, or "-" for stdin
        input: Option<PathBuf>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Override the policy artifact path
        #[arg(long)]
        model: Option<PathBuf>,
        /// Take the most probable action instead of sampling
        #[arg(long)]
        deterministic: bool,
        /// Seed for stochastic sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the state vector the policy would observe
    State {
        /// Request file, or "-" for stdin
        input: Option<PathBuf>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List the action catalog
    Catalog {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Write the effective configuration to .hive-advisor/config.toml
        #[arg(long)]
        init: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("hive-advisor error: {}", e);
            ExitCode::from(exit_codes::REJECTED as u8)
        }
    }
}

/// Install the log subscriber. `HIVE_ADVISOR_LOG` takes an `EnvFilter`
/// directive; the default is `warn`. Logs go to stderr.
fn setup_tracing() {
    let filter =
        EnvFilter::try_from_env("HIVE_ADVISOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.hive-advisor/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("hive-advisor panic: {}", info);

        if let Some(home) = advisor_home() {
            let _ = std::fs::create_dir_all(&home);
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Recommend {
            input,
            json,
            quiet,
            model,
            deterministic,
            seed,
        } => run_recommend(
            input.as_deref(),
            json,
            quiet,
            model,
            deterministic,
            seed,
            &cwd,
        ),
        Commands::State { input, json, quiet } => run_state(input.as_deref(), json, quiet, &cwd),
        Commands::Catalog { json, quiet } => run_catalog(json, quiet),
        Commands::Config { json, quiet, init } => run_config(json, quiet, init, &cwd),
    }
}

// =============================================================================
// Command Handlers
// =============================================================================

fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::REJECTED as u8)
    }
}

fn print_nonempty(formatted: &str) {
    if !formatted.is_empty() {
        println!("{}", formatted);
    }
}

fn run_recommend(
    input: Option<&Path>,
    json: bool,
    quiet: bool,
    model: Option<PathBuf>,
    deterministic: bool,
    seed: Option<u64>,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use hive_advisor::cli::recommend::{RecommendCommand, RecommendOptions};

    let mut config = Config::load_from_cwd(cwd);
    if model.is_some() {
        config.policy.model_path = model;
    }
    if deterministic {
        config.policy.stochastic = false;
    }
    if seed.is_some() {
        config.policy.seed = seed;
    }

    let cmd = RecommendCommand::new(Arc::new(RecommendationEngine::new(config)));
    let options = RecommendOptions { json, quiet };

    let output = match InputSource::from_arg(input).read_signals() {
        Ok(signals) => cmd.run(&signals),
        Err(e) => cmd.reject(&e),
    };
    print_nonempty(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_state(
    input: Option<&Path>,
    json: bool,
    quiet: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use hive_advisor::cli::state::{StateCommand, StateOptions, StateOutput};

    let config = Config::load_from_cwd(cwd);
    let cmd = StateCommand::new(StateVectorBuilder::new(StateLayout::new(
        config.layout.hive_count,
    )));
    let options = StateOptions { json, quiet };

    let output = match InputSource::from_arg(input).read_signals() {
        Ok(signals) => cmd.run(&signals),
        Err(e) => StateOutput::failure(e.to_string()),
    };
    print_nonempty(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_catalog(json: bool, quiet: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use hive_advisor::cli::catalog::{CatalogCommand, CatalogOptions};

    let cmd = CatalogCommand::new();
    let options = CatalogOptions { json, quiet };

    let output = cmd.run();
    print_nonempty(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}

fn run_config(
    json: bool,
    quiet: bool,
    init: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use hive_advisor::cli::config_cmd::{ConfigCommand, ConfigOptions};

    let cmd = ConfigCommand::new(cwd, Config::load_from_cwd(cwd));
    let options = ConfigOptions { json, quiet, init };

    let output = cmd.run(&options);
    print_nonempty(&cmd.format_output(&output, &options));

    Ok(success_to_exit_code(output.success))
}
