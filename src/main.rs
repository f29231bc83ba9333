//! Fundscope - startup funding analytics
//!
//! A CLI tool that loads a cleaned startup-funding CSV once, composes one of
//! four dashboard views over it and renders the result as Markdown or JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, dataset load, output write, etc.)
//!   2 - The requested startup or investor does not appear in the dataset

use anyhow::{Context, Result};
use fundscope::cli::{Args, ListKind, OutputFormat};
use fundscope::config::{self, Config};
use fundscope::dataset::{Dataset, LoadOptions};
use fundscope::views::{self, ViewOutcome, ViewSettings};
use fundscope::{analysis, report};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .fundscope.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", config::CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to point at your dataset and tune report sizes.");
    Ok(())
}

/// Initialize logging based on verbosity settings. Logs go to stderr.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the dataset, compose the requested view and emit it. Returns the exit code.
fn run(args: Args) -> Result<i32> {
    info!("Fundscope v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let data_path = Path::new(&config.dataset.path);
    let dataset = Dataset::load(data_path, &LoadOptions::from(&config.dataset))
        .with_context(|| format!("Failed to load dataset {}", data_path.display()))?;

    if let Some(kind) = args.list {
        print_selection_list(&dataset, kind);
        return Ok(0);
    }

    let request = args.view_request();
    let settings = ViewSettings::from(&config.report);
    let outcome = views::compose(&dataset, &request, &settings);

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&outcome)?,
        OutputFormat::Markdown => {
            report::generate_markdown_report(&outcome, &config.report.currency_unit)
        }
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path))?;
            info!("Report saved to {}", path);
        }
        None => print!("{}", output),
    }

    let exit_code = match outcome {
        ViewOutcome::Ready(_) => 0,
        ViewOutcome::NotFound { .. } => 2,
        ViewOutcome::Unavailable { .. } => 1,
    };

    Ok(exit_code)
}

/// Print the sorted startup or investor names, one per line.
fn print_selection_list(dataset: &Dataset, kind: ListKind) {
    let names = match kind {
        ListKind::Startups => analysis::list_startups(dataset),
        ListKind::Investors => analysis::list_investors(dataset),
    };

    info!("{} names", names.len());
    for name in names {
        println!("{}", name);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
