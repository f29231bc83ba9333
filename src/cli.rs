//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::views::ViewRequest;
use clap::Parser;
use std::path::PathBuf;

/// Fundscope - startup funding analytics from a cleaned funding CSV
///
/// Renders one of four views over the dataset as a Markdown or JSON report:
/// a dataset overview, the overall market analysis, a single startup, or a
/// single investor.
///
/// Examples:
///   fundscope --data cleaned_startup_funding.csv --view overall
///   fundscope --view startup --name "BYJU'S"
///   fundscope --view investor --name "Sequoia Capital" --format json
///   fundscope --list investors
///   fundscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the cleaned funding CSV
    ///
    /// Defaults to dataset.path from .fundscope.toml, or cleaned_startup_funding.csv.
    #[arg(short, long, value_name = "FILE", env = "FUNDSCOPE_DATA")]
    pub data: Option<PathBuf>,

    /// View to render
    #[arg(long, default_value = "overview", value_name = "VIEW")]
    pub view: ViewKind,

    /// Startup or investor name for the startup/investor views
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Entries kept in top-N rankings
    #[arg(long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Investments listed under "most recent" in the investor view
    #[arg(long, value_name = "COUNT")]
    pub recent: Option<usize>,

    /// Print the sorted startup or investor names and exit
    #[arg(long, value_name = "WHAT", conflicts_with = "name")]
    pub list: Option<ListKind>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .fundscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .fundscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// The four dashboard views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ViewKind {
    /// Dataset shape and column notes (default)
    #[default]
    Overview,
    /// Market-wide aggregates
    Overall,
    /// One startup
    Startup,
    /// One investor
    Investor,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Selection lists that can be printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListKind {
    Startups,
    Investors,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top_n == Some(0) {
            return Err("--top-n must be at least 1".to_string());
        }
        if self.recent == Some(0) {
            return Err("--recent must be at least 1".to_string());
        }

        if self.list.is_none() {
            let needs_name = matches!(self.view, ViewKind::Startup | ViewKind::Investor);
            let has_name = self.name.as_deref().is_some_and(|n| !n.trim().is_empty());
            if needs_name && !has_name {
                let view = if self.view == ViewKind::Startup {
                    "startup"
                } else {
                    "investor"
                };
                return Err(format!("--name is required for the {} view", view));
            }
        }

        Ok(())
    }

    /// The view request described by `--view` and `--name`.
    pub fn view_request(&self) -> ViewRequest {
        let name = self.name.clone().unwrap_or_default();
        match self.view {
            ViewKind::Overview => ViewRequest::Overview,
            ViewKind::Overall => ViewRequest::Overall,
            ViewKind::Startup => ViewRequest::Startup(name),
            ViewKind::Investor => ViewRequest::Investor(name),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
