//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.fundscope.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".fundscope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset source settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Write reports to this file instead of stdout.
    #[serde(default)]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where the dataset lives and how it is delimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the cleaned funding CSV.
    #[serde(default = "default_path")]
    pub path: String,

    /// CSV field delimiter (a single ASCII character).
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Separator between names in the investor column.
    #[serde(default = "default_investor_delimiter")]
    pub investor_delimiter: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            delimiter: default_delimiter(),
            investor_delimiter: default_investor_delimiter(),
        }
    }
}

impl DatasetConfig {
    /// The field delimiter as a byte. Call [`Config::validate`] first.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

fn default_path() -> String {
    "cleaned_startup_funding.csv".to_string()
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_investor_delimiter() -> String {
    ", ".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Entries kept in top-N rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Investments listed under "most recent".
    #[serde(default = "default_recent_n")]
    pub recent_n: usize,

    /// Groups kept in investor sector/round/city breakdowns.
    #[serde(default = "default_breakdown_limit")]
    pub breakdown_limit: usize,

    /// Unit appended to amounts in Markdown reports.
    #[serde(default = "default_currency_unit")]
    pub currency_unit: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            recent_n: default_recent_n(),
            breakdown_limit: default_breakdown_limit(),
            currency_unit: default_currency_unit(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_recent_n() -> usize {
    5
}

fn default_breakdown_limit() -> usize {
    10
}

fn default_currency_unit() -> String {
    "Crore".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.fundscope.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.dataset.path = data.display().to_string();
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }

        if let Some(top_n) = args.top_n {
            self.report.top_n = top_n;
        }
        if let Some(recent) = args.recent {
            self.report.recent_n = recent;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Reject settings the loader or composer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.dataset.delimiter.len() != 1 || !self.dataset.delimiter.is_ascii() {
            bail!(
                "dataset.delimiter must be a single ASCII character, got '{}'",
                self.dataset.delimiter
            );
        }
        if self.dataset.investor_delimiter.is_empty() {
            bail!("dataset.investor_delimiter must not be empty");
        }
        if self.report.top_n == 0 || self.report.recent_n == 0 || self.report.breakdown_limit == 0 {
            bail!("report.top_n, report.recent_n and report.breakdown_limit must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
