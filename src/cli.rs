//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Procurement Insight - LLM-assisted procurement KPI analysis
///
/// Asks a Qwen model questions about a procurement CSV and writes its
/// answers next to manually computed statistics.
///
/// Examples:
///   procurement-insight
///   procurement-insight --input orders.csv --split
///   procurement-insight --format json --output-dir reports
///   procurement-insight --dry-run
///   procurement-insight --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Procurement CSV to analyze
    ///
    /// Defaults to "Procurement KPI Analysis Dataset.csv" or the
    /// [dataset] path in the config file.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Directory the report files are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Qwen model to use for analysis
    #[arg(short, long, env = "DASHSCOPE_MODEL")]
    pub model: Option<String>,

    /// DashScope API base URL
    #[arg(long, value_name = "URL", env = "DASHSCOPE_BASE_URL")]
    pub base_url: Option<String>,

    /// DashScope API key
    #[arg(long, value_name = "KEY", env = "DASHSCOPE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds for each question
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write one file per section plus an all-sections file
    #[arg(long)]
    pub split: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Report title line
    #[arg(long)]
    pub title: Option<String>,

    /// Number of dataset rows included in the question context
    #[arg(long, value_name = "ROWS")]
    pub sample_rows: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .procurement-insight.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: compute statistics and write the report without calling the model
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .procurement-insight.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref title) = self.title {
            if title.trim().is_empty() {
                return Err("Title must not be empty".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if input.is_dir() {
                return Err(format!("Input path is a directory: {}", input.display()));
            }
        }

        Ok(())
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
