//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::parse_date;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// hrmatchups - daily home run matchups from the MLB Stats API
///
/// For every game on the schedule, checks each batter against the opposing
/// probable starter and lists those with at least one career home run
/// against that pitcher, plus their home runs over the last 5, 10 and 20
/// games.
///
/// Examples:
///   hrmatchups
///   hrmatchups --bind 0.0.0.0:8080 --max-in-flight 16
///   hrmatchups --once --format markdown --output today.md
///   hrmatchups --once --date 2024-07-04
///   hrmatchups --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .hrmatchups.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Address for the HTTP server to listen on
    #[arg(long, value_name = "ADDR", env = "HRMATCHUPS_BIND")]
    pub bind: Option<String>,

    /// MLB Stats API base URL
    #[arg(long, value_name = "URL", env = "MLB_STATSAPI_URL")]
    pub api_url: Option<String>,

    /// Maximum number of upstream requests in flight
    #[arg(long, value_name = "NUM")]
    pub max_in_flight: Option<usize>,

    /// Deadline in seconds for roster and batter lookups
    ///
    /// Lookups still running when it passes are dropped from the result.
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Time zone used to decide today's date (IANA name)
    #[arg(long, value_name = "TZ")]
    pub timezone: Option<String>,

    /// Compute matchups once and exit instead of serving HTTP
    #[arg(long)]
    pub once: bool,

    /// Schedule date to use instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", requires = "once")]
    pub date: Option<String>,

    /// Output format for --once (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write --once output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Generate a default .hrmatchups.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for one-shot runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of matchups (default)
    #[default]
    Json,
    /// Markdown report
    Markdown,
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

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.max_in_flight == Some(0) {
            return Err("Max in-flight requests must be at least 1".to_string());
        }

        if self.deadline == Some(0) {
            return Err("Deadline must be at least 1 second".to_string());
        }

        if let Some(ref date) = self.date {
            parse_date(date)?;
        }

        if self.output.is_some() && !self.once {
            return Err("--output only applies with --once".to_string());
        }

        Ok(())
    }

    /// The explicit --date, if one was given and is valid.
    pub fn target_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(|d| parse_date(d).ok())
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
